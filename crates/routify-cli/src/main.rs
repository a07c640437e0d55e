//! Routify CLI.
//!
//! Compiles a project exported from the Routify editor into an OpenAPI
//! document and a runnable Express backend.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebounceEventResult};
use tracing_subscriber::EnvFilter;

use routify_compiler::ir::{DataOperation, StorageEngine};
use routify_compiler::{
    CompileWarning, Compiler, CompilerConfig, OutputTarget, Project, ResolvedRoute,
};

mod ui;

#[derive(Parser)]
#[command(name = "routify", version)]
#[command(about = "Routify compiler - turns visual API graphs into Express backends")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new project file
    Init {
        /// Project file to create
        #[arg(default_value = "routify.json")]
        path: PathBuf,

        /// Project name
        #[arg(short, long)]
        name: Option<String>,

        /// Start from an empty graph instead of the e-commerce demo
        #[arg(long)]
        empty: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Check a project without generating code
    Check {
        /// Project file
        #[arg(env = "ROUTIFY_PROJECT", default_value = "routify.json")]
        project: PathBuf,

        /// Fail when any warning is raised
        #[arg(long)]
        strict: bool,
    },

    /// Print or write the OpenAPI document
    Spec {
        /// Project file
        #[arg(env = "ROUTIFY_PROJECT", default_value = "routify.json")]
        project: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate the backend project
    Generate {
        /// Project file
        #[arg(env = "ROUTIFY_PROJECT", default_value = "routify.json")]
        project: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Regenerate whenever the project file changes
    Watch {
        /// Project file
        #[arg(env = "ROUTIFY_PROJECT", default_value = "routify.json")]
        project: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Output directory, or a path ending in .zip for an archive
    #[arg(short, long, env = "ROUTIFY_OUTPUT", default_value = "generated")]
    output: PathBuf,

    /// Override the project's database (postgresql, mysql, sqlite, mongodb)
    #[arg(short, long)]
    engine: Option<StorageEngine>,

    /// Override the project's server port
    #[arg(short, long)]
    port: Option<u16>,
}

impl BuildArgs {
    fn config(&self) -> CompilerConfig {
        CompilerConfig {
            output: OutputTarget::from_path(self.output.clone()),
            database: self.engine,
            port: self.port,
        }
    }
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init {
            path,
            name,
            empty,
            force,
        } => init_project(&path, name, empty, force),
        Commands::Check { project, strict } => check_project(&project, strict),
        Commands::Spec { project, output } => write_spec(&project, output.as_deref()),
        Commands::Generate { project, build } => generate_project(&project, &build.config()),
        Commands::Watch { project, build } => run_watch_mode(&project, &build.config()),
    }
}

/// Logs go to stderr so `routify spec` output stays pipeable.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "routify_compiler=debug,info",
        _ => "routify_compiler=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_project(path: &Path) -> miette::Result<Project> {
    Project::load(path)?.ok_or_else(|| {
        miette::miette!(
            help = "Run `routify init` to create one, or pass the path to an exported project",
            "Project file not found: {}",
            path.display()
        )
    })
}

fn init_project(path: &Path, name: Option<String>, empty: bool, force: bool) -> miette::Result<()> {
    if path.exists() && !force {
        return Err(miette::miette!(
            help = "Pass --force to overwrite it",
            "{} already exists",
            path.display()
        ));
    }

    let mut project = if empty {
        Project::new("Untitled Project")
    } else {
        Project::demo()?
    };
    if let Some(name) = name {
        project.name = name;
    }
    project.save(path)?;

    ui::success(&format!("Created {}", path.display()));
    println!();
    ui::info(&format!(
        "{} {} {} {} {}",
        ui::count(project.endpoints().count(), "endpoint"),
        ui::symbols::DOT,
        ui::count(project.models.len(), "model"),
        ui::symbols::DOT,
        project.settings.database.as_str()
    ));
    ui::divider();
    println!("  Now do this:");
    println!();
    println!("    routify generate {}", path.display());
    println!();

    Ok(())
}

fn check_project(path: &Path, strict: bool) -> miette::Result<()> {
    let project = load_project(path)?;
    let spinner = ui::spinner("Checking project...");

    let output = Compiler::new(CompilerConfig::default()).compile(&project)?;
    spinner.finish_and_clear();

    ui::header(env!("CARGO_PKG_VERSION"));
    ui::info(&format!("Routes in {}", project.name));
    println!();
    for route in &output.routes {
        ui::route_line(
            route.http_method,
            &route.route_path,
            &describe(route),
            route.requires_auth,
        );
    }
    println!();

    if output.warnings.is_empty() {
        ui::looking_good();
        println!(
            "    {} {} {}",
            ui::count(output.routes.len(), "route"),
            ui::symbols::DOT,
            ui::count(project.models.len(), "model")
        );
        return Ok(());
    }

    report_warnings(&output.warnings);
    if strict {
        return Err(miette::miette!(
            "{} raised in strict mode",
            ui::count(output.warnings.len(), "warning")
        ));
    }
    Ok(())
}

fn write_spec(path: &Path, output: Option<&Path>) -> miette::Result<()> {
    let project = load_project(path)?;
    let compiled = Compiler::new(CompilerConfig::default()).compile(&project)?;
    let json = compiled.document.to_json_pretty()?;

    match output {
        Some(out) => {
            std::fs::write(out, json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write {}", out.display()))?;
            ui::success(&format!(
                "Wrote {} ({})",
                out.display(),
                ui::count(compiled.document.operation_count(), "operation")
            ));
        }
        None => print!("{}", json),
    }
    Ok(())
}

fn generate_project(path: &Path, config: &CompilerConfig) -> miette::Result<()> {
    let start = Instant::now();
    let project = load_project(path)?;

    let spinner = ui::spinner("Generating backend...");
    let compiler = Compiler::new(config.clone());
    let result = compiler.build(&project)?;
    spinner.finish_and_clear();

    ui::success(&format!(
        "{} {} {} {} {}",
        ui::count(result.routes, "route"),
        ui::symbols::DOT,
        ui::count(result.models, "model"),
        ui::symbols::DOT,
        ui::count(result.files, "file")
    ));
    ui::timing("Done", start.elapsed().as_millis());

    if !result.warnings.is_empty() {
        report_warnings(&result.warnings);
    }

    println!();
    ui::box_header(&format!("{} What's Next", ui::symbols::ARROW));
    ui::box_line("");
    match &config.output {
        OutputTarget::Directory(dir) => {
            ui::box_line(&format!("   cd {}", dir.display()));
        }
        OutputTarget::Zip(archive) => {
            ui::box_line(&format!("   unzip {}", archive.display()));
        }
    }
    ui::box_line("   npm install && npm run dev");
    ui::box_line("");
    let port = config.port.unwrap_or(project.settings.port);
    ui::box_line(&format!("   Then open http://localhost:{}/docs", port));
    ui::box_line("");
    ui::box_footer();
    println!();

    Ok(())
}

fn run_watch_mode(path: &Path, config: &CompilerConfig) -> miette::Result<()> {
    let watched = std::fs::canonicalize(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot watch {}", path.display()))?;
    let dir = watched
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let (tx, rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)
        .into_diagnostic()
        .wrap_err("Failed to create file watcher")?;
    // Editors often replace the file on save, so the directory is watched.
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to watch {}", dir.display()))?;

    ui::info(&format!("Watching {}", path.display()));
    rebuild(path, config);
    ui::info("Ready! Waiting for changes...");

    for result in rx {
        match result {
            Ok(events) => {
                if !events.iter().any(|event| event.path == watched) {
                    continue;
                }
                println!();
                rebuild(path, config);
                ui::info("Ready! Waiting for changes...");
            }
            Err(e) => {
                tracing::warn!(error = %e, "file watcher error");
            }
        }
    }

    Ok(())
}

/// One watch iteration. Failures are printed, never fatal.
fn rebuild(path: &Path, config: &CompilerConfig) {
    let start = Instant::now();
    let spinner = ui::spinner("Change detected, regenerating...");

    let outcome = load_project(path).and_then(|project| {
        Compiler::new(config.clone())
            .build(&project)
            .map_err(miette::Report::new)
    });
    spinner.finish_and_clear();

    match outcome {
        Ok(result) => {
            ui::success(&format!(
                "Generated {} in {}ms",
                ui::count(result.routes, "route"),
                start.elapsed().as_millis()
            ));
            for warning in &result.warnings {
                ui::dim(&warning.to_string());
            }
        }
        Err(report) => ui::error(&format!("{}", report)),
    }
}

fn report_warnings(warnings: &[CompileWarning]) {
    ui::heads_up(warnings.len());
    for warning in warnings {
        eprintln!("{:?}", miette::Report::new(warning.clone()));
    }
}

/// Short description of what a route does.
fn describe(route: &ResolvedRoute) -> String {
    match &route.data_operation {
        Some(DataOperation {
            operation, model, ..
        }) => format!("{} {}", operation.as_str(), model),
        None => "stub".to_string(),
    }
}
