//! Writing generated projects to disk, as a directory tree or a zip archive.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::codegen::GeneratedCode;
use crate::diagnostic::CompilerError;

/// Writes every generated file below `dir`, creating directories as needed.
pub fn write_directory(dir: &Path, generated: &GeneratedCode) -> Result<(), CompilerError> {
    std::fs::create_dir_all(dir).map_err(|e| CompilerError::IoError {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    for (filename, content) in &generated.files {
        let path = dir.join(filename);
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CompilerError::IoError {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        std::fs::write(&path, content).map_err(|e| CompilerError::IoError {
            path,
            message: e.to_string(),
        })?;
    }

    tracing::info!(dir = %dir.display(), files = generated.files.len(), "wrote project");
    Ok(())
}

/// Writes a deflated zip at `path` with every file under `root/`, in
/// generation order.
pub fn write_zip(path: &Path, root: &str, generated: &GeneratedCode) -> Result<(), CompilerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| CompilerError::IoError {
            path: parent.to_path_buf(),
            message: e.to_string(),
        })?;
    }

    let file = File::create(path).map_err(|e| CompilerError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let archive_err = |message: String| CompilerError::ArchiveFailed {
        path: path.to_path_buf(),
        message,
    };

    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (filename, content) in &generated.files {
        let entry = format!("{}/{}", root, filename);
        zip.start_file(entry, options)
            .map_err(|e| archive_err(e.to_string()))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| archive_err(e.to_string()))?;
    }
    zip.finish().map_err(|e| archive_err(e.to_string()))?;

    tracing::info!(archive = %path.display(), files = generated.files.len(), "wrote archive");
    Ok(())
}
