//! Path template helpers.

/// Splits a `:name` segment into the parameter name and the literal text
/// after it, so `:name.json` gives `("name", ".json")`.
///
/// A token name is the run of alphanumerics and underscores after the colon.
/// Segments without a colon or with an empty name are not tokens.
pub fn param_token(segment: &str) -> Option<(&str, &str)> {
    let rest = segment.strip_prefix(':')?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| rest.split_at(end))
}

/// Names of the `:name` tokens in a path template, in order of appearance.
pub fn template_params(template: &str) -> Vec<String> {
    let mut params: Vec<String> = Vec::new();
    for (name, _) in template.split('/').filter_map(param_token) {
        if !params.iter().any(|p| p == name) {
            params.push(name.to_string());
        }
    }
    params
}

/// OpenAPI form of a path: every `:name` token becomes `{name}`, keeping any
/// literal suffix in the segment.
pub fn openapi_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match param_token(segment) {
            Some((name, suffix)) => format!("{{{}}}{}", name, suffix),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Path the generated server registers for `template` under `base_path`.
///
/// Templates that already start with the base path (on a segment boundary)
/// are used as-is, so `/api/products` under `/api` stays `/api/products`
/// while `/products` becomes `/api/products`.
pub fn route_path(template: &str, base_path: &str) -> String {
    let template = if template.starts_with('/') {
        template.to_string()
    } else {
        format!("/{}", template)
    };

    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return template;
    }
    let base = if base.starts_with('/') {
        base.to_string()
    } else {
        format!("/{}", base)
    };

    if template == base || template.starts_with(&format!("{}/", base)) {
        return template;
    }
    if template == "/" {
        return base;
    }
    format!("{}{}", base, template)
}

/// Resource tag derived from a path: its first segment, skipping a leading
/// literal `api`, reduced to ASCII letters. Falls back to `default`.
pub fn tag_from_path(path: &str) -> String {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let first = match parts.first() {
        Some(&"api") => parts.get(1).copied(),
        other => other.copied(),
    };

    let tag: String = first
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();

    if tag.is_empty() {
        "default".to_string()
    } else {
        tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_params() {
        assert_eq!(template_params("/api/orders/:id/status"), vec!["id"]);
        assert_eq!(template_params("/a/:org_id/b/:id"), vec!["org_id", "id"]);
        assert!(template_params("/api/products").is_empty());
        assert!(template_params("/api/:").is_empty());
        assert_eq!(template_params("/api/files/:name.json"), vec!["name"]);
    }

    #[test]
    fn test_param_token_keeps_suffix() {
        assert_eq!(param_token(":id"), Some(("id", "")));
        assert_eq!(param_token(":name.json"), Some(("name", ".json")));
        assert_eq!(param_token(":"), None);
        assert_eq!(param_token("files"), None);
    }

    #[test]
    fn test_openapi_path() {
        assert_eq!(openapi_path("/api/orders/:id/status"), "/api/orders/{id}/status");
        assert_eq!(openapi_path("/api/files/:name.json"), "/api/files/{name}.json");
        assert_eq!(openapi_path("/a/:org_id-:id"), "/a/{org_id}-:id");
        assert_eq!(openapi_path("/api/:"), "/api/:");
    }

    #[test]
    fn test_route_path_applies_base_once() {
        assert_eq!(route_path("/api/products", "/api"), "/api/products");
        assert_eq!(route_path("/products", "/api"), "/api/products");
        assert_eq!(route_path("/apiary", "/api"), "/api/apiary");
        assert_eq!(route_path("/api", "/api/"), "/api");
        assert_eq!(route_path("/products", ""), "/products");
        assert_eq!(route_path("/products", "/"), "/products");
        assert_eq!(route_path("products", "v1"), "/v1/products");
        assert_eq!(route_path("", "/api"), "/api");
    }

    #[test]
    fn test_tag_from_path() {
        assert_eq!(tag_from_path("/api/products/:id"), "products");
        assert_eq!(tag_from_path("/users"), "users");
        assert_eq!(tag_from_path("/api"), "default");
        assert_eq!(tag_from_path("/"), "default");
        assert_eq!(tag_from_path("/api/v2-items"), "vitems");
    }
}
