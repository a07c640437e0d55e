//! Naming and quoting helpers shared by the TypeScript emitters.

/// Converts a snake_case (or space/dash separated) name to PascalCase.
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| c == '_' || c == '-' || c == ' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}

/// Converts a PascalCase or camelCase name to snake_case.
///
/// A leading underscore is kept, so `_id` stays `_id`. Runs of capitals are
/// treated as one word (`APIKey` becomes `api_key`).
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = i > 0 && {
                let prev = chars[i - 1];
                prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' || c == ' ' {
            result.push('_');
        } else {
            result.push(c);
        }
    }
    result
}

/// Converts a name to camelCase.
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// Lower-case, dash separated form usable as a file stem or npm package name.
pub fn to_kebab_case(s: &str) -> String {
    let mut result = String::new();
    for word in to_snake_case(s)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !result.is_empty() {
            result.push('-');
        }
        result.push_str(&word.to_ascii_lowercase());
    }
    result
}

/// A valid TypeScript identifier derived from `s` (camelCase, alphanumerics only).
pub fn to_identifier(s: &str) -> String {
    let words: Vec<&str> = s
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let ident = to_camel_case(&words.join("_"));
    match ident.chars().next() {
        None => "unnamed".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
    }
}

/// Single-quoted TypeScript string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Property key for an object literal or interface, quoted only when needed.
pub fn property_key(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        quote(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_pascal_case("todo_item"), "TodoItem");
        assert_eq!(to_snake_case("TodoItem"), "todo_item");
        assert_eq!(to_snake_case("_id"), "_id");
        assert_eq!(to_camel_case("todo_item"), "todoItem");
        assert_eq!(to_snake_case("APIKey"), "api_key");
        assert_eq!(to_kebab_case("My Shop API"), "my-shop-api");
        assert_eq!(to_kebab_case("E-Commerce Store"), "e-commerce-store");
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(to_identifier("Products"), "products");
        assert_eq!(to_identifier("public api"), "publicApi");
        assert_eq!(to_identifier("2fa"), "_2fa");
        assert_eq!(to_identifier("!!"), "unnamed");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(property_key("createdAt"), "createdAt");
        assert_eq!(property_key("_id"), "_id");
        assert_eq!(property_key("first-name"), "'first-name'");
    }
}
