//! Rust identifiers derived from query paths and parameter names.

use std::path::Path;

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::error::{SqlGenError, SqlGenResult};

/// Words that must be written as raw identifiers (`r#type`).
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe",
    "unsized", "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

fn is_valid_start(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

/// Whether `name` can be written as a plain Rust identifier, such as a
/// module name.
pub fn is_identifier(name: &str) -> bool {
    is_valid_start(name)
        && name != "_"
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
        && !RESERVED.contains(&name)
}

/// Type name for a query file from its path segments relative to the root.
///
/// The extension of the last segment is dropped and every segment is
/// converted to UpperCamelCase: `authors/create.sql` → `AuthorsCreate`.
pub fn type_name(segments: &[String]) -> SqlGenResult<String> {
    let joined = segments.join("/");
    let Some((last, dirs)) = segments.split_last() else {
        return Err(SqlGenError::invalid_path(joined, "empty path"));
    };

    let stem = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(last.as_str());

    let name: String = dirs
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(stem))
        .map(|segment| segment.to_upper_camel_case())
        .collect();

    if name.is_empty() {
        return Err(SqlGenError::invalid_path(
            joined,
            "no letters to build a type name from",
        ));
    }
    if !is_valid_start(&name) {
        return Err(SqlGenError::invalid_path(
            joined,
            format!("type name '{name}' must start with a letter"),
        ));
    }
    if RESERVED.contains(&name.as_str()) {
        return Ok(format!("{name}_"));
    }
    Ok(name)
}

/// Field name for a parameter: `authorId`, `author.id` → `author_id`.
pub fn field_name(param: &str) -> String {
    let mut name = param.to_snake_case();
    if name.is_empty() {
        name = "param".to_string();
    } else if !is_valid_start(&name) {
        name.insert(0, '_');
    }

    if RESERVED.contains(&name.as_str()) {
        format!("{name}_")
    } else if KEYWORDS.contains(&name.as_str()) {
        format!("r#{name}")
    } else {
        name
    }
}
