//! Rust source emitter for query groups.
//!
//! Renders one struct per query with a public field per distinct parameter,
//! and a `build` method returning the rewritten SQL with its arguments in
//! marker order:
//!
//! ```text
//! pub struct AuthorsFetch {
//!     pub author_id: serde_json::Value,
//! }
//!
//! impl AuthorsFetch {
//!     pub fn build(&self) -> (&'static str, Vec<&serde_json::Value>) {
//!         (
//!             "SELECT * FROM authors WHERE id = $1 LIMIT 1;",
//!             vec![
//!                 &self.author_id,
//!             ],
//!         )
//!     }
//! }
//! ```

use crate::bind::BindStyle;
use crate::group::QueryGroup;

pub const HEADER: &str = "// Code generated by sqlgen; DO NOT EDIT.";

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Type of every generated field.
    pub value_type: String,
    /// Wrap the output in `pub mod <module> { ... }`.
    pub module: Option<String>,
    /// Recorded in the header.
    pub style: BindStyle,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            value_type: "serde_json::Value".to_string(),
            module: None,
            style: BindStyle::default(),
        }
    }
}

/// Render every group into one Rust source file.
pub fn render(groups: &[QueryGroup], options: &EmitOptions) -> String {
    let mut body = String::new();

    for group in groups {
        render_struct(group, &options.value_type, &mut body);
        body.push('\n');
    }
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            body.push('\n');
        }
        render_impl(group, &options.value_type, &mut body);
    }

    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("// Bind style: {}\n", options.style));
    out.push('\n');

    match &options.module {
        Some(module) => {
            out.push_str(&format!("pub mod {} {{\n", module));
            for line in body.lines() {
                if !line.is_empty() {
                    out.push_str("    ");
                    out.push_str(line);
                }
                out.push('\n');
            }
            out.push_str("}\n");
        }
        None => out.push_str(&body),
    }

    out
}

fn render_struct(group: &QueryGroup, value_type: &str, out: &mut String) {
    out.push_str(&format!("/// Query from `{}`.\n", display_path(group)));
    out.push_str("#[derive(Debug, Clone)]\n");

    if group.fields.is_empty() {
        out.push_str(&format!("pub struct {} {{}}\n", group.name));
        return;
    }

    out.push_str(&format!("pub struct {} {{\n", group.name));
    for field in &group.fields {
        out.push_str(&format!("    pub {}: {},\n", field.name, value_type));
    }
    out.push_str("}\n");
}

fn render_impl(group: &QueryGroup, value_type: &str, out: &mut String) {
    out.push_str(&format!("impl {} {{\n", group.name));
    out.push_str(&format!(
        "    pub fn build(&self) -> (&'static str, Vec<&{}>) {{\n",
        value_type
    ));
    out.push_str("        (\n");
    // Debug formatting of a str is a valid Rust string literal.
    out.push_str(&format!("            {:?},\n", group.sql));

    let args = group.arguments();
    if args.is_empty() {
        out.push_str("            vec![],\n");
    } else {
        out.push_str("            vec![\n");
        for arg in args {
            out.push_str(&format!("                &self.{},\n", arg));
        }
        out.push_str("            ],\n");
    }

    out.push_str("        )\n");
    out.push_str("    }\n");
    out.push_str("}\n");
}

fn display_path(group: &QueryGroup) -> String {
    group
        .source
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
