//! Generator configuration, read from `sqlgen.toml`.
//!
//! ```toml
//! root = "queries"
//! out = "src/queries.rs"
//! style = "dollar"          # or: driver = "postgres"
//! combine_duplicates = true
//! module = "queries"
//! value_type = "serde_json::Value"
//! perms = "0644"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bind::BindStyle;
use crate::emit::EmitOptions;
use crate::error::{SqlGenError, SqlGenResult};
use crate::naming;

pub const CONFIG_FILE: &str = "sqlgen.toml";

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenConfig {
    /// Directory searched recursively for query files.
    pub root: PathBuf,
    /// Output file; stdout when unset.
    pub out: Option<PathBuf>,
    pub style: BindStyle,
    /// Driver name; overrides `style` when set.
    pub driver: Option<String>,
    pub combine_duplicates: bool,
    /// Wrap generated code in `pub mod <module>`.
    pub module: Option<String>,
    pub value_type: String,
    /// Extension of query files, without the dot.
    pub extension: String,
    /// Octal permissions for the output file.
    pub perms: String,
    pub max_file_bytes: Option<u64>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            out: None,
            style: BindStyle::Dollar,
            driver: None,
            combine_duplicates: true,
            module: None,
            value_type: "serde_json::Value".to_string(),
            extension: "sql".to_string(),
            perms: "0644".to_string(),
            max_file_bytes: None,
        }
    }
}

impl GenConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> SqlGenResult<Self> {
        toml::from_str(content).map_err(|e| SqlGenError::Config(e.to_string()))
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> SqlGenResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| SqlGenError::read(path, e))?;
        Self::from_toml(&content).map_err(|e| match e {
            SqlGenError::Config(msg) => {
                SqlGenError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Load the config: an explicit path must exist; otherwise `./sqlgen.toml`,
    /// then `<config dir>/sqlgen/sqlgen.toml`, then defaults.
    pub fn load(explicit: Option<&Path>) -> SqlGenResult<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config");
            return Self::from_file(path);
        }

        let local = PathBuf::from(CONFIG_FILE);
        let user = dirs::config_dir().map(|d| d.join("sqlgen").join(CONFIG_FILE));

        for path in std::iter::once(local).chain(user) {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::from_file(&path);
            }
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// The bind style in effect, with `driver` taking precedence.
    pub fn bind_style(&self) -> BindStyle {
        match &self.driver {
            Some(driver) => BindStyle::for_driver(driver),
            None => self.style,
        }
    }

    /// Output permissions parsed from the octal `perms` string.
    pub fn mode(&self) -> SqlGenResult<u32> {
        let digits = self.perms.trim();
        let digits = digits.strip_prefix("0o").unwrap_or(digits);
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|mode| *mode <= 0o7777)
            .ok_or_else(|| SqlGenError::InvalidPermissions(self.perms.clone()))
    }

    /// Rendering options, with `module` and `value_type` checked so they can
    /// be spliced into Rust source.
    pub fn emit_options(&self) -> SqlGenResult<EmitOptions> {
        if let Some(module) = &self.module {
            if !naming::is_identifier(module) {
                return Err(SqlGenError::Config(format!(
                    "module '{module}' is not a valid Rust identifier"
                )));
            }
        }

        let value_type = self.value_type.trim();
        if value_type.is_empty()
            || value_type.contains(|c: char| matches!(c, '{' | '}' | ';' | '\n' | '\r'))
            || value_type.contains("//")
            || value_type.contains("/*")
        {
            return Err(SqlGenError::Config(format!(
                "value_type '{}' is not a Rust type",
                self.value_type
            )));
        }

        Ok(EmitOptions {
            value_type: value_type.to_string(),
            module: self.module.clone(),
            style: self.bind_style(),
        })
    }
}
