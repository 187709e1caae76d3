//! Bind-variable styles and marker emission.
//!
//! Each database driver expects placeholders in its own syntax. A scan
//! rewrites every `:name` token into the marker for one [`BindStyle`]:
//!
//! | Style      | Marker    | Drivers                     |
//! |------------|-----------|-----------------------------|
//! | `Question` | `?`       | MySQL, SQLite               |
//! | `Dollar`   | `$1`      | PostgreSQL, CockroachDB     |
//! | `Named`    | `:name`   | Oracle                      |
//! | `At`       | `@p1`     | SQL Server                  |
//! | `Unknown`  | `?`       | anything unrecognized       |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SqlGenError;

/// Placeholder syntax written in place of a `:name` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindStyle {
    /// `?`
    Question,
    /// `$1, $2, ...`
    #[default]
    Dollar,
    /// `:name`, passed through verbatim
    Named,
    /// `@p1, @p2, ...`
    At,
    /// Driver not recognized; emits `?` like [`BindStyle::Question`].
    Unknown,
}

/// Driver names and the style each one uses.
pub const DRIVERS: &[(&str, BindStyle)] = &[
    ("postgres", BindStyle::Dollar),
    ("postgresql", BindStyle::Dollar),
    ("pg", BindStyle::Dollar),
    ("pgx", BindStyle::Dollar),
    ("cockroach", BindStyle::Dollar),
    ("cockroachdb", BindStyle::Dollar),
    ("mysql", BindStyle::Question),
    ("mariadb", BindStyle::Question),
    ("sqlite", BindStyle::Question),
    ("sqlite3", BindStyle::Question),
    ("oracle", BindStyle::Named),
    ("oci8", BindStyle::Named),
    ("godror", BindStyle::Named),
    ("sqlserver", BindStyle::At),
    ("mssql", BindStyle::At),
];

impl BindStyle {
    /// All styles, in display order.
    pub const ALL: [BindStyle; 5] = [
        BindStyle::Question,
        BindStyle::Dollar,
        BindStyle::Named,
        BindStyle::At,
        BindStyle::Unknown,
    ];

    /// Look up the style a driver expects. Unrecognized drivers map to
    /// [`BindStyle::Unknown`].
    pub fn for_driver(driver: &str) -> Self {
        let driver = driver.trim();
        DRIVERS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(driver))
            .map(|(_, style)| *style)
            .unwrap_or(BindStyle::Unknown)
    }

    /// Whether repeated names may share one argument. Only `Question` lists
    /// every occurrence.
    pub fn can_combine(self) -> bool {
        self != BindStyle::Question
    }

    /// Append the marker for the parameter at 1-based `index` to `out`.
    pub fn write_marker(self, index: usize, name: &str, out: &mut String) {
        match self {
            BindStyle::Named => {
                out.push(':');
                out.push_str(name);
            }
            BindStyle::Question | BindStyle::Unknown => out.push('?'),
            BindStyle::Dollar => {
                out.push('$');
                out.push_str(&index.to_string());
            }
            BindStyle::At => {
                out.push_str("@p");
                out.push_str(&index.to_string());
            }
        }
    }

    /// The marker for a single parameter as an owned string.
    pub fn marker(self, index: usize, name: &str) -> String {
        let mut out = String::new();
        self.write_marker(index, name, &mut out);
        out
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BindStyle::Question => "question",
            BindStyle::Dollar => "dollar",
            BindStyle::Named => "named",
            BindStyle::At => "at",
            BindStyle::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BindStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindStyle {
    type Err = SqlGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" | "?" => Ok(BindStyle::Question),
            "dollar" | "$" => Ok(BindStyle::Dollar),
            "named" | ":" => Ok(BindStyle::Named),
            "at" | "@" => Ok(BindStyle::At),
            "unknown" => Ok(BindStyle::Unknown),
            _ => Err(SqlGenError::UnknownBindStyle(s.to_string())),
        }
    }
}
