//! # sqlgen — Named Parameters for Every Driver
//!
//! > **Write `:name`. Ship `$1`.**
//!
//! sqlgen rewrites SQL written with named bind parameters into the
//! placeholder syntax a driver expects, and generates a Rust struct per
//! `.sql` file whose `build` method returns the rewritten query together
//! with its arguments in order.
//!
//! ## Quick Example
//!
//! ```
//! use sqlgen::{scan, BindStyle};
//!
//! let out = scan(
//!     "SELECT * FROM users WHERE email = :email AND note <> ':email'",
//!     BindStyle::Dollar,
//!     true,
//! );
//! assert_eq!(out.sql, "SELECT * FROM users WHERE email = $1 AND note <> ':email'");
//! assert_eq!(out.params, vec!["email"]);
//! ```
//!
//! ## Bind Styles
//!
//! | Style      | Marker  |
//! |------------|---------|
//! | `Question` | `?`     |
//! | `Dollar`   | `$1`    |
//! | `Named`    | `:name` |
//! | `At`       | `@p1`   |
//!
//! Parameters inside string constants, quoted identifiers, `--` and `/* */`
//! comments, and `$tag$` literals are left alone.

pub mod bind;
pub mod config;
pub mod discover;
pub mod emit;
pub mod error;
pub mod generator;
pub mod group;
pub mod naming;
pub mod params;
pub mod scanner;

pub use bind::BindStyle;
pub use scanner::{Region, Rewritten, scan};

pub mod prelude {
    pub use crate::bind::BindStyle;
    pub use crate::config::GenConfig;
    pub use crate::discover::{SqlSource, discover};
    pub use crate::emit::{EmitOptions, render};
    pub use crate::error::*;
    pub use crate::generator::{Generated, generate, run};
    pub use crate::group::{Field, QueryGroup, assemble_all};
    pub use crate::scanner::{Region, Rewritten, scan};
}
