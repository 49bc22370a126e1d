//! Typed configuration for bindery.
//!
//! The configuration carries the process-wide binding limits and logging
//! settings. It is loaded in layers:
//!
//! - built-in defaults (or the development/production presets)
//! - a TOML or JSON file
//! - environment variable overrides
//!
//! Unknown fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use bindery_config::ConfigLoader;
//!
//! # fn main() -> Result<(), bindery_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("bindery.toml")?
//!     .with_env_prefix("BINDERY")
//!     .load()?;
//!
//! println!("multipart memory ceiling: {} bytes", config.binding.max_memory);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [binding]
//! max_memory = 10485760
//! max_form_size = 10485760
//! spill_dir = "/var/tmp/uploads"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values use the format `PREFIX__SECTION__KEY`, for example:
//!
//! - `BINDERY__BINDING__MAX_MEMORY=1048576`
//! - `BINDERY__LOGGING__FORMAT=pretty`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
