//! # muds
//!
//! Web form and command line front end generating DevStack `local.conf`
//! files from an option schema.
//!
//! ## Modules
//!
//! - [`config`] - Server settings file
//! - [`ctx`] - Application context: settings, schema and store selection
//!
//! ## Example
//!
//! ```rust,no_run
//! use muds::{config::Settings, ctx::AppContext};
//!
//! let ctx = AppContext::new(Settings::default()).unwrap();
//! let mut tree = ctx.tree().unwrap();
//! println!("{}", tree.local_conf([("cinder", "on")]).unwrap());
//! ```

/// Server settings file.
pub mod config;

/// Application context and schema loading.
pub mod ctx;

#[macro_use]
extern crate log;
