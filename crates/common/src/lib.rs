//! Common utilities and shared types for eventz.
//!
//! This crate provides foundational components used across all eventz crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID ids, OTPs and registration numbers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use eventz_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} listening on {}", id_gen.generate(), config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
