//! Client library for UFDL, the unified framework for deep learning.
//!
//! Start from [Connection::build] or [ClientConfig], then use the
//! resource-specific [Actions] of the [Connection]:
//!
//! ```no_run
//! use ufdl::{Connection, ServerUrl, Username};
//!
//! # async fn example() -> Result<(), ufdl::errors::UfdlError> {
//! let conn = Connection::build(
//!     ServerUrl::from_static("http://localhost:8000"),
//!     Username::from_static("admin"),
//!     "admin",
//! )
//! .connect()
//! .await?;
//! for project in conn.projects().list(None).await? {
//!     println!("{}", project.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod client;
pub mod config;
pub mod errors;
pub mod filter;
pub mod models;
pub mod tokenstore;
pub mod types;

pub use client::actions::Actions;
pub use client::connection::{Connection, ConnectionBuilder, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use config::ClientConfig;
pub use types::*;
