//! Primitive UFDL API data types and NewType-patterns.

mod ids;
mod server_url;
mod strings;

pub use ids::*;
pub use server_url::*;
pub use strings::*;
