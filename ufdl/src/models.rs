//! Representations of data from a UFDL server.
//!
//! ## How It Works
//!
//! Every kind of server resource is a plain [serde::Deserialize]-able struct
//! which implements [Resource]. [Resource] tells the generic
//! [Actions](crate::Actions) client where the resource lives and what body
//! creates one, so that one client implements list, load, create, update and
//! delete for all of them.
//!
//! Server responses are decoded tolerantly: fields which the server may omit
//! are `Option`s or fall back to their defaults, and unknown fields are ignored.

mod contract;
mod data;
mod jobs;

pub use self::contract::*;
pub use self::data::*;
pub use self::jobs::*;

use crate::types::Pk;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A kind of resource served under a fixed collection path.
pub trait Resource: DeserializeOwned + Send + 'static {
    /// Collection path relative to the server URL, e.g. `v1/core/datasets/`.
    const PATH: &'static str;

    /// Whether deleting only marks the resource as deleted, see [SoftDelete].
    const SOFT_DELETE: bool = false;

    /// Body for creating, or fully updating, a resource.
    type New: Serialize + Send + Sync;

    fn pk(&self) -> Pk;
}

/// A resource which is marked as deleted rather than removed, and which can
/// be reinstated.
pub trait SoftDelete: Resource {}

/// A resource with a `name` field which identifies it.
pub trait Named: Resource {
    fn name(&self) -> &str;
}
