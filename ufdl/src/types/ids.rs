use serde::{Deserialize, Serialize};
use shrinkwraprs::Shrinkwrap;
use std::fmt;

/// Primary key of a UFDL resource.
///
/// Primary keys are never negative, so the type is unsigned.
#[derive(
    Copy, Clone, Shrinkwrap, Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Ord, PartialOrd,
)]
pub struct Pk(pub u32);

impl fmt::Display for Pk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Pk {
    fn from(value: u32) -> Self {
        Pk(value)
    }
}
