use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of work a job template performs. Every contract the server knows
/// about is listed in [Contract::ALL].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contract {
    Train,
    Predict,
}

impl Contract {
    pub const ALL: [Contract; 2] = [Contract::Train, Contract::Predict];

    pub fn name(&self) -> &'static str {
        match self {
            Contract::Train => "Train",
            Contract::Predict => "Predict",
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Unknown contract \"{0}\"")]
pub struct UnknownContract(pub String);

impl FromStr for Contract {
    type Err = UnknownContract;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Contract::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownContract(s.to_string()))
    }
}
