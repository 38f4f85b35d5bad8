use super::non_empty_field;
use crate::errors::FilterError;
use serde::Serialize;

/// Ordering of the results of a [super::Filter].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ascending: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nulls_first: Option<bool>,
}

impl OrderBy {
    /// Order by `field`, leaving the direction to the server (ascending).
    pub fn new(field: impl Into<String>) -> Result<Self, FilterError> {
        Ok(Self {
            field: non_empty_field(field)?,
            ascending: None,
            nulls_first: None,
        })
    }

    pub fn ascending(field: impl Into<String>) -> Result<Self, FilterError> {
        Ok(Self::new(field)?.direction(true))
    }

    pub fn descending(field: impl Into<String>) -> Result<Self, FilterError> {
        Ok(Self::new(field)?.direction(false))
    }

    pub fn direction(self, ascending: bool) -> Self {
        Self {
            ascending: Some(ascending),
            ..self
        }
    }

    pub fn nulls_first(self, nulls_first: bool) -> Self {
        Self {
            nulls_first: Some(nulls_first),
            ..self
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}
