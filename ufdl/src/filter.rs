//! Server-side query filters.
//!
//! A [Filter] is a list of [Expression]s plus an optional ordering. It is
//! pure data: it is serialized to JSON and sent as the body of `list`
//! requests, and the server does the filtering.
//!
//! ```
//! use ufdl::filter::{Expression, Filter, OrderBy};
//!
//! let filter = Filter::new()
//!     .with(Expression::contains("name", "cats", true).unwrap())
//!     .order_by(OrderBy::descending("creation_time").unwrap());
//! ```

mod expression;
mod order;

pub use expression::*;
pub use order::*;

use crate::errors::FilterError;
use serde::Serialize;

/// Top-level query sent to `list` endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    expressions: Vec<Expression>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    order_by: Vec<OrderBy>,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

impl Filter {
    /// A filter which matches everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expression which must hold.
    pub fn with(mut self, expression: Expression) -> Self {
        self.expressions.push(expression);
        self
    }

    /// Add an ordering. Orderings apply in the order they are added.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Copy of this filter which matches what this filter does not.
    pub fn inverted(mut self) -> Self {
        self.invert = !self.invert;
        self
    }

    /// Append an expression in place, for filters which are built up incrementally.
    pub fn add_sub_expression(&mut self, expression: Expression) {
        self.expressions.push(expression);
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }
}

impl From<Expression> for Filter {
    fn from(expression: Expression) -> Self {
        Filter::new().with(expression)
    }
}

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}

pub(crate) fn non_empty_field(field: impl Into<String>) -> Result<String, FilterError> {
    let field = field.into();
    if field.is_empty() {
        Err(FilterError::EmptyField)
    } else {
        Ok(field)
    }
}
