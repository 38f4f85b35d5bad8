use super::{is_false, non_empty_field};
use crate::errors::FilterError;
use crate::types::Pk;
use serde::Serialize;

/// A node of a filter expression tree.
///
/// Expressions are validated when they are built: logical expressions need at
/// least two sub-expressions, an `and` cannot directly contain an `or`, and
/// string values cannot be empty. An `or` may contain an `and`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Expression {
    And(Logical),
    Or(Logical),
    Exact(Exact),
    Contains(Contains),
    #[serde(rename = "isnull")]
    IsNull(IsNull),
    Compare(Compare),
}

/// Sub-expressions of an `and` or an `or`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Logical {
    sub_expressions: Vec<Expression>,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

/// Field is exactly equal to a string or a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exact {
    field: String,
    value: ExactValue,
    #[serde(skip_serializing_if = "is_false")]
    case_insensitive: bool,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExactValue {
    Text(String),
    Number(Number),
}

/// String field contains a sub-string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contains {
    field: String,
    sub_string: String,
    #[serde(skip_serializing_if = "is_false")]
    case_insensitive: bool,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

/// Field is null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsNull {
    field: String,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

/// Numeric field compared to a value, `field <operator> value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compare {
    field: String,
    value: Number,
    operator: CompareOp,
    #[serde(skip_serializing_if = "is_false")]
    invert: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
}

/// A JSON number, kept integral when it was given as an integer.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// NaN and infinities have no JSON representation.
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Integer(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }
}

fn finite(field: &str, value: Number) -> Result<Number, FilterError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FilterError::NonFiniteNumber(field.to_string()))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::Integer(value.into())
    }
}

impl From<Pk> for Number {
    fn from(value: Pk) -> Self {
        Number::Integer(value.0.into())
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl Expression {
    /// All sub-expressions must hold. None of them may be an `or`.
    pub fn and(sub_expressions: impl IntoIterator<Item = Expression>) -> Result<Self, FilterError> {
        let sub_expressions: Vec<_> = sub_expressions.into_iter().collect();
        if sub_expressions.iter().any(Expression::is_or) {
            return Err(FilterError::OrInsideAnd);
        }
        Ok(Expression::And(Logical::new(sub_expressions)?))
    }

    /// At least one sub-expression must hold.
    pub fn or(sub_expressions: impl IntoIterator<Item = Expression>) -> Result<Self, FilterError> {
        let sub_expressions: Vec<_> = sub_expressions.into_iter().collect();
        Ok(Expression::Or(Logical::new(sub_expressions)?))
    }

    pub fn exact_string(
        field: impl Into<String>,
        value: impl Into<String>,
        case_insensitive: bool,
    ) -> Result<Self, FilterError> {
        let field = non_empty_field(field)?;
        let value = value.into();
        if value.is_empty() {
            return Err(FilterError::EmptyValue(field));
        }
        Ok(Expression::Exact(Exact {
            field,
            value: ExactValue::Text(value),
            case_insensitive,
            invert: false,
        }))
    }

    pub fn exact_number(
        field: impl Into<String>,
        value: impl Into<Number>,
    ) -> Result<Self, FilterError> {
        let field = non_empty_field(field)?;
        let value = finite(&field, value.into())?;
        Ok(Expression::Exact(Exact {
            field,
            value: ExactValue::Number(value),
            case_insensitive: false,
            invert: false,
        }))
    }

    pub fn contains(
        field: impl Into<String>,
        sub_string: impl Into<String>,
        case_insensitive: bool,
    ) -> Result<Self, FilterError> {
        let field = non_empty_field(field)?;
        let sub_string = sub_string.into();
        if sub_string.is_empty() {
            return Err(FilterError::EmptyValue(field));
        }
        Ok(Expression::Contains(Contains {
            field,
            sub_string,
            case_insensitive,
            invert: false,
        }))
    }

    pub fn is_null(field: impl Into<String>) -> Result<Self, FilterError> {
        Ok(Expression::IsNull(IsNull {
            field: non_empty_field(field)?,
            invert: false,
        }))
    }

    pub fn compare(
        field: impl Into<String>,
        operator: CompareOp,
        value: impl Into<Number>,
    ) -> Result<Self, FilterError> {
        let field = non_empty_field(field)?;
        let value = finite(&field, value.into())?;
        Ok(Expression::Compare(Compare {
            field,
            value,
            operator,
            invert: false,
        }))
    }

    /// Copy of this expression which holds when this one does not.
    pub fn inverted(mut self) -> Self {
        let invert = self.invert_mut();
        *invert = !*invert;
        self
    }

    pub fn is_inverted(&self) -> bool {
        match self {
            Expression::And(e) | Expression::Or(e) => e.invert,
            Expression::Exact(e) => e.invert,
            Expression::Contains(e) => e.invert,
            Expression::IsNull(e) => e.invert,
            Expression::Compare(e) => e.invert,
        }
    }

    pub fn is_or(&self) -> bool {
        matches!(self, Expression::Or(_))
    }

    /// Field this expression is about, `None` for logical expressions.
    pub fn field(&self) -> Option<&str> {
        match self {
            Expression::And(_) | Expression::Or(_) => None,
            Expression::Exact(e) => Some(&e.field),
            Expression::Contains(e) => Some(&e.field),
            Expression::IsNull(e) => Some(&e.field),
            Expression::Compare(e) => Some(&e.field),
        }
    }

    pub fn sub_expressions(&self) -> Option<&[Expression]> {
        match self {
            Expression::And(e) | Expression::Or(e) => Some(&e.sub_expressions),
            _ => None,
        }
    }

    /// Append a sub-expression to an `and` or an `or` in place.
    pub fn add_sub_expression(&mut self, expression: Expression) -> Result<(), FilterError> {
        match self {
            Expression::And(_) if expression.is_or() => Err(FilterError::OrInsideAnd),
            Expression::And(e) | Expression::Or(e) => {
                e.sub_expressions.push(expression);
                Ok(())
            }
            _ => Err(FilterError::NotLogical),
        }
    }

    fn invert_mut(&mut self) -> &mut bool {
        match self {
            Expression::And(e) | Expression::Or(e) => &mut e.invert,
            Expression::Exact(e) => &mut e.invert,
            Expression::Contains(e) => &mut e.invert,
            Expression::IsNull(e) => &mut e.invert,
            Expression::Compare(e) => &mut e.invert,
        }
    }
}

impl Logical {
    fn new(sub_expressions: Vec<Expression>) -> Result<Self, FilterError> {
        if sub_expressions.len() < 2 {
            return Err(FilterError::TooFewSubExpressions(sub_expressions.len()));
        }
        Ok(Self {
            sub_expressions,
            invert: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use serde_json::json;

    fn name(value: &str) -> Expression {
        Expression::exact_string("name", value, false).unwrap()
    }

    fn either() -> Expression {
        Expression::or([name("a"), name("b")]).unwrap()
    }

    fn both() -> Expression {
        Expression::and([name("a"), Expression::is_null("tags").unwrap()]).unwrap()
    }

    #[test]
    fn test_and_rejects_direct_or() {
        assert_eq!(
            Expression::and([either(), name("c")]).unwrap_err(),
            FilterError::OrInsideAnd
        );
    }

    #[test]
    fn test_or_accepts_and() {
        let expression = Expression::or([both(), name("c")]).unwrap();
        assert_eq!(expression.sub_expressions().unwrap().len(), 2);
    }

    #[test]
    fn test_and_rejects_inverted_or() {
        let inverted = Expression::or([both(), either()]).unwrap().inverted();
        assert_eq!(
            Expression::and([inverted.clone(), name("c")]).unwrap_err(),
            FilterError::OrInsideAnd
        );
        let mut and = both();
        assert_eq!(
            and.add_sub_expression(inverted).unwrap_err(),
            FilterError::OrInsideAnd
        );
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_non_finite_numbers(#[case] value: f64) {
        assert_eq!(
            Expression::compare("x", CompareOp::LessThan, value).unwrap_err(),
            FilterError::NonFiniteNumber("x".to_string())
        );
        assert_eq!(
            Expression::exact_number("x", value).unwrap_err(),
            FilterError::NonFiniteNumber("x".to_string())
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn test_too_few_sub_expressions(#[case] n: usize) {
        let subs = || (0..n).map(|_| name("a"));
        assert_eq!(
            Expression::and(subs()).unwrap_err(),
            FilterError::TooFewSubExpressions(n)
        );
        assert_eq!(
            Expression::or(subs()).unwrap_err(),
            FilterError::TooFewSubExpressions(n)
        );
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(
            Expression::exact_string("name", "", true).unwrap_err(),
            FilterError::EmptyValue("name".to_string())
        );
        assert_eq!(
            Expression::contains("name", "", false).unwrap_err(),
            FilterError::EmptyValue("name".to_string())
        );
        assert_eq!(
            Expression::is_null("").unwrap_err(),
            FilterError::EmptyField
        );
        assert_eq!(
            Expression::exact_number("", 1).unwrap_err(),
            FilterError::EmptyField
        );
    }

    #[test]
    fn test_exact_string_json() {
        let expression = Expression::exact_string("name", "robert", true).unwrap();
        assert_eq!(
            serde_json::to_value(&expression).unwrap(),
            json!({"type": "exact", "field": "name", "value": "robert", "case_insensitive": true})
        );
    }

    #[rstest]
    #[case(Expression::exact_number("pk", 3).unwrap(), json!({"type": "exact", "field": "pk", "value": 3}))]
    #[case(Expression::exact_number("gpu_mem", 1.5).unwrap().inverted(), json!({"type": "exact", "field": "gpu_mem", "value": 1.5, "invert": true}))]
    #[case(Expression::contains("name", "cat", true).unwrap(), json!({"type": "contains", "field": "name", "sub_string": "cat", "case_insensitive": true}))]
    #[case(Expression::is_null("deletion_time").unwrap().inverted(), json!({"type": "isnull", "field": "deletion_time", "invert": true}))]
    #[case(Expression::compare("version", CompareOp::GreaterThanOrEqual, 2).unwrap(), json!({"type": "compare", "field": "version", "value": 2, "operator": ">="}))]
    #[case(Expression::compare("version", CompareOp::LessThan, 2).unwrap(), json!({"type": "compare", "field": "version", "value": 2, "operator": "<"}))]
    fn test_field_predicate_json(#[case] expression: Expression, #[case] expected: serde_json::Value) {
        assert_eq!(serde_json::to_value(&expression).unwrap(), expected);
    }

    #[test]
    fn test_logical_json() {
        let expression = Expression::or([both(), name("c")]).unwrap().inverted();
        let expected = json!({
            "type": "or",
            "sub_expressions": [
                {
                    "type": "and",
                    "sub_expressions": [
                        {"type": "exact", "field": "name", "value": "a"},
                        {"type": "isnull", "field": "tags"}
                    ]
                },
                {"type": "exact", "field": "name", "value": "c"}
            ],
            "invert": true
        });
        assert_eq!(serde_json::to_value(&expression).unwrap(), expected);
    }

    #[test]
    fn test_inverted_leaves_original() {
        let original = name("a");
        let inverted = original.clone().inverted();
        assert!(!original.is_inverted());
        assert!(inverted.is_inverted());
        assert!(!inverted.inverted().is_inverted());
    }

    #[test]
    fn test_add_sub_expression() {
        let mut and = both();
        and.add_sub_expression(name("c")).unwrap();
        assert_eq!(and.sub_expressions().unwrap().len(), 3);
        assert_eq!(
            and.add_sub_expression(either()).unwrap_err(),
            FilterError::OrInsideAnd
        );
        assert_eq!(and.sub_expressions().unwrap().len(), 3);

        let mut or = either();
        or.add_sub_expression(both()).unwrap();
        assert_eq!(or.sub_expressions().unwrap().len(), 3);

        let mut leaf = name("a");
        assert_eq!(
            leaf.add_sub_expression(name("b")).unwrap_err(),
            FilterError::NotLogical
        );
    }

    #[test]
    fn test_field() {
        assert_eq!(name("a").field(), Some("name"));
        assert_eq!(both().field(), None);
    }
}
