//! Filter predicates and their compilation into the API's nested filter arrays.
//!
//! The API expects filters as infix JSON arrays: a single clause is
//! `["field", ">=", 100]`, and clauses are joined by connective tokens,
//! `[clause, "and", clause, "or", clause]`. Nested arrays group
//! sub-expressions. [`FilterExpr`] models this as a tree where every group
//! carries exactly one connective, so precedence is never ambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::Error;

/// Maximum number of clauses the API accepts in one `filters` array.
pub const MAX_FILTER_CLAUSES: usize = 8;

/// Semantic type of a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Text,
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FieldKind::Numeric => "numeric",
                FieldKind::Text => "text",
                FieldKind::Boolean => "boolean",
            }
        )
    }
}

/// A filterable field: the dotted path the API uses plus its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    path: &'static str,
    kind: FieldKind,
}

impl Field {
    pub const fn numeric(path: &'static str) -> Self {
        Self {
            path,
            kind: FieldKind::Numeric,
        }
    }

    pub const fn text(path: &'static str) -> Self {
        Self {
            path,
            kind: FieldKind::Text,
        }
    }

    pub const fn boolean(path: &'static str) -> Self {
        Self {
            path,
            kind: FieldKind::Boolean,
        }
    }

    /// Dotted path, e.g. `keyword_data.keyword_info.search_volume`.
    pub fn path(&self) -> &'static str {
        self.path
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// Comparison operators understood by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Ne,
    Like,
    NotLike,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    /// The token placed in the wire array.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Ne => "<>",
            FilterOperator::Like => "like",
            FilterOperator::NotLike => "not_like",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
        }
    }

    fn accepts(&self, kind: FieldKind) -> bool {
        match self {
            FilterOperator::Eq | FilterOperator::Ne => true,
            FilterOperator::Like | FilterOperator::NotLike => kind == FieldKind::Text,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
                kind == FieldKind::Numeric
            }
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A primitive value on the right-hand side of a clause.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl FilterValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FilterValue::Int(_) | FilterValue::Float(_) => FieldKind::Numeric,
            FilterValue::Text(_) => FieldKind::Text,
            FilterValue::Bool(_) => FieldKind::Boolean,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FilterValue::Int(v) => json!(v),
            FilterValue::Float(v) => json!(v),
            FilterValue::Text(v) => json!(v),
            FilterValue::Bool(v) => json!(v),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

/// A single `field operator value` constraint.
///
/// Construction checks that the value matches the field's kind and that the
/// operator makes sense for it, so a built clause is always sendable.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    field: Field,
    operator: FilterOperator,
    value: FilterValue,
}

impl FilterClause {
    pub fn new(
        field: Field,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Result<Self, Error> {
        let value = value.into();
        if value.kind() != field.kind() {
            return Err(Error::InvalidFilter(format!(
                "field '{}' is {} but the value is {}",
                field.path(),
                field.kind(),
                value.kind()
            )));
        }
        if !operator.accepts(field.kind()) {
            return Err(Error::InvalidFilter(format!(
                "operator '{}' cannot be used on {} field '{}'",
                operator,
                field.kind(),
                field.path()
            )));
        }
        if let FilterValue::Float(v) = &value {
            if !v.is_finite() {
                return Err(Error::InvalidFilter(format!(
                    "field '{}' needs a finite number",
                    field.path()
                )));
            }
        }
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub fn field(&self) -> Field {
        self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    fn to_wire(&self) -> Value {
        json!([self.field.path(), self.operator.as_str(), self.value.to_json()])
    }
}

/// Boolean connective joining the members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connective::And => "and",
            Connective::Or => "or",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Connective {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(Connective::And),
            "or" => Ok(Connective::Or),
            other => Err(Error::InvalidFilter(format!(
                "unknown connective '{}'. Valid values: and, or",
                other
            ))),
        }
    }
}

/// A filter tree: either one clause or a group of sub-expressions sharing a
/// single connective.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Clause(FilterClause),
    Group {
        connective: Connective,
        children: Vec<FilterExpr>,
    },
}

impl From<FilterClause> for FilterExpr {
    fn from(clause: FilterClause) -> Self {
        FilterExpr::Clause(clause)
    }
}

impl FilterExpr {
    /// Conjunction of `children`, compiled flat as `[a, "and", b, "and", c]`.
    pub fn all(children: Vec<FilterExpr>) -> Self {
        FilterExpr::Group {
            connective: Connective::And,
            children,
        }
    }

    /// Disjunction of `children`, compiled flat as `[a, "or", b, "or", c]`.
    pub fn any(children: Vec<FilterExpr>) -> Self {
        FilterExpr::Group {
            connective: Connective::Or,
            children,
        }
    }

    /// Reduces a list whose members each carry their own connective into a
    /// left-associative tree: `a, (op2, b), (op3, c)` becomes
    /// `[[a, op2, b], op3, c]`.
    pub fn fold_left<I>(first: FilterExpr, rest: I) -> Self
    where
        I: IntoIterator<Item = (Connective, FilterExpr)>,
    {
        rest.into_iter()
            .fold(first, |acc, (connective, next)| FilterExpr::Group {
                connective,
                children: vec![acc, next],
            })
    }

    /// Number of clauses in the tree.
    pub fn clause_count(&self) -> usize {
        match self {
            FilterExpr::Clause(_) => 1,
            FilterExpr::Group { children, .. } => children.iter().map(|c| c.clause_count()).sum(),
        }
    }

    /// Drops empty groups and collapses single-member groups into their
    /// member. Returns `None` when nothing is left.
    pub fn simplify(self) -> Option<FilterExpr> {
        match self {
            FilterExpr::Clause(_) => Some(self),
            FilterExpr::Group {
                connective,
                children,
            } => {
                let mut children: Vec<FilterExpr> =
                    children.into_iter().filter_map(|c| c.simplify()).collect();
                match children.len() {
                    0 => None,
                    1 => children.pop(),
                    _ => Some(FilterExpr::Group {
                        connective,
                        children,
                    }),
                }
            }
        }
    }

    /// Compiles the tree into the value of the request's `filters` field.
    ///
    /// Returns `Ok(None)` when the tree holds no clause; the caller must then
    /// omit the key, since the API rejects an empty array.
    pub fn compile(&self) -> Result<Option<Value>, Error> {
        let Some(expr) = self.clone().simplify() else {
            return Ok(None);
        };
        let count = expr.clause_count();
        if count > MAX_FILTER_CLAUSES {
            return Err(Error::InvalidFilter(format!(
                "{} clauses given, the API accepts at most {}",
                count, MAX_FILTER_CLAUSES
            )));
        }
        Ok(Some(expr.to_wire()))
    }

    fn to_wire(&self) -> Value {
        match self {
            FilterExpr::Clause(clause) => clause.to_wire(),
            FilterExpr::Group {
                connective,
                children,
            } => {
                let mut out = Vec::with_capacity(children.len() * 2);
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(Value::String(connective.as_str().to_string()));
                    }
                    out.push(child.to_wire());
                }
                Value::Array(out)
            }
        }
    }
}
