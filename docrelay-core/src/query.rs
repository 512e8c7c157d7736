//! Backend-agnostic query model: filters, sorters, and windowing.
//!
//! A [`Query`] describes *what* to fetch; it is immutable and carries no
//! backend knowledge. Terminal adapters inspect the filter tree structurally
//! (via [`QueryVisitor`]) to build backend-native query parameters rather
//! than executing it themselves.
//!
//! # Query building
//!
//! ```ignore
//! use docrelay_core::query::{Query, Filter, Sorter};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("status", "active").and(Filter::gt("age", 18)))
//!     .sorter(Sorter::by("age").then_desc("name"))
//!     .skip(5)
//!     .take(10)
//!     .build();
//! ```
//!
//! # Filter expressions
//!
//! [`Filter`] provides static constructors for the common expression forms:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - String: `starts_with`, `ends_with`, `contains`, `not_contains`
//! - Full text: `matches` (the operator the search-promotion layer rewrites)
//! - Existence: `exists`, `not_exists`
//! - Array: `any_of`, `none_of`
//! - Logical: `and`, `or`

use bson::Bson;

use crate::error::DatabaseError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// One field of a (possibly composite) ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordering over one or more named fields.
///
/// Keys apply in declaration order: documents are compared by the first key,
/// ties fall through to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sorter {
    keys: Vec<SortKey>,
}

impl Sorter {
    /// Starts an ascending ordering on `field`.
    pub fn by(field: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey { field: field.into(), direction: SortDirection::Asc }],
        }
    }

    /// Starts a descending ordering on `field`.
    pub fn by_desc(field: impl Into<String>) -> Self {
        Self {
            keys: vec![SortKey { field: field.into(), direction: SortDirection::Desc }],
        }
    }

    /// Appends an ascending tie-break key.
    pub fn then(mut self, field: impl Into<String>) -> Self {
        self.keys.push(SortKey { field: field.into(), direction: SortDirection::Asc });
        self
    }

    /// Appends a descending tie-break key.
    pub fn then_desc(mut self, field: impl Into<String>) -> Self {
        self.keys.push(SortKey { field: field.into(), direction: SortDirection::Desc });
        self
    }

    /// The ordered keys of this sorter.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Expands the sorter into a backend ordering parameter: the field names
    /// comma-joined in declaration order (a composite sort on `a` then `b`
    /// yields `"a,b"`).
    pub fn order_param(&self) -> String {
        self.keys
            .iter()
            .map(|key| key.field.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// String or array contains value.
    Contains,
    /// String or array does not contain value.
    NotContains,
    /// String starts with value.
    StartsWith,
    /// String ends with value.
    EndsWith,
    /// Array contains any of the values.
    AnyOf,
    /// Array contains none of the values.
    NoneOf,
    /// Full-text match. Executed natively by search-capable backends;
    /// otherwise rewritten by the search-promotion layer.
    Matches,
}

/// A filter expression over document fields.
///
/// Expressions combine with `And`/`Or`/`Not` into a predicate tree. The tree
/// is data: adapters walk it with a [`QueryVisitor`], they never evaluate it
/// against values unless they are the terminal scan implementation.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression.
    Not(Box<Expr>),
    /// Checks whether a field exists.
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is
    /// appended to its list.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression.
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Whether any field comparison in this tree uses `op`.
    pub fn uses_op(&self, op: &FieldOp) -> bool {
        match self {
            Expr::And(list) | Expr::Or(list) => list.iter().any(|expr| expr.uses_op(op)),
            Expr::Not(inner) => inner.uses_op(op),
            Expr::Exists(..) => false,
            Expr::Field { op: own, .. } => own == op,
        }
    }
}

/// A backend-agnostic description of what to fetch.
///
/// `skip` defaults to 0; `take` absent means "backend default" and must not
/// be translated as zero by adapters.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Optional filter expression documents must match.
    pub filter: Option<Expr>,
    /// Ordering of the results; when absent, order is backend-defined and
    /// not stable across calls.
    pub sorter: Option<Sorter>,
    /// Number of matching documents to skip before the first result.
    pub skip: usize,
    /// Maximum number of documents to return.
    pub take: Option<usize>,
}

impl Query {
    /// Creates an empty query matching every document.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Static constructors for filter expressions.
///
/// All methods accept field names and values as `Into<String>` and
/// `Into<Bson>` for ergonomics.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field does not equal the value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Matches documents where the field is greater than the value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Matches documents where the field is greater than or equal to the value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Matches documents where the field is less than the value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Matches documents where the field is less than or equal to the value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches documents where the string field starts with the value.
    pub fn starts_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::StartsWith, value.into())
    }

    /// Matches documents where the string field ends with the value.
    pub fn ends_with(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::EndsWith, value.into())
    }

    /// Matches documents where the field (string or array) contains the value.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, value.into())
    }

    /// Matches documents where the field (string or array) does not contain the value.
    pub fn not_contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NotContains, value.into())
    }

    /// Full-text match on the field.
    pub fn matches(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Matches, value.into())
    }

    /// Matches documents where the field exists.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Matches documents where the field does not exist.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    /// Logical AND over multiple expressions.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Logical OR over multiple expressions.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Matches documents where the array field contains any of the values.
    pub fn any_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::AnyOf, value.into())
    }

    /// Matches documents where the array field contains none of the values.
    pub fn none_of(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NoneOf, value.into())
    }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Sets the filter expression.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Sets the complete sorter.
    pub fn sorter(mut self, sorter: Sorter) -> Self {
        self.query.sorter = Some(sorter);
        self
    }

    /// Appends one sort key; repeated calls build a composite ordering.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        let sorter = match (self.query.sorter.take(), direction) {
            (Some(sorter), SortDirection::Asc) => sorter.then(field),
            (Some(sorter), SortDirection::Desc) => sorter.then_desc(field),
            (None, SortDirection::Asc) => Sorter::by(field),
            (None, SortDirection::Desc) => Sorter::by_desc(field),
        };
        self.query.sorter = Some(sorter);
        self
    }

    /// Sets the number of matching documents to skip.
    pub fn skip(mut self, skip: usize) -> Self {
        self.query.skip = skip;
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn take(mut self, take: usize) -> Self {
        self.query.take = Some(take);
        self
    }

    /// Builds the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural walk over a filter tree.
///
/// Terminal adapters implement this to translate expressions into
/// backend-native query parameters (or, for scanning backends, to evaluate
/// them against stored documents).
pub trait QueryVisitor {
    type Output;
    type Error: Into<DatabaseError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
