//! # Store Queries
//!
//! A backend-neutral description of a filtered, ordered, cursor-paginated
//! read against one collection. Backends translate a [`Query`] into their
//! own wire format (or evaluate it in memory).

use crate::value::{Document, FieldValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Comparison applied by a single [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Equal,
    /// The field is an array holding the value
    ArrayContains,
    GreaterOrEqual,
    LessOrEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FieldValue,
}

impl Filter {
    /// Evaluates the filter against a document the way the hosted store does:
    /// a missing field never matches, and range comparisons only match
    /// values of the same kind as the filter value.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = doc.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Equal => {
                actual.same_kind(&self.value) && actual.total_cmp(&self.value) == Ordering::Equal
            }
            FilterOp::ArrayContains => actual
                .as_array()
                .is_some_and(|values| values.iter().any(|v| v == &self.value)),
            FilterOp::GreaterOrEqual => {
                actual.same_kind(&self.value) && actual.total_cmp(&self.value) != Ordering::Less
            }
            FilterOp::LessOrEqual => {
                actual.same_kind(&self.value)
                    && actual.total_cmp(&self.value) != Ordering::Greater
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    /// Compares two documents in scan order. The document id is the
    /// implicit tiebreaker and follows the same direction.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let null = FieldValue::Null;
        let va = a.get(&self.field).unwrap_or(&null);
        let vb = b.get(&self.field).unwrap_or(&null);
        let ord = va.total_cmp(vb).then_with(|| a.id.cmp(&b.id));
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

/// Opaque position of "the last record of the previous page".
///
/// A cursor is only meaningful for the query (same collection, filters and
/// ordering) whose page produced it; reusing it elsewhere yields an
/// unspecified page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    order_value: FieldValue,
    document_id: String,
}

impl Cursor {
    /// Captures the position of `doc` within a scan ordered by `order`.
    pub fn after(doc: &Document, order: &OrderBy) -> Self {
        Self {
            order_value: doc.get(&order.field).cloned().unwrap_or(FieldValue::Null),
            document_id: doc.id.clone(),
        }
    }

    pub fn order_value(&self) -> &FieldValue {
        &self.order_value
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// True when `doc` comes strictly after this cursor in the scan.
    pub fn admits(&self, doc: &Document, order: &OrderBy) -> bool {
        let null = FieldValue::Null;
        let value = doc.get(&order.field).unwrap_or(&null);
        let ord = value
            .total_cmp(&self.order_value)
            .then_with(|| doc.id.as_str().cmp(&self.document_id));
        match order.direction {
            Direction::Ascending => ord == Ordering::Greater,
            Direction::Descending => ord == Ordering::Less,
        }
    }
}

/// A read request against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filters: Vec<Filter>,
    order_by: Option<OrderBy>,
    start_after: Option<Cursor>,
    limit: Option<usize>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            start_after: None,
            limit: None,
        }
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<FieldValue>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn start_after(mut self, cursor: Cursor) -> Self {
        self.start_after = Some(cursor);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.start_after.as_ref()
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Cursor for the page that ended with `last`, if the query is ordered.
    pub fn cursor_after(&self, last: &Document) -> Option<Cursor> {
        self.order_by.as_ref().map(|order| Cursor::after(last, order))
    }
}

/// One page of an ordered scan plus the cursor that resumes it.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `None` when the fetched page was empty.
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, cursor: Option<Cursor>) -> Self {
        Self { items, cursor }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }
}
