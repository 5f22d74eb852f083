//! Chainable query builder over the [`RecordStore`].
//!
//! Mirrors the hosted client's `from(table).select().eq(..).single()` call
//! shape. Every chained call consumes the builder and returns the updated
//! value, so a partially built query can be cloned and reused without
//! sharing state. Awaiting the builder (or calling [`QueryBuilder::execute`])
//! resolves it against the store:
//!
//! - **select**: filters apply in chained order, then the limit, then the
//!   single/list shaping. `count` is the row count after filters and limit.
//! - **insert / upsert**: the payload comes back merged over a synthesized
//!   `id`. Nothing is written to the store.
//! - **update / delete**: resolve to null data.
//!
//! No resolution ever reports an error.

mod filter;
mod response;

use std::future::{IntoFuture, Ready, ready};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::store::{RecordStore, Row, Table};

pub use filter::Filter;
pub use response::{Data, QueryError, QueryResponse};

/// Row-count strategy requested alongside a select. All strategies count
/// exactly against the in-memory table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountOption {
    Exact,
    Planned,
    Estimated,
}

/// Ordering hint. Recorded on the request but not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// What the request does once resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Select,
    Insert(Value),
    Update(Value),
    Upsert(Value),
    Delete,
}

impl Operation {
    /// Lowercase operation name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Upsert(_) => "upsert",
            Self::Delete => "delete",
        }
    }
}

/// Accumulated query intent, independent of any store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub table: Table,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub single: bool,
    pub count: Option<CountOption>,
    pub operation: Operation,
}

impl QueryRequest {
    /// A plain read of every row in `table`.
    #[must_use]
    pub const fn new(table: Table) -> Self {
        Self {
            table,
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            single: false,
            count: None,
            operation: Operation::Select,
        }
    }

    /// Resolve against `store`. `stamp_ms` seeds synthesized identifiers.
    #[must_use]
    pub fn resolve(&self, store: &RecordStore, stamp_ms: i64) -> QueryResponse {
        match &self.operation {
            Operation::Select => self.resolve_select(store),
            Operation::Insert(payload) | Operation::Upsert(payload) => {
                QueryResponse::ok(synthesize(payload, store, stamp_ms), None)
            }
            Operation::Update(_) | Operation::Delete => QueryResponse::ok(None, None),
        }
    }

    fn resolve_select(&self, store: &RecordStore) -> QueryResponse {
        let mut rows: Vec<&Row> = store.rows(self.table).iter().collect();
        for filter in &self.filters {
            rows.retain(|row| filter.matches(row));
        }
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }

        let count = rows.len();
        let data = if self.single {
            rows.first().map(|row| Data::Row((*row).clone()))
        } else {
            Some(Data::Rows(rows.into_iter().cloned().collect()))
        };
        QueryResponse::ok(data, Some(count))
    }
}

/// Merge each payload object over a fresh `id`. Payload fields win, so a
/// caller-supplied `id` is kept.
fn synthesize(payload: &Value, store: &RecordStore, stamp_ms: i64) -> Option<Data> {
    let with_id = |item: &Value| {
        let mut row = Row::new();
        row.insert("id".to_string(), Value::String(store.next_mock_id(stamp_ms)));
        if let Value::Object(fields) = item {
            for (column, value) in fields {
                row.insert(column.clone(), value.clone());
            }
        }
        row
    };

    match payload {
        Value::Null => None,
        Value::Array(items) => Some(Data::Rows(items.iter().map(with_id).collect())),
        other => Some(Data::Row(with_id(other))),
    }
}

/// A query bound to a store, built by chaining and resolved by awaiting.
#[derive(Debug, Clone)]
#[must_use = "a query does nothing until it is awaited or executed"]
pub struct QueryBuilder {
    store: Arc<RecordStore>,
    request: QueryRequest,
}

impl QueryBuilder {
    pub fn new(store: Arc<RecordStore>, table: Table) -> Self {
        Self {
            store,
            request: QueryRequest::new(table),
        }
    }

    /// Mark read intent. `columns` is recorded but every column is returned.
    ///
    /// Does not clear a pending mutation, so
    /// `insert(..).select("*").single()` still resolves as an insert.
    pub fn select(mut self, columns: &str) -> Self {
        self.request.columns = Some(columns.to_string());
        self
    }

    /// [`select`](Self::select) and request a row count.
    pub fn select_with_count(mut self, columns: &str, count: CountOption) -> Self {
        self.request.count = Some(count);
        self.select(columns)
    }

    /// Keep rows where `column` strictly equals `value`.
    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.request.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Keep rows where `column` does not strictly equal `value`.
    pub fn neq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.request.filters.push(Filter::Neq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    /// Keep rows where `column` equals one of `values`.
    ///
    /// An empty `values` adds no predicate at all: the query behaves as if
    /// `in_` had not been called, rather than matching nothing.
    pub fn in_<V: Into<Value>>(mut self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.request.filters.push(Filter::In {
                column: column.to_string(),
                values,
            });
        }
        self
    }

    /// Ordering hint. Accepted for call-shape compatibility; rows keep
    /// store order.
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.request.order.push(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Return at most `n` rows, counted after all filters.
    pub const fn limit(mut self, n: usize) -> Self {
        self.request.limit = Some(n);
        self
    }

    /// Resolve to the first matching row (or null) instead of a list.
    pub const fn single(mut self) -> Self {
        self.request.single = true;
        self
    }

    pub fn insert(mut self, payload: impl Into<Value>) -> Self {
        self.request.operation = Operation::Insert(payload.into());
        self
    }

    pub fn update(mut self, payload: impl Into<Value>) -> Self {
        self.request.operation = Operation::Update(payload.into());
        self
    }

    pub fn upsert(mut self, payload: impl Into<Value>) -> Self {
        self.request.operation = Operation::Upsert(payload.into());
        self
    }

    pub fn delete(mut self) -> Self {
        self.request.operation = Operation::Delete;
        self
    }

    /// The accumulated request.
    #[must_use]
    pub const fn request(&self) -> &QueryRequest {
        &self.request
    }

    /// Resolve synchronously.
    #[must_use]
    pub fn execute(self) -> QueryResponse {
        let response = self
            .request
            .resolve(&self.store, Utc::now().timestamp_millis());
        debug!(
            table = %self.request.table,
            operation = self.request.operation.name(),
            filters = self.request.filters.len(),
            single = self.request.single,
            count_requested = self.request.count.is_some(),
            rows = response.rows().len(),
            "resolved mock query"
        );
        response
    }
}

impl IntoFuture for QueryBuilder {
    type Output = QueryResponse;
    type IntoFuture = Ready<QueryResponse>;

    fn into_future(self) -> Self::IntoFuture {
        ready(self.execute())
    }
}
