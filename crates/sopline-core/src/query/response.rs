use serde::Serialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::model::Record;
use crate::store::Row;

/// Payload of a resolved query: one row or a list of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    Row(Row),
    Rows(Vec<Row>),
}

/// Error shape reported by the hosted backend.
///
/// The mock never produces one, but callers receive `Option<QueryError>`
/// and must handle a populated value when running against the real service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// The `{ data, error, count }` triple every query resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub data: Option<Data>,
    pub error: Option<QueryError>,
    pub count: Option<usize>,
}

impl QueryResponse {
    pub(crate) const fn ok(data: Option<Data>, count: Option<usize>) -> Self {
        Self {
            data,
            error: None,
            count,
        }
    }

    /// True when no error was reported.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Rows in the payload: the single row as a one-element slice, the list
    /// as-is, or nothing when data is null.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match &self.data {
            Some(Data::Row(row)) => std::slice::from_ref(row),
            Some(Data::Rows(rows)) => rows,
            None => &[],
        }
    }

    /// Decode all rows into typed records.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on the first row that does not match `R`.
    pub fn into_records<R: Record>(self) -> Result<Vec<R>, DecodeError> {
        let rows = match self.data {
            Some(Data::Row(row)) => vec![row],
            Some(Data::Rows(rows)) => rows,
            None => Vec::new(),
        };
        rows.into_iter().map(decode::<R>).collect()
    }

    /// Decode the single row (or the first row) into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the row does not match `R`.
    pub fn into_record<R: Record>(self) -> Result<Option<R>, DecodeError> {
        let row = match self.data {
            Some(Data::Row(row)) => Some(row),
            Some(Data::Rows(rows)) => rows.into_iter().next(),
            None => None,
        };
        row.map(decode::<R>).transpose()
    }
}

fn decode<R: Record>(row: Row) -> Result<R, DecodeError> {
    serde_json::from_value(Value::Object(row)).map_err(|source| DecodeError {
        table: R::TABLE,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{Data, QueryResponse};
    use crate::model::Person;
    use crate::store::{RecordStore, Table};
    use serde_json::json;

    #[test]
    fn null_data_has_no_rows() {
        let response = QueryResponse::ok(None, Some(0));
        assert!(response.rows().is_empty());
        assert!(response.rows().first().is_none());
        assert!(response.into_records::<Person>().unwrap().is_empty());
    }

    #[test]
    fn single_row_is_exposed_as_one_element_slice() {
        let store = RecordStore::seeded();
        let row = store.rows(Table::People)[1].clone();
        let response = QueryResponse::ok(Some(Data::Row(row)), Some(1));
        assert_eq!(response.rows().len(), 1);
        let person = response.into_record::<Person>().unwrap().unwrap();
        assert_eq!(person.email, "carlos@demo.com");
    }

    #[test]
    fn serializes_to_data_error_count() {
        let response = QueryResponse::ok(Some(Data::Rows(Vec::new())), Some(0));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"data": [], "error": null, "count": 0})
        );
    }

    #[test]
    fn decode_error_names_the_table() {
        let mut row = crate::store::Row::new();
        row.insert("id".to_string(), json!(7));
        let response = QueryResponse::ok(Some(Data::Row(row)), None);
        let err = response.into_record::<Person>().unwrap_err();
        assert!(err.to_string().starts_with("failed to decode profiles row"));
    }
}
