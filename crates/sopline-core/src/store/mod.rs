//! In-memory record store backing the mock data-access layer.
//!
//! A [`RecordStore`] owns one row collection per [`Table`]. It is built once
//! (usually from [`seed`]) and never written through the query builder, so
//! the same store can be shared behind an `Arc` by any number of clients.

pub mod seed;
mod table;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};

use crate::error::{DecodeError, StoreError};
use crate::model::{Assignment, Invitation, Person, Procedure, ProcedureStep, Record, StepCompletion};

pub use table::Table;

/// One stored row: column name to JSON value, in insertion order.
pub type Row = Map<String, Value>;

/// Fixture tables plus the identity the auth stub reports.
#[derive(Debug)]
pub struct RecordStore {
    tables: BTreeMap<Table, Vec<Row>>,
    owner_id: String,
    id_sequence: AtomicU64,
}

impl RecordStore {
    /// An empty store whose auth identity is `owner_id`.
    #[must_use]
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            tables: Table::ALL.into_iter().map(|table| (table, Vec::new())).collect(),
            owner_id: owner_id.into(),
            id_sequence: AtomicU64::new(0),
        }
    }

    /// A store populated with the development fixtures in [`seed`].
    #[must_use]
    pub fn seeded() -> Self {
        seed::tables()
            .into_iter()
            .fold(Self::new(seed::MOCK_OWNER_ID), |store, (table, rows)| {
                store.with_rows(table, rows)
            })
    }

    /// Replace the rows of `table`.
    #[must_use]
    pub fn with_rows(mut self, table: Table, rows: Vec<Row>) -> Self {
        self.tables.insert(table, rows);
        self
    }

    /// Identity of the signed-in user reported by the auth stub.
    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// All rows of `table`, in fixture order.
    #[must_use]
    pub fn rows(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map_or(&[], Vec::as_slice)
    }

    /// Number of rows in `table`.
    #[must_use]
    pub fn len(&self, table: Table) -> usize {
        self.rows(table).len()
    }

    /// True when every table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.values().all(Vec::is_empty)
    }

    /// Decode every row of a table into its typed record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] on the first row that does not match `R`.
    pub fn records<R: Record>(&self) -> Result<Vec<R>, DecodeError> {
        self.rows(R::TABLE)
            .iter()
            .map(|row| {
                serde_json::from_value(Value::Object(row.clone())).map_err(|source| DecodeError {
                    table: R::TABLE,
                    source,
                })
            })
            .collect()
    }

    /// Next identifier for a synthesized row.
    ///
    /// The sequence is shared by every builder bound to this store, so ids
    /// stay distinct even when two inserts land in the same millisecond.
    pub(crate) fn next_mock_id(&self, stamp_ms: i64) -> String {
        let seq = self.id_sequence.fetch_add(1, Ordering::Relaxed);
        format!("mock-{stamp_ms}-{seq}")
    }

    /// Check the model invariants across all tables.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFixtures`] listing every violation found.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut violations = Vec::new();
        if let Err(err) = self.collect_violations(&mut violations) {
            violations.push(err.to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(StoreError::InvalidFixtures(violations))
        }
    }

    fn collect_violations(&self, out: &mut Vec<String>) -> Result<(), DecodeError> {
        let people: HashSet<String> = self
            .records::<Person>()?
            .into_iter()
            .map(|person| person.id)
            .collect();
        let procedures: HashSet<String> = self
            .records::<Procedure>()?
            .into_iter()
            .map(|procedure| procedure.id)
            .collect();
        let steps = self.records::<ProcedureStep>()?;
        let assignments: HashMap<String, Assignment> = self
            .records::<Assignment>()?
            .into_iter()
            .map(|assignment| (assignment.id.clone(), assignment))
            .collect();

        let mut positions: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        let mut step_owner: HashMap<&str, &str> = HashMap::new();
        for step in &steps {
            if !procedures.contains(&step.sop_id) {
                out.push(format!("step {} references unknown procedure {}", step.id, step.sop_id));
            }
            positions.entry(&step.sop_id).or_default().push(step.position);
            step_owner.insert(&step.id, &step.sop_id);
        }
        for (sop_id, mut seen) in positions {
            seen.sort_unstable();
            let dense = seen.iter().copied().eq(1..=u32::try_from(seen.len()).unwrap_or(u32::MAX));
            if !dense {
                out.push(format!(
                    "procedure {sop_id} step positions {seen:?} are not dense from 1"
                ));
            }
        }

        for assignment in assignments.values() {
            if !procedures.contains(&assignment.sop_id) {
                out.push(format!(
                    "assignment {} references unknown procedure {}",
                    assignment.id, assignment.sop_id
                ));
            }
            if !people.contains(&assignment.employee_id) {
                out.push(format!(
                    "assignment {} references unknown person {}",
                    assignment.id, assignment.employee_id
                ));
            }
        }

        for completion in self.records::<StepCompletion>()? {
            let Some(assignment) = assignments.get(&completion.assignment_id) else {
                out.push(format!(
                    "completion {} references unknown assignment {}",
                    completion.id, completion.assignment_id
                ));
                continue;
            };
            match step_owner.get(completion.step_id.as_str()) {
                None => out.push(format!(
                    "completion {} references unknown step {}",
                    completion.id, completion.step_id
                )),
                Some(sop_id) if *sop_id != assignment.sop_id => out.push(format!(
                    "completion {} marks step {} outside procedure {} of assignment {}",
                    completion.id, completion.step_id, assignment.sop_id, assignment.id
                )),
                Some(_) => {}
            }
            if completion.employee_id != assignment.employee_id {
                out.push(format!(
                    "completion {} belongs to {} but assignment {} is for {}",
                    completion.id, completion.employee_id, assignment.id, assignment.employee_id
                ));
            }
        }

        let mut invited = HashSet::new();
        for invite in self.records::<Invitation>()? {
            let key = (invite.company_id.clone(), invite.email.to_ascii_lowercase());
            if !invited.insert(key) {
                out.push(format!(
                    "duplicate invitation for {} in organization {}",
                    invite.email, invite.company_id
                ));
            }
        }

        Ok(())
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InviteRole;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn seeded_store_is_consistent() {
        let store = RecordStore::seeded();
        assert_eq!(store.owner_id(), seed::MOCK_OWNER_ID);
        assert_eq!(store.len(Table::StepCompletions), 10);
        store.validate().expect("seed must satisfy invariants");
    }

    #[test]
    fn seeded_rows_decode_into_records() {
        let store = RecordStore::seeded();
        let steps = store.records::<ProcedureStep>().unwrap();
        assert_eq!(steps.len(), 9);
        let people = store.records::<Person>().unwrap();
        assert_eq!(people[0].email, seed::MOCK_OWNER_EMAIL);
    }

    #[test]
    fn new_store_has_every_table_empty() {
        let store = RecordStore::new("u1");
        assert!(store.is_empty());
        for table in Table::ALL {
            assert!(store.rows(table).is_empty());
        }
        store.validate().unwrap();
    }

    #[test]
    fn gap_in_step_positions_is_reported() {
        let store = RecordStore::new("u1")
            .with_rows(Table::Procedures, vec![row(json!({
                "id": "s1", "company_id": "c1", "title": "T", "description": null,
                "category": null, "created_by": "u1", "is_archived": false,
                "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-01T00:00:00Z"
            }))])
            .with_rows(
                Table::ProcedureSteps,
                [1, 3]
                    .into_iter()
                    .map(|pos| {
                        row(json!({
                            "id": format!("st{pos}"), "sop_id": "s1", "position": pos,
                            "title": "step", "content": null, "image_url": null,
                            "video_url": null, "created_at": "2024-01-01T00:00:00Z"
                        }))
                    })
                    .collect(),
            );

        let err = store.validate().unwrap_err();
        let StoreError::InvalidFixtures(violations) = err else {
            panic!("unexpected error kind");
        };
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("not dense"));
    }

    #[test]
    fn completion_outside_assigned_procedure_is_reported() {
        let mut rows: Vec<Row> = RecordStore::seeded().rows(Table::StepCompletions).to_vec();
        // sc04 belongs to assignment 2 (safety); point it at an opening step.
        rows[3].insert("step_id".to_string(), json!("st00000000-0000-0000-0000-000000000011"));
        let store = RecordStore::seeded().with_rows(Table::StepCompletions, rows);

        let err = store.validate().unwrap_err();
        assert!(err.to_string().contains("outside procedure"));
    }

    #[test]
    fn duplicate_invitations_are_reported_case_insensitively() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let first = Invitation::new("i1", seed::MOCK_COMPANY_ID, "new@demo.com", InviteRole::Employee, seed::MOCK_OWNER_ID, now);
        let mut second = first.clone();
        second.id = "i2".to_string();
        second.email = "NEW@demo.com".to_string();

        let rows = [first, second]
            .iter()
            .map(|invite| row(serde_json::to_value(invite).unwrap()))
            .collect();
        let store = RecordStore::seeded().with_rows(Table::Invitations, rows);
        let err = store.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate invitation"));
    }

    #[test]
    fn mock_ids_are_unique_within_a_millisecond() {
        let store = RecordStore::new("u1");
        let a = store.next_mock_id(1_700_000_000_000);
        let b = store.next_mock_id(1_700_000_000_000);
        assert_ne!(a, b);
        assert!(a.starts_with("mock-1700000000000-"));
    }
}
