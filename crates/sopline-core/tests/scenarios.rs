use std::sync::Arc;

use serde_json::{Value, json};
use sopline_core::model::{ProcedureStep, StepCompletion};
use sopline_core::store::seed;
use sopline_core::{Client, RecordStore, Table};

fn client() -> Client {
    Client::mock(Arc::new(RecordStore::seeded()))
}

#[tokio::test]
async fn active_procedures_include_opening_with_three_ordered_steps() {
    let client = client();
    let procedures = client
        .from(Table::Procedures)
        .select("*")
        .eq("company_id", seed::MOCK_COMPANY_ID)
        .eq("is_archived", false)
        .await;
    assert!(procedures.is_ok());
    assert!(
        procedures
            .rows()
            .iter()
            .any(|row| row.get("id") == Some(&json!(seed::SOP_OPENING_ID)))
    );

    let steps: Vec<ProcedureStep> = client
        .from(Table::ProcedureSteps)
        .select("*")
        .eq("sop_id", seed::SOP_OPENING_ID)
        .order("position", true)
        .await
        .into_records()
        .unwrap();
    let positions: Vec<u32> = steps.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
}

#[tokio::test]
async fn completions_per_assignment_and_employee() {
    let client = client();
    let done = |assignment: &'static str| {
        client
            .from(Table::StepCompletions)
            .select("*")
            .eq("assignment_id", assignment)
            .eq("employee_id", seed::MOCK_EMPLOYEE_1_ID)
    };

    let first: Vec<StepCompletion> = done(seed::ASSIGNMENT_1_ID).await.into_records().unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|c| c.assignment_id == seed::ASSIGNMENT_1_ID));

    let second = done(seed::ASSIGNMENT_2_ID).await;
    assert_eq!(second.rows().len(), 1);
    assert_eq!(second.count, Some(1));
}

#[tokio::test]
async fn inserted_procedure_is_echoed_but_not_persisted() {
    let client = client();
    let created = client
        .from(Table::Procedures)
        .insert(json!({"title": "X"}))
        .select("*")
        .single()
        .await;
    assert!(created.error.is_none());
    let row = created.rows().first().unwrap();
    assert_eq!(row.get("title"), Some(&json!("X")));
    assert!(row.get("id").and_then(Value::as_str).is_some_and(|id| id.starts_with("mock-")));
    assert_eq!(row.len(), 2);

    let reread = client.from(Table::Procedures).select("*").eq("title", "X").await;
    assert!(reread.rows().is_empty());
    assert_eq!(client.store().len(Table::Procedures), 3);
}

#[tokio::test]
async fn two_inserts_get_distinct_ids() {
    let client = client();
    let a = client.from(Table::Assignments).insert(json!({"sop_id": seed::SOP_SAFETY_ID})).await;
    let b = client.from(Table::Assignments).insert(json!({"sop_id": seed::SOP_SAFETY_ID})).await;
    let id = |r: &sopline_core::QueryResponse| r.rows().first().and_then(|row| row.get("id")).cloned();
    assert_ne!(id(&a), id(&b));
}

#[tokio::test]
async fn update_and_delete_resolve_to_null_without_error() {
    let client = client();
    let updated = client
        .from(Table::Assignments)
        .update(json!({"completed_at": "2024-03-01T00:00:00Z"}))
        .eq("id", seed::ASSIGNMENT_2_ID)
        .await;
    assert!(updated.data.is_none());
    assert!(updated.error.is_none());

    let deleted = client.from(Table::Assignments).delete().eq("id", seed::ASSIGNMENT_2_ID).await;
    assert!(deleted.data.is_none());
    assert!(deleted.error.is_none());

    let still_there = client
        .from(Table::Assignments)
        .select("*")
        .eq("id", seed::ASSIGNMENT_2_ID)
        .single()
        .await;
    assert_eq!(
        still_there.rows().first().and_then(|row| row.get("completed_at")),
        Some(&Value::Null)
    );
}

#[tokio::test]
async fn single_without_match_is_null_with_zero_count() {
    let response = client()
        .from(Table::People)
        .select("*")
        .eq("id", "nobody")
        .single()
        .await;
    assert!(response.data.is_none());
    assert!(response.error.is_none());
    assert_eq!(response.count, Some(0));
}

#[test]
fn seed_fixtures_pass_validation() {
    RecordStore::seeded().validate().unwrap();
}
