//! Development fixtures: one cleaning company, its four people, three
//! procedures and a spread of training progress.
//!
//! Progress states covered by the seed:
//!
//! | Assignment | Person | Procedure | Completed steps |
//! |---|---|---|---|
//! | 1 | Priya (employee) | Opening Procedure (3 steps) | 3 (done) |
//! | 2 | Priya (employee) | Safety Orientation (4 steps) | 1 |
//! | 3 | Tom (employee) | Safety Orientation (4 steps) | 4 (done) |
//! | 4 | Tom (employee) | Deep Clean Bathroom (2 steps) | 0 |
//! | 5 | Jane (owner) | Safety Orientation (4 steps) | 2 |

use serde_json::{Value, json};

use super::{Row, Table};

pub const MOCK_COMPANY_ID: &str = "c0000000-0000-0000-0000-000000000001";
pub const MOCK_OWNER_ID: &str = "u0000000-0000-0000-0000-000000000001";
pub const MOCK_MANAGER_ID: &str = "u0000000-0000-0000-0000-000000000002";
pub const MOCK_EMPLOYEE_1_ID: &str = "u0000000-0000-0000-0000-000000000003";
pub const MOCK_EMPLOYEE_2_ID: &str = "u0000000-0000-0000-0000-000000000004";

/// Email of the fixed identity returned by the auth stub.
pub const MOCK_OWNER_EMAIL: &str = "owner@demo.com";
/// Account creation time of the fixed identity.
pub const MOCK_OWNER_CREATED_AT: &str = "2024-01-01T00:00:00Z";

pub const SOP_OPENING_ID: &str = "s0000000-0000-0000-0000-000000000001";
pub const SOP_BATHROOM_ID: &str = "s0000000-0000-0000-0000-000000000002";
pub const SOP_SAFETY_ID: &str = "s0000000-0000-0000-0000-000000000003";

const STEP_OPENING_1: &str = "st00000000-0000-0000-0000-000000000011";
const STEP_OPENING_2: &str = "st00000000-0000-0000-0000-000000000012";
const STEP_OPENING_3: &str = "st00000000-0000-0000-0000-000000000013";
const STEP_BATHROOM_1: &str = "st00000000-0000-0000-0000-000000000021";
const STEP_BATHROOM_2: &str = "st00000000-0000-0000-0000-000000000022";
const STEP_SAFETY_1: &str = "st00000000-0000-0000-0000-000000000031";
const STEP_SAFETY_2: &str = "st00000000-0000-0000-0000-000000000032";
const STEP_SAFETY_3: &str = "st00000000-0000-0000-0000-000000000033";
const STEP_SAFETY_4: &str = "st00000000-0000-0000-0000-000000000034";

pub const ASSIGNMENT_1_ID: &str = "a0000000-0000-0000-0000-000000000001";
pub const ASSIGNMENT_2_ID: &str = "a0000000-0000-0000-0000-000000000002";
pub const ASSIGNMENT_3_ID: &str = "a0000000-0000-0000-0000-000000000003";
pub const ASSIGNMENT_4_ID: &str = "a0000000-0000-0000-0000-000000000004";
pub const ASSIGNMENT_5_ID: &str = "a0000000-0000-0000-0000-000000000005";

/// All seed tables, keyed by table.
pub(crate) fn tables() -> Vec<(Table, Vec<Row>)> {
    vec![
        (Table::Organizations, rows(organizations())),
        (Table::People, rows(people())),
        (Table::Procedures, rows(procedures())),
        (Table::ProcedureSteps, rows(procedure_steps())),
        (Table::Assignments, rows(assignments())),
        (Table::StepCompletions, rows(step_completions())),
        (Table::Invitations, Vec::new()),
    ]
}

fn rows(values: Vec<Value>) -> Vec<Row> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect()
}

fn organizations() -> Vec<Value> {
    vec![json!({
        "id": MOCK_COMPANY_ID,
        "name": "Acme Cleaning Co.",
        "owner_id": MOCK_OWNER_ID,
        "stripe_customer_id": null,
        "stripe_subscription_id": null,
        "subscription_status": "trialing",
        "subscription_plan": "starter",
        "created_at": "2024-01-01T00:00:00Z",
    })]
}

fn people() -> Vec<Value> {
    let person = |id: &str, email: &str, name: &str, role: &str, invited_by: Option<&str>, at: &str| {
        json!({
            "id": id,
            "email": email,
            "full_name": name,
            "company_id": MOCK_COMPANY_ID,
            "role": role,
            "invited_by": invited_by,
            "created_at": at,
        })
    };

    vec![
        person(MOCK_OWNER_ID, MOCK_OWNER_EMAIL, "Jane Smith", "owner", None, MOCK_OWNER_CREATED_AT),
        person(
            MOCK_MANAGER_ID,
            "carlos@demo.com",
            "Carlos Rivera",
            "manager",
            Some(MOCK_OWNER_ID),
            "2024-01-05T00:00:00Z",
        ),
        person(
            MOCK_EMPLOYEE_1_ID,
            "priya@demo.com",
            "Priya Patel",
            "employee",
            Some(MOCK_OWNER_ID),
            "2024-01-10T00:00:00Z",
        ),
        person(
            MOCK_EMPLOYEE_2_ID,
            "tom@demo.com",
            "Tom Wu",
            "employee",
            Some(MOCK_MANAGER_ID),
            "2024-01-15T00:00:00Z",
        ),
    ]
}

fn procedures() -> Vec<Value> {
    let procedure = |id: &str, title: &str, description: &str, category: &str, created: &str, updated: &str| {
        json!({
            "id": id,
            "company_id": MOCK_COMPANY_ID,
            "title": title,
            "description": description,
            "category": category,
            "created_by": MOCK_OWNER_ID,
            "is_archived": false,
            "created_at": created,
            "updated_at": updated,
        })
    };

    vec![
        procedure(
            SOP_OPENING_ID,
            "Opening Procedure",
            "Steps to open and prepare the facility each morning.",
            "Opening",
            "2024-01-01T00:00:00Z",
            "2024-01-20T00:00:00Z",
        ),
        procedure(
            SOP_BATHROOM_ID,
            "Deep Clean Bathroom",
            "Full bathroom deep-clean process to be done weekly.",
            "Cleaning",
            "2024-01-02T00:00:00Z",
            "2024-01-21T00:00:00Z",
        ),
        procedure(
            SOP_SAFETY_ID,
            "New Employee Safety Orientation",
            "Required safety training every new hire must complete on their first day.",
            "Safety",
            "2024-01-03T00:00:00Z",
            "2024-01-22T00:00:00Z",
        ),
    ]
}

fn procedure_steps() -> Vec<Value> {
    let step = |id: &str, sop_id: &str, position: u32, title: &str, content: &str| {
        json!({
            "id": id,
            "sop_id": sop_id,
            "position": position,
            "title": title,
            "content": content,
            "image_url": null,
            "video_url": null,
            "created_at": "2024-01-01T00:00:00Z",
        })
    };

    vec![
        step(
            STEP_OPENING_1,
            SOP_OPENING_ID,
            1,
            "Unlock and disarm alarm",
            "Use the key code 1234* to disarm the alarm panel by the front door. You have 30 seconds once the door opens.",
        ),
        step(
            STEP_OPENING_2,
            SOP_OPENING_ID,
            2,
            "Turn on all lights",
            "Work from the front of the building to the back. All light switches are on the left side of each doorway.",
        ),
        step(
            STEP_OPENING_3,
            SOP_OPENING_ID,
            3,
            "Check supply inventory",
            "Open the supply closet and check that cleaning solutions, mops, and gloves are stocked. Reorder if any item is below 20% capacity.",
        ),
        step(
            STEP_BATHROOM_1,
            SOP_BATHROOM_ID,
            1,
            "Apply toilet bowl cleaner",
            "Squirt toilet bowl cleaner under the rim and let sit for at least 5 minutes before scrubbing.",
        ),
        step(
            STEP_BATHROOM_2,
            SOP_BATHROOM_ID,
            2,
            "Wipe all surfaces with disinfectant",
            "Use a fresh microfibre cloth with blue disinfectant spray. Wipe sink, countertop, door handle, and light switch.",
        ),
        step(
            STEP_SAFETY_1,
            SOP_SAFETY_ID,
            1,
            "Review WHMIS chemical labels",
            "All cleaning products are labeled with WHMIS symbols. Learn what each symbol means before handling any chemical.",
        ),
        step(
            STEP_SAFETY_2,
            SOP_SAFETY_ID,
            2,
            "Locate all emergency exits",
            "Walk the full building and identify every exit. There are 3 exits: front door, back loading dock, and side fire exit.",
        ),
        step(
            STEP_SAFETY_3,
            SOP_SAFETY_ID,
            3,
            "Sign the safety acknowledgement form",
            "Complete and sign the paper form in the binder at the front desk. Hand it to your manager.",
        ),
        step(
            STEP_SAFETY_4,
            SOP_SAFETY_ID,
            4,
            "Wear PPE at all times",
            "Gloves and non-slip shoes are required when on site. Safety goggles are required when mixing chemicals.",
        ),
    ]
}

fn assignments() -> Vec<Value> {
    let assignment = |id: &str,
                      sop_id: &str,
                      employee_id: &str,
                      assigned_by: &str,
                      due_date: Option<&str>,
                      completed_at: Option<&str>,
                      created_at: &str| {
        json!({
            "id": id,
            "sop_id": sop_id,
            "employee_id": employee_id,
            "assigned_by": assigned_by,
            "due_date": due_date,
            "completed_at": completed_at,
            "created_at": created_at,
        })
    };

    vec![
        assignment(
            ASSIGNMENT_1_ID,
            SOP_OPENING_ID,
            MOCK_EMPLOYEE_1_ID,
            MOCK_OWNER_ID,
            None,
            Some("2024-02-01T00:00:00Z"),
            "2024-01-15T00:00:00Z",
        ),
        assignment(
            ASSIGNMENT_2_ID,
            SOP_SAFETY_ID,
            MOCK_EMPLOYEE_1_ID,
            MOCK_OWNER_ID,
            Some("2024-03-01"),
            None,
            "2024-01-16T00:00:00Z",
        ),
        assignment(
            ASSIGNMENT_3_ID,
            SOP_SAFETY_ID,
            MOCK_EMPLOYEE_2_ID,
            MOCK_MANAGER_ID,
            None,
            Some("2024-02-05T00:00:00Z"),
            "2024-01-20T00:00:00Z",
        ),
        assignment(
            ASSIGNMENT_4_ID,
            SOP_BATHROOM_ID,
            MOCK_EMPLOYEE_2_ID,
            MOCK_MANAGER_ID,
            Some("2024-03-15"),
            None,
            "2024-01-21T00:00:00Z",
        ),
        assignment(
            ASSIGNMENT_5_ID,
            SOP_SAFETY_ID,
            MOCK_OWNER_ID,
            MOCK_OWNER_ID,
            None,
            None,
            "2024-01-10T00:00:00Z",
        ),
    ]
}

fn step_completions() -> Vec<Value> {
    let completion = |id: &str, assignment_id: &str, step_id: &str, employee_id: &str, at: &str| {
        json!({
            "id": id,
            "assignment_id": assignment_id,
            "step_id": step_id,
            "employee_id": employee_id,
            "completed_at": at,
        })
    };

    vec![
        completion("sc01", ASSIGNMENT_1_ID, STEP_OPENING_1, MOCK_EMPLOYEE_1_ID, "2024-02-01T00:00:00Z"),
        completion("sc02", ASSIGNMENT_1_ID, STEP_OPENING_2, MOCK_EMPLOYEE_1_ID, "2024-02-01T00:00:00Z"),
        completion("sc03", ASSIGNMENT_1_ID, STEP_OPENING_3, MOCK_EMPLOYEE_1_ID, "2024-02-01T00:00:00Z"),
        completion("sc04", ASSIGNMENT_2_ID, STEP_SAFETY_1, MOCK_EMPLOYEE_1_ID, "2024-02-02T00:00:00Z"),
        completion("sc05", ASSIGNMENT_3_ID, STEP_SAFETY_1, MOCK_EMPLOYEE_2_ID, "2024-02-05T00:00:00Z"),
        completion("sc06", ASSIGNMENT_3_ID, STEP_SAFETY_2, MOCK_EMPLOYEE_2_ID, "2024-02-05T00:00:00Z"),
        completion("sc07", ASSIGNMENT_3_ID, STEP_SAFETY_3, MOCK_EMPLOYEE_2_ID, "2024-02-05T00:00:00Z"),
        completion("sc08", ASSIGNMENT_3_ID, STEP_SAFETY_4, MOCK_EMPLOYEE_2_ID, "2024-02-05T00:00:00Z"),
        completion("sc09", ASSIGNMENT_5_ID, STEP_SAFETY_1, MOCK_OWNER_ID, "2024-02-10T00:00:00Z"),
        completion("sc10", ASSIGNMENT_5_ID, STEP_SAFETY_2, MOCK_OWNER_ID, "2024-02-10T00:00:00Z"),
    ]
}
