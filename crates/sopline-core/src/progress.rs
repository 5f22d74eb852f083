//! Training progress roll-ups.
//!
//! Pure builders compute progress from typed records; the `load_*`
//! functions fetch those records through a [`Client`] the same way
//! application pages do.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::client::Client;
use crate::error::DecodeError;
use crate::model::{Assignment, Person, Procedure, ProcedureStep, Role, StepCompletion};
use crate::store::Table;

/// Whole-number percentage of `done` over `total`, rounded half up.
/// Zero when `total` is zero; never above 100.
#[must_use]
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (done.min(total) * 200 + total) / (total * 2);
    u8::try_from(rounded).unwrap_or(100)
}

/// Display band for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTier {
    Complete,
    OnTrack,
    Behind,
}

impl ProgressTier {
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        match percent {
            100.. => Self::Complete,
            50..=99 => Self::OnTrack,
            _ => Self::Behind,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::OnTrack => "on_track",
            Self::Behind => "behind",
        }
    }
}

impl std::fmt::Display for ProgressTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step-level progress of one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentProgress {
    pub assignment_id: String,
    pub sop_id: String,
    pub sop_title: Option<String>,
    pub employee_id: String,
    pub due_date: Option<String>,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percent: u8,
    pub is_complete: bool,
    pub tier: ProgressTier,
}

impl AssignmentProgress {
    /// `steps` and `completions` may cover other procedures and assignments;
    /// only the rows belonging to `assignment` are counted.
    #[must_use]
    pub fn build(
        assignment: &Assignment,
        procedure: Option<&Procedure>,
        steps: &[ProcedureStep],
        completions: &[StepCompletion],
    ) -> Self {
        let step_ids: HashSet<&str> = steps
            .iter()
            .filter(|step| step.sop_id == assignment.sop_id)
            .map(|step| step.id.as_str())
            .collect();
        let done: HashSet<&str> = completions
            .iter()
            .filter(|c| c.assignment_id == assignment.id && step_ids.contains(c.step_id.as_str()))
            .map(|c| c.step_id.as_str())
            .collect();

        let percent = percent(done.len(), step_ids.len());
        Self {
            assignment_id: assignment.id.clone(),
            sop_id: assignment.sop_id.clone(),
            sop_title: procedure.map(|p| p.title.clone()),
            employee_id: assignment.employee_id.clone(),
            due_date: assignment.due_date.clone(),
            total_steps: step_ids.len(),
            completed_steps: done.len(),
            percent,
            is_complete: assignment.completed_at.is_some() || percent == 100,
            tier: ProgressTier::from_percent(percent),
        }
    }
}

/// One person's checklist: every assignment plus the step totals across them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingOverview {
    pub employee_id: String,
    pub assignments: Vec<AssignmentProgress>,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percent: u8,
}

impl TrainingOverview {
    #[must_use]
    pub fn build(
        employee_id: &str,
        assignments: &[Assignment],
        procedures: &[Procedure],
        steps: &[ProcedureStep],
        completions: &[StepCompletion],
    ) -> Self {
        let by_id: HashMap<&str, &Procedure> = procedures.iter().map(|p| (p.id.as_str(), p)).collect();
        let assignments: Vec<AssignmentProgress> = assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .map(|a| AssignmentProgress::build(a, by_id.get(a.sop_id.as_str()).copied(), steps, completions))
            .collect();

        let total_steps = assignments.iter().map(|a| a.total_steps).sum();
        let completed_steps = assignments.iter().map(|a| a.completed_steps).sum();
        Self {
            employee_id: employee_id.to_string(),
            assignments,
            total_steps,
            completed_steps,
            percent: percent(completed_steps, total_steps),
        }
    }
}

/// Assignment-level progress of one team member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeProgress {
    pub employee_id: String,
    pub name: String,
    pub initials: String,
    pub role: Role,
    pub total_assignments: usize,
    pub completed_assignments: usize,
    pub percent: u8,
    pub tier: ProgressTier,
}

impl EmployeeProgress {
    /// An assignment counts as completed only once `completed_at` is set.
    #[must_use]
    pub fn build(person: &Person, assignments: &[Assignment]) -> Self {
        let mine = assignments.iter().filter(|a| a.employee_id == person.id);
        let (total, completed) = mine.fold((0, 0), |(total, completed), a| {
            (total + 1, completed + usize::from(a.completed_at.is_some()))
        });
        let percent = percent(completed, total);
        Self {
            employee_id: person.id.clone(),
            name: person.display_name().to_string(),
            initials: person.initials(),
            role: person.role,
            total_assignments: total,
            completed_assignments: completed,
            percent,
            tier: ProgressTier::from_percent(percent),
        }
    }
}

/// Dashboard counters for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationSummary {
    pub company_id: String,
    /// Non-archived procedures.
    pub procedure_count: usize,
    /// Members other than owners.
    pub team_size: usize,
    pub total_assignments: usize,
    pub completed_assignments: usize,
    pub in_progress_assignments: usize,
    pub completion_rate: u8,
}

impl OrganizationSummary {
    /// `assignments` must already be scoped to the organization.
    #[must_use]
    pub fn build(company_id: &str, procedures: &[Procedure], people: &[Person], assignments: &[Assignment]) -> Self {
        let procedure_count = procedures
            .iter()
            .filter(|p| p.company_id == company_id && !p.is_archived)
            .count();
        let team_size = people
            .iter()
            .filter(|p| p.company_id.as_deref() == Some(company_id) && p.role != Role::Owner)
            .count();
        let completed = assignments.iter().filter(|a| a.completed_at.is_some()).count();

        Self {
            company_id: company_id.to_string(),
            procedure_count,
            team_size,
            total_assignments: assignments.len(),
            completed_assignments: completed,
            in_progress_assignments: assignments.len() - completed,
            completion_rate: percent(completed, assignments.len()),
        }
    }
}

/// Checklist for `employee_id`.
///
/// # Errors
///
/// Returns [`DecodeError`] if a fetched row does not match its record type.
pub async fn load_training(client: &Client, employee_id: &str) -> Result<TrainingOverview, DecodeError> {
    let assignments: Vec<Assignment> = client
        .from(Table::Assignments)
        .select("*")
        .eq("employee_id", employee_id)
        .await
        .into_records()?;
    if assignments.is_empty() {
        return Ok(TrainingOverview::build(employee_id, &[], &[], &[], &[]));
    }

    let sop_ids: Vec<&str> = assignments.iter().map(|a| a.sop_id.as_str()).collect();
    let procedures: Vec<Procedure> = client
        .from(Table::Procedures)
        .select("*")
        .in_("id", sop_ids.clone())
        .await
        .into_records()?;
    let steps: Vec<ProcedureStep> = client
        .from(Table::ProcedureSteps)
        .select("*")
        .in_("sop_id", sop_ids)
        .order("position", true)
        .await
        .into_records()?;
    let completions: Vec<StepCompletion> = client
        .from(Table::StepCompletions)
        .select("*")
        .eq("employee_id", employee_id)
        .await
        .into_records()?;

    Ok(TrainingOverview::build(
        employee_id,
        &assignments,
        &procedures,
        &steps,
        &completions,
    ))
}

/// Per-member progress for everyone in `company_id` except owners.
///
/// # Errors
///
/// Returns [`DecodeError`] if a fetched row does not match its record type.
pub async fn load_team(client: &Client, company_id: &str) -> Result<Vec<EmployeeProgress>, DecodeError> {
    let people: Vec<Person> = client
        .from(Table::People)
        .select("*")
        .eq("company_id", company_id)
        .neq("role", Role::Owner.as_str())
        .order("created_at", true)
        .await
        .into_records()?;
    if people.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = people.iter().map(|p| p.id.as_str()).collect();
    let assignments: Vec<Assignment> = client
        .from(Table::Assignments)
        .select("*")
        .in_("employee_id", ids)
        .await
        .into_records()?;

    Ok(people
        .iter()
        .map(|person| EmployeeProgress::build(person, &assignments))
        .collect())
}

/// Dashboard counters for `company_id`. Assignments are scoped through the
/// organization's procedures, archived ones included.
///
/// # Errors
///
/// Returns [`DecodeError`] if a fetched row does not match its record type.
pub async fn load_summary(client: &Client, company_id: &str) -> Result<OrganizationSummary, DecodeError> {
    let procedures: Vec<Procedure> = client
        .from(Table::Procedures)
        .select("*")
        .eq("company_id", company_id)
        .await
        .into_records()?;
    let people: Vec<Person> = client
        .from(Table::People)
        .select_with_count("*", crate::query::CountOption::Exact)
        .eq("company_id", company_id)
        .await
        .into_records()?;

    // An empty `in_` list would not filter at all.
    let assignments: Vec<Assignment> = if procedures.is_empty() {
        Vec::new()
    } else {
        client
            .from(Table::Assignments)
            .select("*")
            .in_("sop_id", procedures.iter().map(|p| p.id.as_str()))
            .await
            .into_records()?
    };

    Ok(OrganizationSummary::build(company_id, &procedures, &people, &assignments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RecordStore, seed};
    use std::sync::Arc;

    fn client() -> Client {
        Client::mock(Arc::new(RecordStore::seeded()))
    }

    #[test]
    fn percent_rounds_half_up_and_handles_empty() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 4), 25);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(4, 7), 57);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
    }

    #[test]
    fn tiers_follow_percent_bands() {
        assert_eq!(ProgressTier::from_percent(100), ProgressTier::Complete);
        assert_eq!(ProgressTier::from_percent(50), ProgressTier::OnTrack);
        assert_eq!(ProgressTier::from_percent(99), ProgressTier::OnTrack);
        assert_eq!(ProgressTier::from_percent(49), ProgressTier::Behind);
        assert_eq!(ProgressTier::from_percent(0).to_string(), "behind");
    }

    #[tokio::test]
    async fn training_for_first_employee_matches_seed() {
        let overview = load_training(&client(), seed::MOCK_EMPLOYEE_1_ID).await.unwrap();
        assert_eq!(overview.assignments.len(), 2);

        let a1 = &overview.assignments[0];
        assert_eq!(a1.assignment_id, seed::ASSIGNMENT_1_ID);
        assert_eq!((a1.completed_steps, a1.total_steps, a1.percent), (3, 3, 100));
        assert!(a1.is_complete);
        assert_eq!(a1.sop_title.as_deref(), Some("Opening Procedure"));

        let a2 = &overview.assignments[1];
        assert_eq!(a2.assignment_id, seed::ASSIGNMENT_2_ID);
        assert_eq!((a2.completed_steps, a2.total_steps, a2.percent), (1, 4, 25));
        assert!(!a2.is_complete);
        assert_eq!(a2.tier, ProgressTier::Behind);

        assert_eq!((overview.completed_steps, overview.total_steps), (4, 7));
        assert_eq!(overview.percent, 57);
    }

    #[tokio::test]
    async fn owner_assignment_is_half_done() {
        let overview = load_training(&client(), seed::MOCK_OWNER_ID).await.unwrap();
        assert_eq!(overview.assignments.len(), 1);
        let a5 = &overview.assignments[0];
        assert_eq!(a5.assignment_id, seed::ASSIGNMENT_5_ID);
        assert_eq!(a5.percent, 50);
        assert_eq!(a5.tier, ProgressTier::OnTrack);
    }

    #[tokio::test]
    async fn person_without_assignments_has_empty_training() {
        let overview = load_training(&client(), seed::MOCK_MANAGER_ID).await.unwrap();
        assert!(overview.assignments.is_empty());
        assert_eq!(overview.percent, 0);
    }

    #[tokio::test]
    async fn team_excludes_owner() {
        let team = load_team(&client(), seed::MOCK_COMPANY_ID).await.unwrap();
        let ids: Vec<&str> = team.iter().map(|e| e.employee_id.as_str()).collect();
        assert_eq!(ids, vec![seed::MOCK_MANAGER_ID, seed::MOCK_EMPLOYEE_1_ID, seed::MOCK_EMPLOYEE_2_ID]);

        let priya = &team[1];
        assert_eq!(priya.initials, "PP");
        assert_eq!((priya.completed_assignments, priya.total_assignments), (1, 2));
        assert_eq!(priya.percent, 50);

        let carlos = &team[0];
        assert_eq!(carlos.total_assignments, 0);
        assert_eq!(carlos.percent, 0);
    }

    #[tokio::test]
    async fn summary_matches_seed() {
        let summary = load_summary(&client(), seed::MOCK_COMPANY_ID).await.unwrap();
        assert_eq!(summary.procedure_count, 3);
        assert_eq!(summary.team_size, 3);
        assert_eq!(summary.total_assignments, 5);
        assert_eq!(summary.completed_assignments, 2);
        assert_eq!(summary.in_progress_assignments, 3);
        assert_eq!(summary.completion_rate, 40);
    }

    #[tokio::test]
    async fn summary_for_unknown_company_is_empty() {
        let summary = load_summary(&client(), "no-such-company").await.unwrap();
        assert_eq!(summary.procedure_count, 0);
        assert_eq!(summary.total_assignments, 0);
        assert_eq!(summary.completion_rate, 0);
    }
}
