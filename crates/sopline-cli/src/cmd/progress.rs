use std::io::{self, Write};
use std::path::Path;

use anyhow::{Result, anyhow};
use clap::Args;
use sopline_core::progress::{
    self, AssignmentProgress, EmployeeProgress, OrganizationSummary, TrainingOverview,
};

use super::{current_profile, open_client};
use crate::output::{OutputMode, Renderable, pretty_kv, pretty_rule, pretty_section, render_list, render_mode};

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Person whose checklist to show (defaults to the signed-in user).
    #[arg(long, conflicts_with_all = ["org", "team"])]
    pub employee: Option<String>,

    /// Show the organization dashboard summary.
    #[arg(long, conflicts_with = "team")]
    pub org: bool,

    /// Show per-member progress for the whole team.
    #[arg(long)]
    pub team: bool,
}

pub async fn run_progress(args: &ProgressArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let client = open_client(project_root)?;

    if args.org || args.team {
        let company_id = current_profile(&client)
            .await?
            .and_then(|p| p.company_id)
            .ok_or_else(|| anyhow!("signed-in user does not belong to an organization"))?;

        if args.team {
            let team = progress::load_team(&client, &company_id).await?;
            return render_list(&team, output);
        }
        let summary = progress::load_summary(&client, &company_id).await?;
        return render_mode(output, &summary, write_summary_text, write_summary_pretty);
    }

    let employee_id = match &args.employee {
        Some(id) => id.clone(),
        None => {
            let user = client.auth.get_user().await.data.user;
            user.map(|u| u.id).ok_or_else(|| anyhow!("not signed in"))?
        }
    };
    let overview = progress::load_training(&client, &employee_id).await?;
    render_mode(output, &overview, write_training_text, write_training_pretty)
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent) / 5;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

fn write_assignment_text(a: &AssignmentProgress, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}/{}  {}%  {}",
        a.assignment_id,
        a.sop_title.as_deref().unwrap_or(&a.sop_id),
        a.completed_steps,
        a.total_steps,
        a.percent,
        if a.is_complete { "complete" } else { a.tier.as_str() }
    )
}

fn write_training_text(t: &TrainingOverview, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "ASSIGNMENT  SOP  STEPS  PERCENT  STATUS")?;
    for a in &t.assignments {
        write_assignment_text(a, w)?;
    }
    writeln!(w, "overall={}/{} {}%", t.completed_steps, t.total_steps, t.percent)
}

fn write_training_pretty(t: &TrainingOverview, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Training for {}", t.employee_id))?;
    if t.assignments.is_empty() {
        writeln!(w, "No assignments yet.")?;
        return Ok(());
    }
    for a in &t.assignments {
        let title = a.sop_title.as_deref().unwrap_or(&a.sop_id);
        let mark = if a.is_complete { "done" } else { a.tier.as_str() };
        writeln!(w, "{title:<28} {} {:>3}%  {mark}", bar(a.percent), a.percent)?;
        if let Some(due) = &a.due_date {
            writeln!(w, "{:<28} due {due}", "")?;
        }
    }
    pretty_rule(w)?;
    writeln!(
        w,
        "Overall {} {:>3}%  ({} of {} steps)",
        bar(t.percent),
        t.percent,
        t.completed_steps,
        t.total_steps
    )
}

fn write_summary_text(s: &OrganizationSummary, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "sops={}", s.procedure_count)?;
    writeln!(w, "team={}", s.team_size)?;
    writeln!(w, "completed={}", s.completed_assignments)?;
    writeln!(w, "in_progress={}", s.in_progress_assignments)?;
    writeln!(w, "completion_rate={}", s.completion_rate)
}

fn write_summary_pretty(s: &OrganizationSummary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Dashboard")?;
    pretty_kv(w, "SOPs", s.procedure_count.to_string())?;
    pretty_kv(w, "Team members", s.team_size.to_string())?;
    pretty_kv(w, "Completed", s.completed_assignments.to_string())?;
    pretty_kv(w, "In progress", s.in_progress_assignments.to_string())?;
    if s.total_assignments > 0 {
        pretty_kv(
            w,
            "Completion",
            format!("{} {}%  ({} of {})", bar(s.completion_rate), s.completion_rate, s.completed_assignments, s.total_assignments),
        )?;
    }
    Ok(())
}

impl Renderable for EmployeeProgress {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{:<3} {:<20} {:<9} {} {:>3}%  {}/{} assignments",
            self.initials,
            self.name,
            self.role.as_str(),
            bar(self.percent),
            self.percent,
            self.completed_assignments,
            self.total_assignments
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}/{}  {}%",
            self.employee_id, self.name, self.role, self.completed_assignments, self.total_assignments, self.percent
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["ID", "NAME", "ROLE", "DONE", "PERCENT"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_scales_to_twenty_cells() {
        assert_eq!(bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(bar(50), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn summary_text_lists_counters() {
        let summary = OrganizationSummary {
            company_id: "c".to_string(),
            procedure_count: 3,
            team_size: 3,
            total_assignments: 5,
            completed_assignments: 2,
            in_progress_assignments: 3,
            completion_rate: 40,
        };
        let mut buf = Vec::new();
        write_summary_text(&summary, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "sops=3\nteam=3\ncompleted=2\nin_progress=3\ncompletion_rate=40\n"
        );
    }
}
