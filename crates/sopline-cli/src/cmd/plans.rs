use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sopline_core::billing::{Limit, LimitError, Plan};
use sopline_core::config::resolve_config;

use crate::output::{OutputMode, Renderable, pretty_kv, pretty_section, render_list};

#[derive(Args, Debug)]
pub struct PlansArgs {
    /// Only show this plan (`starter` or `pro`).
    #[arg(long)]
    pub plan: Option<String>,

    /// Check whether one more employee fits when N are already on the team.
    #[arg(long, value_name = "N")]
    pub employees: Option<usize>,

    /// Check whether one more SOP fits when M already exist.
    #[arg(long, value_name = "M")]
    pub sops: Option<usize>,
}

/// Outcome of one limit check.
#[derive(Debug, Serialize)]
pub struct Gate {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Result<(), LimitError>> for Gate {
    fn from(result: Result<(), LimitError>) -> Self {
        match result {
            Ok(()) => Self {
                allowed: true,
                reason: None,
            },
            Err(err) => Self {
                allowed: false,
                reason: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub plan: Plan,
    pub name: &'static str,
    pub monthly_price: u32,
    pub employee_limit: Limit,
    pub sop_limit: Limit,
    pub price_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_seat: Option<Gate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sop_slot: Option<Gate>,
}

impl PlanReport {
    fn gates_text(&self) -> String {
        let label = |gate: &Option<Gate>| match gate {
            Some(g) if g.allowed => "ok",
            Some(_) => "blocked",
            None => "-",
        };
        format!("{}  {}", label(&self.employee_seat), label(&self.sop_slot))
    }
}

impl Renderable for PlanReport {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("{} (${}/month)", self.name, self.monthly_price))?;
        pretty_kv(w, "Employees", self.employee_limit.to_string())?;
        pretty_kv(w, "SOPs", self.sop_limit.to_string())?;
        pretty_kv(w, "Price id", self.price_id.as_deref().unwrap_or("(not configured)"))?;
        for (label, gate) in [("Add employee", &self.employee_seat), ("Add SOP", &self.sop_slot)] {
            if let Some(gate) = gate {
                let verdict = gate.reason.as_deref().unwrap_or("allowed");
                pretty_kv(w, label, verdict)?;
            }
        }
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}  {}",
            self.plan,
            self.monthly_price,
            self.employee_limit,
            self.sop_limit,
            self.gates_text()
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["PLAN", "PRICE", "EMPLOYEES", "SOPS", "ADD_EMPLOYEE", "ADD_SOP"]
    }
}

fn report(plan: Plan, price_id: Option<&str>, args: &PlansArgs) -> PlanReport {
    PlanReport {
        plan,
        name: plan.display_name(),
        monthly_price: plan.monthly_price(),
        employee_limit: plan.employee_limit(),
        sop_limit: plan.sop_limit(),
        price_id: price_id.map(str::to_string),
        employee_seat: args.employees.map(|n| plan.check_employee_seat(n).into()),
        sop_slot: args.sops.map(|m| plan.check_sop_slot(m).into()),
    }
}

pub fn run_plans(args: &PlansArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let config = resolve_config(project_root)?;
    let plans = match &args.plan {
        Some(name) => vec![name.parse::<Plan>()?],
        None => Plan::ALL.to_vec(),
    };

    let reports: Vec<PlanReport> = plans
        .into_iter()
        .map(|plan| report(plan, plan.price_id(&config.project.billing), args))
        .collect();
    render_list(&reports, output)
}
