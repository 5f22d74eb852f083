use std::path::Path;

use anyhow::{Result, anyhow};
use serde::Serialize;
use sopline_core::Table;
use sopline_core::auth::User;
use sopline_core::billing::Plan;
use sopline_core::model::{Organization, Person};

use super::{current_profile, open_client};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// The signed-in identity with its profile and organization.
#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub user: User,
    pub profile: Option<Person>,
    pub organization: Option<Organization>,
    pub plan: Option<Plan>,
    pub can_manage_team: bool,
}

pub async fn run_whoami(project_root: &Path, output: OutputMode) -> Result<()> {
    let client = open_client(project_root)?;
    let user = client
        .auth
        .get_user()
        .await
        .data
        .user
        .ok_or_else(|| anyhow!("not signed in"))?;
    let profile = current_profile(&client).await?;

    let organization = match profile.as_ref().and_then(|p| p.company_id.as_deref()) {
        Some(company_id) => client
            .from(Table::Organizations)
            .select("*")
            .eq("id", company_id)
            .single()
            .await
            .into_record::<Organization>()?,
        None => None,
    };

    let report = WhoAmI {
        can_manage_team: profile.as_ref().is_some_and(|p| p.role.can_manage_team()),
        plan: organization.as_ref().and_then(Plan::for_organization),
        user,
        profile,
        organization,
    };

    render_mode(
        output,
        &report,
        |r, w| {
            writeln!(w, "id={}", r.user.id)?;
            writeln!(w, "email={}", r.user.email)?;
            if let Some(profile) = &r.profile {
                writeln!(w, "name={}", profile.display_name())?;
                writeln!(w, "role={}", profile.role)?;
            }
            if let Some(org) = &r.organization {
                writeln!(w, "organization={}", org.name)?;
            }
            Ok(())
        },
        |r, w| {
            pretty_section(w, "Signed in")?;
            pretty_kv(w, "User", &r.user.id)?;
            pretty_kv(w, "Email", &r.user.email)?;
            if let Some(profile) = &r.profile {
                pretty_kv(w, "Name", format!("{} ({})", profile.display_name(), profile.initials()))?;
                pretty_kv(w, "Role", profile.role.to_string())?;
                pretty_kv(w, "Manages team", if r.can_manage_team { "yes" } else { "no" })?;
            }
            if let Some(org) = &r.organization {
                pretty_kv(w, "Organization", &org.name)?;
                let plan = r.plan.map_or("none", Plan::display_name);
                pretty_kv(w, "Plan", plan)?;
            }
            Ok(())
        },
    )
}
