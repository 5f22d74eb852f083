use std::io::{self, Write};
use std::path::Path;

use anyhow::{Result, anyhow, bail};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use sopline_core::invite::{pending_invite, send_invite};
use sopline_core::model::{InviteRole, Invitation};

use super::{current_profile, open_client};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Result of looking up the invitation waiting for one address.
#[derive(Debug, Serialize)]
pub struct PendingLookup {
    pub email: String,
    pub invitation: Option<Invitation>,
}

#[derive(Args, Debug)]
pub struct InviteArgs {
    /// Email address to invite.
    pub email: String,

    /// Role granted when the invitation is accepted (`employee` or `manager`).
    #[arg(long, default_value = "employee")]
    pub role: String,

    /// Look up a pending invitation for EMAIL instead of sending one.
    #[arg(long)]
    pub check: bool,
}

pub async fn run_invite(args: &InviteArgs, project_root: &Path, output: OutputMode) -> Result<()> {
    let client = open_client(project_root)?;

    if args.check {
        let lookup = PendingLookup {
            email: args.email.trim().to_ascii_lowercase(),
            invitation: pending_invite(&client, &args.email, Utc::now()).await?,
        };
        return render_mode(output, &lookup, write_pending_text, write_pending_pretty);
    }

    let role: InviteRole = args.role.parse()?;
    let profile = current_profile(&client)
        .await?
        .ok_or_else(|| anyhow!("signed-in user has no profile"))?;
    if !profile.role.can_manage_team() {
        bail!("only owners and managers can invite team members");
    }
    let company_id = profile
        .company_id
        .as_deref()
        .ok_or_else(|| anyhow!("signed-in user does not belong to an organization"))?;

    let invite = send_invite(&client, company_id, &args.email, role, &profile.id, Utc::now()).await?;
    render_mode(output, &invite, write_invite_text, write_invite_pretty)
}

fn write_invite_text(invite: &Invitation, w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "id={}", invite.id)?;
    writeln!(w, "email={}", invite.email)?;
    writeln!(w, "role={}", invite.role)?;
    writeln!(w, "expires_at={}", invite.expires_at)
}

fn write_invite_pretty(invite: &Invitation, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Invited {}", invite.email))?;
    pretty_kv(w, "Role", invite.role.as_str())?;
    pretty_kv(w, "Expires", &invite.expires_at)?;
    pretty_kv(w, "Invited by", &invite.invited_by)?;
    writeln!(w, "A sign-in link is on its way.")
}

fn write_pending_text(lookup: &PendingLookup, w: &mut dyn Write) -> io::Result<()> {
    match &lookup.invitation {
        Some(invite) => write_invite_text(invite, w),
        None => writeln!(w, "none"),
    }
}

fn write_pending_pretty(lookup: &PendingLookup, w: &mut dyn Write) -> io::Result<()> {
    match &lookup.invitation {
        Some(invite) => {
            pretty_section(w, &format!("Pending invitation for {}", invite.email))?;
            pretty_kv(w, "Organization", &invite.company_id)?;
            pretty_kv(w, "Role", invite.role.as_str())?;
            pretty_kv(w, "Expires", &invite.expires_at)
        }
        None => writeln!(w, "No pending invitation for {}.", lookup.email),
    }
}
