//! Team invitations.
//!
//! Sending an invite upserts the `invites` row keyed by (organization,
//! email) and then issues a one-time sign-in link. When the invited person
//! signs in for the first time, [`pending_invite`] finds the invitation that
//! still applies to them.

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;

use crate::auth::OtpOptions;
use crate::client::Client;
use crate::error::{DecodeError, ErrorCode};
use crate::model::{InviteRole, Invitation};
use crate::store::Table;

/// Where the sign-in link sends a newly invited person.
pub const INVITE_REDIRECT: &str = "/auth/callback?next=/onboarding";

/// Errors raised while sending or looking up an invitation.
#[derive(Debug, thiserror::Error)]
pub enum InviteError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("backend rejected the invitation: {0}")]
    Rejected(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl InviteError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidEmail(_) => ErrorCode::InvalidInvite,
            Self::Rejected(_) => ErrorCode::BackendRejected,
            Self::Decode(inner) => inner.error_code(),
        }
    }
}

fn normalize_email(raw: &str) -> Result<String, InviteError> {
    let email = raw.trim().to_ascii_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(InviteError::InvalidEmail(raw.to_string())),
    }
}

/// Invite `email` into `company_id` and send them a sign-in link.
///
/// Returns the invitation as echoed by the backend.
///
/// # Errors
///
/// [`InviteError::InvalidEmail`] for a malformed address,
/// [`InviteError::Rejected`] if the upsert or the link request fails, and
/// [`InviteError::Decode`] if the echoed row is not an invitation.
pub async fn send_invite(
    client: &Client,
    company_id: &str,
    email: &str,
    role: InviteRole,
    invited_by: &str,
    now: DateTime<Utc>,
) -> Result<Invitation, InviteError> {
    let email = normalize_email(email)?;
    let draft = Invitation::new("", company_id, &email, role, invited_by, now);

    let response = client
        .from(Table::Invitations)
        .upsert(json!({
            "company_id": draft.company_id,
            "email": draft.email,
            "role": draft.role.as_str(),
            "invited_by": draft.invited_by,
            "expires_at": draft.expires_at,
            "created_at": draft.created_at,
        }))
        .select("*")
        .single()
        .await;
    if let Some(err) = &response.error {
        return Err(InviteError::Rejected(err.message.clone()));
    }
    let invite = response
        .into_record::<Invitation>()?
        .ok_or_else(|| InviteError::Rejected("no invitation returned".to_string()))?;

    let link = client
        .auth
        .sign_in_with_otp(OtpOptions {
            email: invite.email.clone(),
            email_redirect_to: Some(INVITE_REDIRECT.to_string()),
            should_create_user: true,
        })
        .await;
    if let Some(err) = link.error {
        return Err(InviteError::Rejected(err.message));
    }

    info!(invite = %invite.id, company = %invite.company_id, role = %invite.role, "invitation sent");
    Ok(invite)
}

/// The first invitation for `email` that is still pending at `now`.
///
/// # Errors
///
/// [`InviteError::InvalidEmail`] for a malformed address and
/// [`InviteError::Decode`] if a stored row is not an invitation.
pub async fn pending_invite(
    client: &Client,
    email: &str,
    now: DateTime<Utc>,
) -> Result<Option<Invitation>, InviteError> {
    let email = normalize_email(email)?;
    let invites = client
        .from(Table::Invitations)
        .select("*")
        .eq("email", email)
        .await
        .into_records::<Invitation>()?;
    Ok(invites.into_iter().find(|invite| invite.is_pending(now)))
}
