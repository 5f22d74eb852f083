use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{InviteRole, Role, SubscriptionStatus};
use crate::store::Table;

/// How long an invitation stays redeemable after it is created.
pub const INVITE_TTL_DAYS: i64 = 7;

/// A typed row of one of the store tables.
pub trait Record: Serialize + for<'de> Deserialize<'de> {
    /// Table the record lives in.
    const TABLE: Table;
}

/// A tenant company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub subscription_plan: Option<String>,
    pub created_at: String,
}

/// A member of an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub company_id: Option<String>,
    pub role: Role,
    pub invited_by: Option<String>,
    pub created_at: String,
}

impl Person {
    /// Up to two uppercase initials, from the full name when present,
    /// otherwise from the first two characters of the email.
    #[must_use]
    pub fn initials(&self) -> String {
        match self.full_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name
                .split_whitespace()
                .filter_map(|part| part.chars().next())
                .take(2)
                .collect::<String>()
                .to_uppercase(),
            _ => self.email.chars().take(2).collect::<String>().to_uppercase(),
        }
    }

    /// Name for display, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// A standard operating procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: String,
    pub company_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub created_by: String,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// One ordered step of a procedure. `position` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureStep {
    pub id: String,
    pub sop_id: String,
    pub position: u32,
    pub title: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: String,
}

/// A procedure assigned to one person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub sop_id: String,
    pub employee_id: String,
    pub assigned_by: String,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

/// One person finishing one step within one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCompletion {
    pub id: String,
    pub assignment_id: String,
    pub step_id: String,
    pub employee_id: String,
    pub completed_at: String,
}

/// A pending membership grant for an email address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub role: InviteRole,
    pub invited_by: String,
    pub accepted_at: Option<String>,
    pub expires_at: String,
    pub created_at: String,
}

impl Invitation {
    /// Build an unaccepted invitation expiring [`INVITE_TTL_DAYS`] after `now`.
    ///
    /// The email is trimmed and lowercased so (organization, email)
    /// uniqueness is case-insensitive.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        company_id: impl Into<String>,
        email: &str,
        role: InviteRole,
        invited_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            company_id: company_id.into(),
            email: email.trim().to_ascii_lowercase(),
            role,
            invited_by: invited_by.into(),
            accepted_at: None,
            expires_at: format_timestamp(now + Duration::days(INVITE_TTL_DAYS)),
            created_at: format_timestamp(now),
        }
    }

    /// Not yet accepted and not yet expired at `now`.
    ///
    /// An unparseable expiry counts as expired.
    #[must_use]
    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.accepted_at.is_none() && parse_timestamp(&self.expires_at).is_some_and(|exp| exp > now)
    }
}

/// Parse an RFC 3339 timestamp column.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// Render a timestamp the way the store columns hold them.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

macro_rules! impl_record {
    ($($ty:ty => $table:expr),+ $(,)?) => {
        $(
            impl Record for $ty {
                const TABLE: Table = $table;
            }
        )+
    };
}

impl_record! {
    Organization => Table::Organizations,
    Person => Table::People,
    Procedure => Table::Procedures,
    ProcedureStep => Table::ProcedureSteps,
    Assignment => Table::Assignments,
    StepCompletion => Table::StepCompletions,
    Invitation => Table::Invitations,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn person(full_name: Option<&str>, email: &str) -> Person {
        Person {
            id: "p1".to_string(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
            company_id: None,
            role: Role::Employee,
            invited_by: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn initials_prefer_full_name() {
        assert_eq!(person(Some("Priya Patel"), "priya@demo.com").initials(), "PP");
        assert_eq!(person(Some("ann marie lee"), "a@demo.com").initials(), "AM");
        assert_eq!(person(None, "tom@demo.com").initials(), "TO");
        assert_eq!(person(Some("  "), "zed@demo.com").initials(), "ZE");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        assert_eq!(person(Some("Tom Wu"), "tom@demo.com").display_name(), "Tom Wu");
        assert_eq!(person(None, "tom@demo.com").display_name(), "tom@demo.com");
    }

    #[test]
    fn invitation_expires_after_a_week() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let invite = Invitation::new("i1", "c1", " New@Demo.com ", InviteRole::Employee, "u1", now);

        assert_eq!(invite.email, "new@demo.com");
        assert_eq!(invite.created_at, "2024-03-01T12:00:00Z");
        assert_eq!(invite.expires_at, "2024-03-08T12:00:00Z");
        assert!(invite.is_pending(now));
        assert!(invite.is_pending(now + Duration::days(6)));
        assert!(!invite.is_pending(now + Duration::days(7)));
    }

    #[test]
    fn accepted_invitation_is_not_pending() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut invite = Invitation::new("i1", "c1", "a@b.c", InviteRole::Manager, "u1", now);
        invite.accepted_at = Some(format_timestamp(now));
        assert!(!invite.is_pending(now));
    }

    #[test]
    fn record_tables_match_entities() {
        assert_eq!(Procedure::TABLE, Table::Procedures);
        assert_eq!(StepCompletion::TABLE, Table::StepCompletions);
        assert_eq!(Invitation::TABLE, Table::Invitations);
    }
}
