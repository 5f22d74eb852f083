use std::fmt;

use crate::store::Table;

/// Machine-readable error codes for scripting against the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    RemoteBackendUnavailable,
    ConfigParseError,
    BackendRejected,
    UnknownTable,
    RowDecodeFailed,
    FixtureInvariantViolated,
    PlanLimitExceeded,
    UnknownPlan,
    InvalidInvite,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RemoteBackendUnavailable => "E1001",
            Self::ConfigParseError => "E1002",
            Self::BackendRejected => "E1003",
            Self::UnknownTable => "E2001",
            Self::RowDecodeFailed => "E2002",
            Self::FixtureInvariantViolated => "E3001",
            Self::PlanLimitExceeded => "E4001",
            Self::UnknownPlan => "E4002",
            Self::InvalidInvite => "E5001",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::RemoteBackendUnavailable => Some(
                "Set SOPLINE_DEV_MOCK=true or `dev_mock = true` under [backend] in .sopline/config.toml.",
            ),
            Self::ConfigParseError => Some("Fix syntax in .sopline/config.toml and retry."),
            Self::BackendRejected => None,
            Self::UnknownTable => Some(
                "Use one of: companies, profiles, sops, sop_steps, assignments, step_completions, invites.",
            ),
            Self::RowDecodeFailed => None,
            Self::FixtureInvariantViolated => {
                Some("Keep step positions dense from 1 and completions within the assigned procedure.")
            }
            Self::PlanLimitExceeded => Some("Upgrade the plan or remove existing records first."),
            Self::UnknownPlan => Some("Use one of the documented plans: starter, pro."),
            Self::InvalidInvite => Some("Pass a full email address, e.g. new.hire@example.com."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors raised while building or reading the record store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A table name did not match any known table.
    #[error("unknown table '{0}'")]
    UnknownTable(String),

    /// Fixture rows break one or more model invariants.
    #[error("fixture data violates {} invariant(s): {}", .0.len(), .0.join("; "))]
    InvalidFixtures(Vec<String>),
}

impl StoreError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnknownTable(_) => ErrorCode::UnknownTable,
            Self::InvalidFixtures(_) => ErrorCode::FixtureInvariantViolated,
        }
    }
}

/// Errors raised by the client factory.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The hosted backend was selected but is not part of this build.
    #[error("hosted backend at {} is not available; enable the development mock", .url.as_deref().unwrap_or("<unset>"))]
    RemoteBackendUnavailable { url: Option<String> },
}

impl ClientError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::RemoteBackendUnavailable { .. } => ErrorCode::RemoteBackendUnavailable,
        }
    }
}

/// A resolved row could not be converted into its typed record.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode {table} row: {source}")]
pub struct DecodeError {
    pub table: Table,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::RowDecodeFailed
    }
}
