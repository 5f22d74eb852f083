//! Subscription plans and the limits they put on an organization.
//!
//! Only the catalogue and gating live here. Price identifiers are read from
//! configuration; no payment provider is contacted.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::BillingConfig;
use crate::error::ErrorCode;
use crate::model::{Organization, SubscriptionStatus};

/// Upper bound on a countable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    AtMost(usize),
    Unlimited,
}

impl Limit {
    /// Whether one more item fits when `current` are already in use.
    #[must_use]
    pub const fn admits_one_more(self, current: usize) -> bool {
        match self {
            Self::AtMost(max) => current < max,
            Self::Unlimited => true,
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtMost(max) => write!(f, "up to {max}"),
            Self::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// What a limit counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Employees,
    Procedures,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Employees => "employees",
            Self::Procedures => "SOPs",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Starter,
    Pro,
}

impl Plan {
    pub const ALL: [Self; 2] = [Self::Starter, Self::Pro];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Pro => "pro",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Starter => "Starter",
            Self::Pro => "Pro",
        }
    }

    /// Monthly price in whole US dollars.
    #[must_use]
    pub const fn monthly_price(self) -> u32 {
        match self {
            Self::Starter => 29,
            Self::Pro => 79,
        }
    }

    #[must_use]
    pub const fn employee_limit(self) -> Limit {
        match self {
            Self::Starter => Limit::AtMost(10),
            Self::Pro => Limit::AtMost(50),
        }
    }

    #[must_use]
    pub const fn sop_limit(self) -> Limit {
        match self {
            Self::Starter => Limit::AtMost(25),
            Self::Pro => Limit::Unlimited,
        }
    }

    /// Payment-provider price id for this plan, if configured.
    #[must_use]
    pub fn price_id(self, billing: &BillingConfig) -> Option<&str> {
        match self {
            Self::Starter => billing.starter_price_id.as_deref(),
            Self::Pro => billing.pro_price_id.as_deref(),
        }
        .filter(|id| !id.is_empty())
    }

    /// Plan the organization is currently entitled to. `None` without an
    /// active or trialing subscription, or when the stored plan is unknown.
    #[must_use]
    pub fn for_organization(org: &Organization) -> Option<Self> {
        if !org.subscription_status.is_some_and(SubscriptionStatus::is_entitled) {
            return None;
        }
        org.subscription_plan.as_deref()?.parse().ok()
    }

    /// Admit one more team member when `current` are already on the team.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] when the plan's employee limit is reached.
    pub fn check_employee_seat(self, current: usize) -> Result<(), LimitError> {
        self.check(Resource::Employees, self.employee_limit(), current)
    }

    /// Admit one more procedure when `current` already exist.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] when the plan's SOP limit is reached.
    pub fn check_sop_slot(self, current: usize) -> Result<(), LimitError> {
        self.check(Resource::Procedures, self.sop_limit(), current)
    }

    fn check(self, resource: Resource, limit: Limit, current: usize) -> Result<(), LimitError> {
        if limit.admits_one_more(current) {
            Ok(())
        } else {
            Err(LimitError {
                plan: self,
                resource,
                limit,
                current,
            })
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = UnknownPlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starter" => Ok(Self::Starter),
            "pro" => Ok(Self::Pro),
            _ => Err(UnknownPlanError(s.to_string())),
        }
    }
}

/// Adding one more item would exceed the plan.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} plan allows {limit} {resource}; {current} already in use", .plan.display_name())]
pub struct LimitError {
    pub plan: Plan,
    pub resource: Resource,
    pub limit: Limit,
    pub current: usize,
}

impl LimitError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::PlanLimitExceeded
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan '{0}'")]
pub struct UnknownPlanError(pub String);

impl UnknownPlanError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        ErrorCode::UnknownPlan
    }
}
