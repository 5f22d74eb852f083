use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::StoreError;

/// The fixed set of tables held by the record store.
///
/// The serialized form is the hosted backend's table name, so a `Table`
/// round-trips through configuration and CLI input unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Table {
    #[serde(rename = "companies")]
    Organizations,
    #[serde(rename = "profiles")]
    People,
    #[serde(rename = "sops")]
    Procedures,
    #[serde(rename = "sop_steps")]
    ProcedureSteps,
    #[serde(rename = "assignments")]
    Assignments,
    #[serde(rename = "step_completions")]
    StepCompletions,
    #[serde(rename = "invites")]
    Invitations,
}

impl Table {
    /// Every table, in dependency order (leaves last).
    pub const ALL: [Self; 7] = [
        Self::Organizations,
        Self::People,
        Self::Procedures,
        Self::ProcedureSteps,
        Self::Assignments,
        Self::StepCompletions,
        Self::Invitations,
    ];

    /// Hosted backend table name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizations => "companies",
            Self::People => "profiles",
            Self::Procedures => "sops",
            Self::ProcedureSteps => "sop_steps",
            Self::Assignments => "assignments",
            Self::StepCompletions => "step_completions",
            Self::Invitations => "invites",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "companies" | "organizations" => Ok(Self::Organizations),
            "profiles" | "people" => Ok(Self::People),
            "sops" | "procedures" => Ok(Self::Procedures),
            "sop_steps" | "procedure_steps" => Ok(Self::ProcedureSteps),
            "assignments" => Ok(Self::Assignments),
            "step_completions" => Ok(Self::StepCompletions),
            "invites" | "invitations" => Ok(Self::Invitations),
            _ => Err(StoreError::UnknownTable(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Table;
    use crate::error::StoreError;
    use std::str::FromStr;

    #[test]
    fn wire_names_parse_back() {
        for table in Table::ALL {
            assert_eq!(Table::from_str(table.as_str()).unwrap(), table);
            assert_eq!(
                serde_json::to_string(&table).unwrap(),
                format!("\"{}\"", table.as_str())
            );
        }
    }

    #[test]
    fn descriptive_aliases_are_accepted() {
        assert_eq!(Table::from_str("organizations").unwrap(), Table::Organizations);
        assert_eq!(Table::from_str("People").unwrap(), Table::People);
        assert_eq!(Table::from_str("procedure-steps").unwrap(), Table::ProcedureSteps);
        assert_eq!(Table::from_str("step-completions").unwrap(), Table::StepCompletions);
        assert_eq!(Table::from_str("invitations").unwrap(), Table::Invitations);
    }

    #[test]
    fn unknown_table_is_an_error() {
        assert_eq!(
            Table::from_str("widgets"),
            Err(StoreError::UnknownTable("widgets".to_string()))
        );
    }
}
