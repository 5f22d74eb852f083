//! Typed entities for the seven store tables.
//!
//! Field names match the column names of the rows held by
//! [`RecordStore`](crate::store::RecordStore), so a row converts to its
//! entity through plain serde.

pub mod entity;
pub mod enums;

pub use entity::{
    Assignment, INVITE_TTL_DAYS, Invitation, Organization, Person, Procedure, ProcedureStep,
    Record, StepCompletion, format_timestamp, parse_timestamp,
};
pub use enums::{InviteRole, ParseEnumError, Role, SubscriptionStatus};
