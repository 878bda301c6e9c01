//! Extender edit permissions.
//!
//! # Responsibility
//! - Define the lookup and delegation collaborators permission checks need.
//! - Chain ownership, delegated entity edit and policy handlers into one
//!   allow/deny decision.
//!
//! # Invariants
//! - The acting identity and session are always passed explicitly.
//! - Deny is the default for every unresolved input.

pub mod evaluator;
pub mod identity;
pub mod policy;

use crate::model::extender::Extender;

/// Kind-specific extender lookup.
pub trait ExtenderLookup {
    fn get_annotation(&self, id: i64) -> Option<Extender>;
    fn get_metadata(&self, id: i64) -> Option<Extender>;
}

/// Delegated "may this identity edit that entity" check.
pub trait EntityPermissions {
    fn can_edit_entity(&self, entity_guid: i64, identity_guid: i64) -> bool;
}
