//! Ordered policy handler chain.
//!
//! # Responsibility
//! - Register deployment-specific permission handlers by event and kind.
//! - Fold handler votes over a seeded default.
//!
//! # Invariants
//! - Dispatch order is ascending priority, then registration order.
//! - An abstaining handler never changes the running result.
//! - Kind `all` matches every kind.

use crate::import::entity::HostEntity;
use crate::model::extender::Extender;
use crate::permission::identity::Identity;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Event consulted by the permission evaluator.
pub const EVENT_PERMISSIONS_CHECK: &str = "permissions_check";
/// Kind wildcard for handler registration.
pub const KIND_ALL: &str = "all";
/// Priority used when callers do not care about ordering.
pub const DEFAULT_PRIORITY: u32 = 500;

/// Input handed to every policy handler.
///
/// `entity` is `None` when the host entity no longer resolves.
#[derive(Clone, Copy)]
pub struct PolicyContext<'a> {
    pub extender: &'a Extender,
    pub entity: Option<&'a dyn HostEntity>,
    pub identity: &'a Identity,
}

impl PolicyContext<'_> {
    /// Guid of the host entity, taken from the extender.
    pub fn entity_guid(&self) -> i64 {
        self.extender.entity_guid()
    }
}

/// One handler's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyVote {
    Allow,
    Deny,
    Abstain,
}

/// Policy handler contract.
pub trait PolicyHandler {
    fn vote(&self, context: &PolicyContext<'_>) -> PolicyVote;
}

struct FnPolicy<F>(F);

impl<F> PolicyHandler for FnPolicy<F>
where
    F: Fn(&PolicyContext<'_>) -> PolicyVote,
{
    fn vote(&self, context: &PolicyContext<'_>) -> PolicyVote {
        (self.0)(context)
    }
}

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyRegistryError {
    InvalidEventName(String),
    InvalidKind(String),
}

impl Display for PolicyRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEventName(value) => write!(f, "policy event name is invalid: {value}"),
            Self::InvalidKind(value) => write!(f, "policy kind is invalid: {value}"),
        }
    }
}

impl Error for PolicyRegistryError {}

struct RegisteredPolicy {
    kind: String,
    priority: u32,
    sequence: u64,
    handler: Arc<dyn PolicyHandler>,
}

/// In-process policy chain keyed by event name.
#[derive(Default)]
pub struct PolicyChain {
    handlers: BTreeMap<String, Vec<RegisteredPolicy>>,
    next_sequence: u64,
}

impl PolicyChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a closure handler for `event` and `kind` at `priority`.
    pub fn register<F>(
        &mut self,
        event: &str,
        kind: &str,
        priority: u32,
        handler: F,
    ) -> Result<(), PolicyRegistryError>
    where
        F: Fn(&PolicyContext<'_>) -> PolicyVote + 'static,
    {
        self.register_handler(event, kind, priority, Arc::new(FnPolicy(handler)))
    }

    /// Registers one handler for `event` and `kind` at `priority`.
    pub fn register_handler(
        &mut self,
        event: &str,
        kind: &str,
        priority: u32,
        handler: Arc<dyn PolicyHandler>,
    ) -> Result<(), PolicyRegistryError> {
        let event = event.trim();
        if !is_valid_key(event) {
            return Err(PolicyRegistryError::InvalidEventName(event.to_string()));
        }
        let kind = kind.trim();
        if !is_valid_key(kind) {
            return Err(PolicyRegistryError::InvalidKind(kind.to_string()));
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entries = self.handlers.entry(event.to_string()).or_default();
        entries.push(RegisteredPolicy {
            kind: kind.to_string(),
            priority,
            sequence,
            handler,
        });
        entries.sort_by_key(|entry| (entry.priority, entry.sequence));
        Ok(())
    }

    /// Number of handlers registered for `event`.
    pub fn len_for(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }

    /// Runs matching handlers over `default`; each non-abstain vote replaces
    /// the running result.
    pub fn dispatch(
        &self,
        event: &str,
        kind: &str,
        context: &PolicyContext<'_>,
        default: bool,
    ) -> bool {
        let Some(entries) = self.handlers.get(event) else {
            return default;
        };
        entries
            .iter()
            .filter(|entry| entry.kind == kind || entry.kind == KIND_ALL)
            .fold(default, |current, entry| match entry.handler.vote(context) {
                PolicyVote::Allow => true,
                PolicyVote::Deny => false,
                PolicyVote::Abstain => current,
            })
    }
}

fn is_valid_key(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == ':')
}
