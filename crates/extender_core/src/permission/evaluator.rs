//! Extender edit-permission evaluator.
//!
//! # Responsibility
//! - Decide whether an acting identity may modify one extender.
//!
//! # Invariants
//! - Checks short-circuit in order: session, identity, extender, owner,
//!   delegated entity edit, policy chain.
//! - The host entity is resolved only when the policy chain runs.
//! - Evaluation never fails; anything unresolvable denies.

use crate::import::entity::{EntityStore, HostEntity};
use crate::model::extender::ExtenderKind;
use crate::permission::identity::{Identity, IdentityStore, Session};
use crate::permission::policy::{PolicyChain, PolicyContext, EVENT_PERMISSIONS_CHECK};
use crate::permission::{EntityPermissions, ExtenderLookup};
use log::debug;

/// Layered edit-permission check over borrowed collaborators.
pub struct PermissionEvaluator<'a, L, I, D, S> {
    lookup: &'a L,
    identities: &'a I,
    delegation: &'a D,
    entities: &'a S,
    policies: &'a PolicyChain,
}

impl<'a, L, I, D, S> PermissionEvaluator<'a, L, I, D, S>
where
    L: ExtenderLookup,
    I: IdentityStore,
    D: EntityPermissions,
    S: EntityStore,
{
    pub fn new(
        lookup: &'a L,
        identities: &'a I,
        delegation: &'a D,
        entities: &'a S,
        policies: &'a PolicyChain,
    ) -> Self {
        Self {
            lookup,
            identities,
            delegation,
            entities,
            policies,
        }
    }

    /// Returns whether `acting` may edit extender `extender_id` of `kind`.
    ///
    /// `acting = None` means "the session identity". `kind` must be
    /// `annotation` or `metadata`; anything else denies.
    pub fn can_edit(
        &self,
        extender_id: i64,
        kind: &str,
        acting: Option<i64>,
        session: &Session,
    ) -> bool {
        if !session.is_logged_in() {
            return self.deny(extender_id, kind, "not_logged_in");
        }

        let identity: Identity = match acting {
            Some(guid) => match self.identities.resolve_identity(guid) {
                Some(identity) => identity,
                None => return self.deny(extender_id, kind, "identity_not_found"),
            },
            None => match session.identity() {
                Some(identity) => identity.clone(),
                None => return self.deny(extender_id, kind, "no_session_identity"),
            },
        };

        let Some(extender_kind) = ExtenderKind::parse(kind) else {
            return self.deny(extender_id, kind, "unknown_kind");
        };
        let extender = match extender_kind {
            ExtenderKind::Annotation => self.lookup.get_annotation(extender_id),
            ExtenderKind::Metadata => self.lookup.get_metadata(extender_id),
        };
        let Some(extender) = extender.filter(|found| found.kind() == extender_kind) else {
            return self.deny(extender_id, kind, "extender_not_found");
        };

        if extender.owner_guid() == identity.guid {
            return self.allow(extender_id, kind, "owner");
        }

        let entity_guid = extender.entity_guid();
        if self.delegation.can_edit_entity(entity_guid, identity.guid) {
            return self.allow(extender_id, kind, "entity_delegation");
        }

        let entity = self.entities.resolve_entity(entity_guid);
        let context = PolicyContext {
            extender: &extender,
            entity: entity.as_ref().map(|found| found as &dyn HostEntity),
            identity: &identity,
        };
        if self
            .policies
            .dispatch(EVENT_PERMISSIONS_CHECK, kind, &context, false)
        {
            self.allow(extender_id, kind, "policy")
        } else {
            self.deny(extender_id, kind, "policy")
        }
    }

    fn allow(&self, extender_id: i64, kind: &str, reason: &str) -> bool {
        debug!(
            "event=permission_check module=permission status=ok decision=allow reason={reason} kind={kind} extender_id={extender_id}"
        );
        true
    }

    fn deny(&self, extender_id: i64, kind: &str, reason: &str) -> bool {
        debug!(
            "event=permission_check module=permission status=ok decision=deny reason={reason} kind={kind} extender_id={extender_id}"
        );
        false
    }
}
