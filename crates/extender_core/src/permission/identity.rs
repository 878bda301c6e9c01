//! Acting identities and request session context.

/// One resolved acting identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub guid: i64,
    pub username: String,
}

impl Identity {
    pub fn new(guid: i64, username: impl Into<String>) -> Self {
        Self {
            guid,
            username: username.into(),
        }
    }
}

/// Identity lookup collaborator.
pub trait IdentityStore {
    fn resolve_identity(&self, guid: i64) -> Option<Identity>;
}

/// Request-scoped session, passed explicitly to permission checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Option<Identity>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}
