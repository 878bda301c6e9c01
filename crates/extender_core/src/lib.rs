//! Core engine for entity extenders (annotations and metadata).
//! This crate is the single source of truth for value typing, import
//! reconciliation and edit-permission invariants.

pub mod config;
pub mod db;
pub mod import;
pub mod interchange;
pub mod logging;
pub mod model;
pub mod permission;
pub mod repo;

pub use config::{load_config, ConfigError, ExtenderConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use import::entity::{EntityStore, HostEntity};
pub use import::memory::{MemoryEntity, MemoryEntityStore};
pub use import::reconcile::{
    import_batch, import_record, reconcile, BatchImportError, ImportError, ReconcileAction,
};
pub use interchange::export::export_extender;
pub use interchange::external_id::ExternalIds;
pub use interchange::published::{format_published, parse_published};
pub use interchange::record::ExternalRecord;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::bag::AttributeBag;
pub use model::extender::{Extender, ExtenderKind};
pub use model::value::{detect_value_type, AttrValue, ValueError, ValueType};
pub use permission::evaluator::PermissionEvaluator;
pub use permission::identity::{Identity, IdentityStore, Session};
pub use permission::policy::{PolicyChain, PolicyContext, PolicyHandler, PolicyVote};
pub use permission::{EntityPermissions, ExtenderLookup};
pub use repo::extender_repo::{
    ExtenderRepository, RepoError, RepoResult, SqliteExtenderRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
