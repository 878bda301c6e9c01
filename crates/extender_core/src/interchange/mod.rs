//! External record boundary.
//!
//! # Responsibility
//! - Define the record shape extenders are exported to and imported from.
//! - Mint and parse site-qualified external identifiers.
//! - Serialize extenders into records.
//!
//! # See also
//! - `crate::import` for the inbound direction.

pub mod export;
pub mod external_id;
pub mod published;
pub mod record;
