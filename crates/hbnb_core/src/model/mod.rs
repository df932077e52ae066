//! Record domain model.
//!
//! # Responsibility
//! - Define the closed set of record kinds and their field sets.
//! - Define the identity/lifecycle header shared by every record.
//!
//! # Invariants
//! - Every record is identified by a `RecordId` unique across kinds.
//! - A record's store key prefix always equals its kind's class name.

pub mod kind;
pub mod record;
