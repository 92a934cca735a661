//! Skyward Audit
//!
//! Security audit events and the append-only log they are written to.

pub mod error;
pub mod events;
pub mod logger;

pub use error::*;
pub use events::*;
pub use logger::AuditLogger;
