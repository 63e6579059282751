//! Session directory
//!
//! Sessions live in the shared store under `<prefix><id>` as JSON. Every
//! successful read slides the expiry forward to the full default window.
//!
//! Per-user listing and revocation walk the whole session keyspace; there is
//! no secondary index, so their cost grows with the total number of sessions.

mod directory;
mod types;

pub use directory::SessionDirectory;
pub use types::{NewSession, Session, SessionUpdate};
