//! Long-polling change notification for versioned collections.
//!
//! Clients send the last version they saw in `If-None-Match` and, optionally,
//! how long they are willing to wait in `Prefer: wait=N`. A stale client gets
//! the current snapshot at once; an up-to-date client either gets
//! `304 Not Modified` at once or is parked until the next mutation or until
//! its wait runs out, whichever happens first.
//!
//! Only the latest version is ever delivered. A client that misses several
//! mutations sees one snapshot reflecting all of them.

mod notifier;
mod version;

#[cfg(test)]
mod version_test;

pub use notifier::*;
pub use version::*;
