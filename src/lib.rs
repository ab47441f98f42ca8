//! A skill-sharing talk board.
//!
//! Users submit talks, comment on them and delete them; browsers stay in sync
//! by long polling `GET /api/talks` with `If-None-Match` and `Prefer: wait=N`.
//! The [`ChangeNotifier`] owns the collection version and the set of parked
//! requests, the [`TalkService`] applies mutations to a single JSON file, and
//! the [`http`] module maps both onto warp routes.

mod config;
mod errors;
pub mod http;
pub mod metrics;
mod poll;
mod store;
mod talks;
pub mod utils;

pub use config::*;
pub use errors::*;
pub use poll::*;
pub use store::*;
pub use talks::*;
