//! Talks, their comments, and the service that mutates them.

mod model;
mod service;
mod talk_store;

#[cfg(test)]
mod model_test;
#[cfg(test)]
mod service_test;

pub use model::*;
pub use service::*;
pub use talk_store::*;
