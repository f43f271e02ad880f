//! sexc Core
//!
//! Shared types used across every compiler stage: source positions and the
//! nominal type system. Nothing in this crate knows about tokens, trees,
//! or assembly — it only carries the small amount of vocabulary every other
//! crate in the workspace needs to agree on.

pub mod span;
pub mod types;

pub use span::Span;
pub use types::Type;
