//! CLI command implementations.

pub mod inspect;
pub mod plan;
pub mod sync;
pub mod watch;
