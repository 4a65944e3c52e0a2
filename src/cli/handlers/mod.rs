//! Shared command flows

pub mod watch;

pub use watch::follow;
