pub mod diff;
pub mod encoding;
pub mod tracing;
