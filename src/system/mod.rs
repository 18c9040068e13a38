pub mod bandwidth;
pub mod builder;
pub mod collector;
pub mod command;
pub mod latency;
pub mod platform;
pub mod snapshot;
pub mod updates;
