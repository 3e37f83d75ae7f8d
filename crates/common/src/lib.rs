//! # openconsensus-common
//!
//! Value objects shared by the tag and metric crates:
//!
//! - **Time** - `Timestamp`, the `Clock` capability, `SystemClock`, `ZeroTimeClock`
//! - **Resource** - `Resource`, the descriptor of the monitored entity
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared`
//! - No global state; the system clock is an ordinary value

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod clock;
pub mod resource;
pub mod timestamp;

pub use clock::{Clock, SystemClock, ZeroTimeClock};
pub use resource::{
    ENV_RESOURCE_LABELS, ENV_RESOURCE_SCHEMA_URL, ENV_RESOURCE_TYPE, MAX_RESOURCE_LENGTH, Resource,
    ResourceError,
};
pub use timestamp::{NANOS_PER_SECOND, Timestamp};

/// Returns the common crate version.
#[must_use]
pub const fn common_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
