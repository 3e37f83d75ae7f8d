//! # openconsensus-tags
//!
//! Correlation tags carried alongside the current execution strand.
//!
//! - **Tags** - `TagKey`, `TagValue`, `Tag`
//! - **Context** - `TagContext`, an immutable set of tags, and `TagContextBuilder`
//! - **Ambient scope** - `current()`, `with_tag_context()`, `scoped()`
//! - **Propagation** - `wrap()` for closures handed to other threads and
//!   `WithTagContextExt` for futures handed to an executor
//!
//! ```
//! use openconsensus_tags::{TagContextBuilder, TagKey, TagValue, current, scoped};
//!
//! # fn main() -> Result<(), openconsensus_tags::TagError> {
//! let tags = TagContextBuilder::new()
//!     .put(TagKey::new("method")?, TagValue::new("GET")?)
//!     .build();
//!
//! scoped(tags.clone(), || assert_eq!(current(), tags));
//! assert!(current().is_empty());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod context;
pub mod propagate;
pub mod scope;
pub mod tag;

pub use context::{TagContext, TagContextBuilder};
pub use propagate::{WithTagContext, WithTagContextExt, wrap, wrap_with};
pub use scope::{ScopeError, TagContextScope, current, scoped, with_tag_context};
pub use tag::{MAX_TAG_LENGTH, Tag, TagError, TagKey, TagValue};

/// Returns the tags crate version.
#[must_use]
pub const fn tags_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
