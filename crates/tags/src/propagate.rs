//! Carry a tag context across thread and task boundaries.
//!
//! The value is captured when the work is handed off and installed for the
//! whole execution of that work, whatever the spawning strand does afterwards.

use crate::context::TagContext;
use crate::scope::{ParkedScopes, current, resume, scoped};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Capture the current tag context and return a closure that runs `f` with it.
///
/// ```
/// use openconsensus_tags::{TagContextBuilder, TagKey, TagValue, current, scoped, wrap};
///
/// # fn main() -> Result<(), openconsensus_tags::TagError> {
/// let tags = TagContextBuilder::new()
///     .put(TagKey::new("job")?, TagValue::new("reindex")?)
///     .build();
/// let handle = scoped(tags.clone(), || std::thread::spawn(wrap(current)));
/// assert!(matches!(handle.join(), Ok(seen) if seen == tags));
/// # Ok(())
/// # }
/// ```
pub fn wrap<F, R>(f: F) -> impl FnOnce() -> R + Send
where
    F: FnOnce() -> R + Send,
{
    wrap_with(current(), f)
}

/// Return a closure that runs `f` with `context` current.
pub fn wrap_with<F, R>(context: TagContext, f: F) -> impl FnOnce() -> R + Send
where
    F: FnOnce() -> R + Send,
{
    move || scoped(context, f)
}

/// Future that installs a tag context around every poll of the inner future.
///
/// Scopes the inner future opens and holds across an `.await` are parked
/// when a poll returns and reinstalled, above the installed context, on the
/// next poll and while the inner future is dropped.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct WithTagContext<F> {
    inner: Option<Pin<Box<F>>>,
    context: TagContext,
    parked: ParkedScopes,
}

impl<F> WithTagContext<F> {
    /// The context installed while the inner future runs.
    pub const fn context(&self) -> &TagContext {
        &self.context
    }
}

impl<F: Future> Future for WithTagContext<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        // Only `Drop` takes the inner future.
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Pending;
        };
        let _resumed = resume(&this.context, &mut this.parked);
        inner.as_mut().poll(cx)
    }
}

impl<F> Drop for WithTagContext<F> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            let _resumed = resume(&self.context, &mut self.parked);
            drop(inner);
        }
    }
}

/// Attach a tag context to a future before handing it to an executor.
pub trait WithTagContextExt: Future + Sized {
    /// Run this future with `context` as its ambient tag context.
    fn with_tag_context(self, context: TagContext) -> WithTagContext<Self> {
        WithTagContext {
            inner: Some(Box::pin(self)),
            context,
            parked: ParkedScopes::default(),
        }
    }

    /// Run this future with the tag context current at the time of this call.
    fn with_current_tag_context(self) -> WithTagContext<Self> {
        self.with_tag_context(current())
    }
}

impl<F: Future> WithTagContextExt for F {}
