//! Ambient tag context for the current thread.
//!
//! Each thread keeps a stack of contexts. [`with_tag_context`] pushes one and
//! returns a guard; dropping or closing the guard pops it again. The value on
//! top of the stack is what [`current`] returns. Work handed to another thread
//! or executor does not see this stack: capture the value with
//! [`crate::propagate`] instead.

use crate::context::TagContext;
use openconsensus_shared::{ErrorCode, ErrorEnvelope};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

#[derive(Debug)]
struct Entry {
    id: u64,
    context: TagContext,
}

thread_local! {
    static STACK: RefCell<Vec<Entry>> = const { RefCell::new(Vec::new()) };
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Misuse of scope nesting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// A scope was closed while scopes opened after it were still active.
    #[error("tag context scope closed while {abandoned} inner scope(s) were still open")]
    ClosedOutOfOrder {
        /// Number of inner scopes discarded to restore the previous context.
        abandoned: usize,
    },
    /// The scope's entry was already discarded by an out-of-order close of an outer scope.
    #[error("tag context scope was already discarded by an out-of-order close")]
    AlreadyDiscarded,
}

impl From<ScopeError> for ErrorEnvelope {
    fn from(error: ScopeError) -> Self {
        let envelope = Self::invariant(ErrorCode::scope_order(), error.to_string());
        match error {
            ScopeError::ClosedOutOfOrder { abandoned } => {
                envelope.with_metadata("abandoned", abandoned.to_string())
            },
            ScopeError::AlreadyDiscarded => envelope,
        }
    }
}

/// Returns the tag context of the innermost active scope on this thread, or
/// the empty context when no scope is active.
#[must_use]
pub fn current() -> TagContext {
    STACK
        .try_with(|stack| stack.borrow().last().map(|entry| entry.context.clone()))
        .ok()
        .flatten()
        .unwrap_or_else(TagContext::empty)
}

/// Make `context` current on this thread until the returned scope ends.
#[must_use = "the context is only current while the scope is alive"]
pub fn with_tag_context(context: TagContext) -> TagContextScope {
    let id = next_scope_id();
    let depth = STACK
        .try_with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(Entry { id, context });
            stack.len()
        })
        .unwrap_or(0);
    tracing::trace!(scope_id = id, depth, "tag context scope entered");
    TagContextScope {
        id,
        released: false,
        _not_send: PhantomData,
    }
}

fn next_scope_id() -> u64 {
    NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Scopes a suspended future opened above its own context, kept off the
/// thread stack between polls.
#[derive(Debug, Default)]
pub(crate) struct ParkedScopes(Vec<Entry>);

/// Install `context` and the scopes parked by the previous poll on top of
/// this thread's stack. Dropping the returned guard parks them again.
pub(crate) fn resume<'a>(context: &TagContext, parked: &'a mut ParkedScopes) -> Resumed<'a> {
    let id = next_scope_id();
    // A missing stack means the thread is shutting down; the entries stay parked.
    let _ = STACK.try_with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(Entry {
            id,
            context: context.clone(),
        });
        stack.append(&mut parked.0);
    });
    Resumed { id, parked }
}

/// Guard returned by [`resume`].
pub(crate) struct Resumed<'a> {
    id: u64,
    parked: &'a mut ParkedScopes,
}

impl Drop for Resumed<'_> {
    fn drop(&mut self) {
        let id = self.id;
        let parked = &mut self.parked.0;
        let _ = STACK.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(position) = stack.iter().rposition(|entry| entry.id == id) {
                *parked = stack.split_off(position + 1);
                stack.truncate(position);
            }
        });
        tracing::trace!(scope_id = id, parked = parked.len(), "tag context suspended");
    }
}

/// Run `f` with `context` current, restoring the previous context on every
/// exit path, including unwinding.
pub fn scoped<R>(context: TagContext, f: impl FnOnce() -> R) -> R {
    let _scope = with_tag_context(context);
    f()
}

/// Guard for an active ambient tag context.
///
/// Not `Send`: a scope belongs to the thread that opened it.
#[derive(Debug)]
pub struct TagContextScope {
    id: u64,
    released: bool,
    _not_send: PhantomData<*const ()>,
}

impl TagContextScope {
    /// End the scope, restoring the context that was current when it was opened.
    ///
    /// Closing a scope while inner scopes are still open discards those inner
    /// scopes as well and reports [`ScopeError::ClosedOutOfOrder`].
    pub fn close(mut self) -> Result<(), ScopeError> {
        self.released = true;
        release(self.id)
    }
}

impl Drop for TagContextScope {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(error) = release(self.id) {
            tracing::error!(scope_id = self.id, %error, "tag context scope misuse");
        }
    }
}

fn release(id: u64) -> Result<(), ScopeError> {
    let outcome = STACK.try_with(|stack| {
        let mut stack = stack.borrow_mut();
        let depth = stack.len();
        match stack.iter().rposition(|entry| entry.id == id) {
            Some(position) if position + 1 == depth => {
                stack.pop();
                Ok(())
            },
            Some(position) => {
                stack.truncate(position);
                Err(ScopeError::ClosedOutOfOrder {
                    abandoned: depth - position - 1,
                })
            },
            None => Err(ScopeError::AlreadyDiscarded),
        }
    });
    tracing::trace!(scope_id = id, "tag context scope exited");
    // The thread is shutting down and its stack is gone: nothing left to restore.
    outcome.unwrap_or(Ok(()))
}
