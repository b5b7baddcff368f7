// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Request-scoped flow control.
//!
//! A [`Context`] travels with every cache call and carries two pieces of
//! request state: the [`FlowMode`] that can suppress reads or writes for the
//! duration of the call, and an optional absolute deadline observed by
//! blocking paths such as the single-flight waiter.

use std::time::SystemTime;

/// Per-call flow mode.
///
/// The mode decides which cache operations actually reach the store:
///
/// | Operation | `Normal` | `BypassRead` | `BypassAll` |
/// |---|---|---|---|
/// | get / get_multi | real read | faked miss | faked miss |
/// | set / set_multi | real write | real write | skipped |
/// | delete / delete_multi | real delete | real delete | skipped |
///
/// `BypassRead` is the recompute mode: reads fake a miss so the caller
/// recomputes, while the subsequent write still lands in the cache.
/// `BypassAll` skips the cache layer entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowMode {
    /// Reads and writes both reach the store.
    #[default]
    Normal,
    /// Reads are suppressed (faked miss); writes still happen.
    BypassRead,
    /// Reads and writes are both suppressed.
    BypassAll,
}

/// Request-scoped state carried through every cache call.
///
/// Contexts are cheap to clone and are typically built per request:
///
/// ```
/// use cachebox_store::{Context, FlowMode};
///
/// let ctx = Context::new();
/// assert_eq!(ctx.flow(), FlowMode::Normal);
///
/// // Force recomputation: reads fake a miss, writes still land.
/// let ctx = Context::new().bypass_read();
/// assert_eq!(ctx.flow(), FlowMode::BypassRead);
///
/// // Skip the cache layer entirely.
/// let ctx = Context::new().bypass_all();
/// assert_eq!(ctx.flow(), FlowMode::BypassAll);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Context {
    flow: FlowMode,
    deadline: Option<SystemTime>,
}

impl Context {
    /// Creates a context with [`FlowMode::Normal`] and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the call to bypass cache reads, forcing a recompute.
    #[must_use]
    pub fn bypass_read(mut self) -> Self {
        self.flow = FlowMode::BypassRead;
        self
    }

    /// Marks the call to bypass both cache reads and writes.
    #[must_use]
    pub fn bypass_all(mut self) -> Self {
        self.flow = FlowMode::BypassAll;
        self
    }

    /// Sets an absolute deadline for the call.
    ///
    /// Blocking paths (the single-flight waiter) give up and report a miss
    /// once the deadline passes. Store backends may also use it to bound
    /// their round trips.
    #[must_use]
    pub fn deadline_at(mut self, at: SystemTime) -> Self {
        self.deadline = Some(at);
        self
    }

    /// Returns the flow mode.
    #[must_use]
    pub fn flow(&self) -> FlowMode {
        self.flow
    }

    /// Returns the absolute deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<SystemTime> {
        self.deadline
    }

    /// Returns true if reads should be suppressed.
    #[must_use]
    pub fn suppresses_reads(&self) -> bool {
        matches!(self.flow, FlowMode::BypassRead | FlowMode::BypassAll)
    }

    /// Returns true if writes and deletes should be suppressed.
    #[must_use]
    pub fn suppresses_writes(&self) -> bool {
        matches!(self.flow, FlowMode::BypassAll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn default_is_normal_without_deadline() {
        let ctx = Context::new();
        assert_eq!(ctx.flow(), FlowMode::Normal);
        assert!(ctx.deadline().is_none());
        assert!(!ctx.suppresses_reads());
        assert!(!ctx.suppresses_writes());
    }

    #[test]
    fn bypass_read_suppresses_reads_only() {
        let ctx = Context::new().bypass_read();
        assert!(ctx.suppresses_reads());
        assert!(!ctx.suppresses_writes());
    }

    #[test]
    fn bypass_all_suppresses_reads_and_writes() {
        let ctx = Context::new().bypass_all();
        assert!(ctx.suppresses_reads());
        assert!(ctx.suppresses_writes());
    }

    #[test]
    fn markers_are_last_write_wins() {
        let ctx = Context::new().bypass_all().bypass_read();
        assert_eq!(ctx.flow(), FlowMode::BypassRead);
    }

    #[test]
    fn deadline_round_trips() {
        let at = UNIX_EPOCH + Duration::from_secs(1_000_000);
        let ctx = Context::new().deadline_at(at);
        assert_eq!(ctx.deadline(), Some(at));
    }
}
