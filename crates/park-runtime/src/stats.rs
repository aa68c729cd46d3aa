//! Session counters

/// Counters of one presence session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Patches applied to the mirror
    pub patches_applied: u64,
    /// Local record writes
    pub publishes: u64,
    /// Parent locators that did not resolve in the local scene
    pub deferred_parents: u64,
    /// Position samples handed to smoothers
    pub smoothed_samples: u64,
    /// Clicks swallowed by an occupied object
    pub suppressed_clicks: u64,
    /// Times a remote claim took an object from the local avatar
    pub preemptions: u64,
}
