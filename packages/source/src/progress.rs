//! Progress reporting callback used by long-running passes.
//!
//! Implemented by `spot_map_cli_utils` with `indicatif` bars; passes accept
//! an optional callback so library use stays silent.

/// Callback interface for reporting pass progress.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of items, switching spinners to bars.
    fn set_total(&self, total: u64);

    /// Sets the absolute position.
    fn set_position(&self, pos: u64);

    /// Increments the position.
    fn inc(&self, delta: u64);

    /// Updates the displayed message.
    fn set_message(&self, msg: String);

    /// Finishes with a final message.
    fn finish(&self, msg: String);

    /// Finishes and removes the bar.
    fn finish_and_clear(&self);
}
