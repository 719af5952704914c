// Playback tuning constants - adjust these to balance server load vs responsiveness
// All timing-related constants in one place for easy tuning

use std::time::Duration;

// === Progress Tracking ===

/// Media time between progress reports to the tracking service
pub const PROGRESS_REPORT_INTERVAL: Duration = Duration::from_secs(5);

// === Lookahead ===

/// Resolve the next playlist item once less than this much of the current
/// item remains (strictly less than)
pub const LOOKAHEAD_THRESHOLD: Duration = Duration::from_secs(10);
