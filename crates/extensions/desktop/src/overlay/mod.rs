//! Search-overlay detection and opening.

mod detector;
mod opener;
mod query;
mod speed;

pub use detector::{
    dark_fraction, DetectionMethod, DetectionResult, OverlayDetector, SpotlightDetector,
};
pub use opener::{AdaptiveOpener, OpenAttempt, OverlayOpen, OverlayOpener};
pub use query::{AppleScriptQuery, QueryError};
pub use speed::SpeedEstimate;
