pub mod ball;
pub mod color;
pub mod config;
pub mod detection;
pub mod error;
pub mod field_map;
pub mod kmeans;
pub mod team;
pub mod track;
pub mod tracker;
pub mod utils;
pub mod visualization;

// Re-export main types
pub use crate::config::Config;
pub use crate::detection::{BBox, Detection, DetectionSource, JsonTrackSource, ObjectClass};
pub use crate::error::{PitchError, Result};
pub use crate::team::Team;
pub use crate::tracker::{FrameSummary, MatchTracker};
