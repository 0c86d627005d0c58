use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Tunables for one tracking session. Missing JSON fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // field map
    pub map_width: i32,
    pub map_height: i32,
    /// Top-left corner of the map overlay inside the output frame.
    pub map_offset: [i32; 2],
    pub field_color: [u8; 3],
    pub line_color: [u8; 3],
    pub line_thickness: i32,
    pub center_circle_radius: i32,
    pub player_marker_radius: i32,
    pub ball_marker_radius: i32,

    // color sampling and team model
    pub saturation_threshold: u8,
    pub kmeans_n_init: usize,
    pub kmeans_max_iter: usize,
    pub kmeans_seed: u64,

    // ball
    /// Longest run of extrapolated frames before the ball is dropped. `None` never drops.
    pub max_interpolated_frames: Option<usize>,
    pub low_confidence_after: usize,

    // annotation
    pub ellipse_width_factor: f32,
    pub ellipse_height_factor: f32,
    pub ellipse_min_width: i32,
    pub ellipse_min_height: i32,
    pub ellipse_start_angle: f64,
    pub ellipse_end_angle: f64,
    pub font_scale: f64,
    pub label_thickness: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_width: 400,
            map_height: 250,
            map_offset: [10, 10],
            field_color: [0, 128, 0],
            line_color: [255, 255, 255],
            line_thickness: 2,
            center_circle_radius: 40,
            player_marker_radius: 5,
            ball_marker_radius: 3,
            saturation_threshold: 40,
            kmeans_n_init: 10,
            kmeans_max_iter: 300,
            kmeans_seed: 42,
            max_interpolated_frames: None,
            low_confidence_after: 3,
            ellipse_width_factor: 0.5,
            ellipse_height_factor: 0.15,
            ellipse_min_width: 15,
            ellipse_min_height: 5,
            ellipse_start_angle: -45.0,
            ellipse_end_angle: 235.0,
            font_scale: 0.55,
            label_thickness: 2,
        }
    }
}

impl Config {
    /// Load from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"map_width": 320, "max_interpolated_frames": 5}"#).unwrap();
        assert_eq!(cfg.map_width, 320);
        assert_eq!(cfg.map_height, 250);
        assert_eq!(cfg.max_interpolated_frames, Some(5));
        assert_eq!(cfg.kmeans_seed, 42);
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join("pitchtrack_config_test.json");
        fs::write(&path, r#"{"saturation_threshold": 60}"#).unwrap();
        let cfg = Config::from_file(&path).unwrap();
        assert_eq!(cfg.saturation_threshold, 60);
        assert_eq!(cfg.player_marker_radius, Config::default().player_marker_radius);
        fs::remove_file(&path).ok();
    }
}
