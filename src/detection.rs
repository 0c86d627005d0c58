use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Object category reported by the external detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectClass {
    Player,
    Referee,
    Ball,
    Other,
}

impl ObjectClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectClass::Player => "player",
            ObjectClass::Referee => "referee",
            ObjectClass::Ball => "ball",
            ObjectClass::Other => "other",
        }
    }
}

impl From<&str> for ObjectClass {
    fn from(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "player" => ObjectClass::Player,
            "referee" => ObjectClass::Referee,
            "ball" => ObjectClass::Ball,
            _ => ObjectClass::Other,
        }
    }
}

impl From<String> for ObjectClass {
    fn from(label: String) -> Self {
        ObjectClass::from(label.as_str())
    }
}

impl From<ObjectClass> for String {
    fn from(class: ObjectClass) -> Self {
        class.as_str().to_string()
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in frame pixels, (x1, y1) top-left and (x2, y2) bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// A single detection of one tracked object in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub track_id: i64,
    #[serde(rename = "class_name")]
    pub class: ObjectClass,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(track_id: i64, class: ObjectClass, bbox: BBox) -> Self {
        Self { track_id, class, bbox }
    }
}

/// Supplies per-frame detections with persistent track ids.
pub trait DetectionSource {
    fn detections_for(&mut self, frame_index: usize) -> Result<Vec<Detection>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FrameDetections {
    frame_id: usize,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Detections exported ahead of time by a detector/tracker run, one JSON entry per frame.
///
/// ```json
/// [{"frame_id": 0, "detections": [{"track_id": 7, "class_name": "player", "bbox": [10, 20, 40, 90]}]}]
/// ```
#[derive(Debug, Default)]
pub struct JsonTrackSource {
    frames: HashMap<usize, Vec<Detection>>,
}

impl JsonTrackSource {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let entries: Vec<FrameDetections> = serde_json::from_str(data)?;
        let mut frames: HashMap<usize, Vec<Detection>> = HashMap::new();
        for entry in entries {
            frames.entry(entry.frame_id).or_default().extend(entry.detections);
        }
        Ok(Self { frames })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl DetectionSource for JsonTrackSource {
    fn detections_for(&mut self, frame_index: usize) -> Result<Vec<Detection>> {
        Ok(self.frames.remove(&frame_index).unwrap_or_default())
    }
}
