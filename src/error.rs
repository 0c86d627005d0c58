use thiserror::Error;

#[derive(Debug, Error)]
pub enum PitchError {
    #[error("opencv: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Box narrower or shorter than 2px; callers are expected to filter these.
    #[error("degenerate bounding box for track {track_id}: {width}x{height}")]
    DegenerateBox { track_id: i64, width: i32, height: i32 },

    #[error("cannot open video source: {0}")]
    VideoSource(String),

    #[error("cannot open video sink: {0}")]
    VideoSink(String),
}

pub type Result<T> = std::result::Result<T, PitchError>;
