//! Shirt color sampling for a single player box.

use opencv::{
    core::{Mat, Rect, Vec3b},
    imgproc,
    prelude::*,
};

use crate::detection::BBox;
use crate::error::{PitchError, Result};
use crate::kmeans::{self, Color, KMeansParams};
use crate::utils;

/// Decides which of the two pixel clusters inside a crop is background.
pub trait BackgroundStrategy {
    /// `positions` holds the (row, col) of every clustered pixel inside the crop,
    /// in the same order as `labels`.
    fn background_cluster(&self, positions: &[(i32, i32)], labels: &[usize]) -> usize;
}

/// Majority vote of the first and last clustered pixel, which sit nearest the
/// crop corners and are usually grass. On a split vote cluster 0 is background.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerVote;

impl BackgroundStrategy for CornerVote {
    fn background_cluster(&self, _positions: &[(i32, i32)], labels: &[usize]) -> usize {
        match (labels.first(), labels.last()) {
            (Some(&a), Some(&b)) if a == b => a,
            (Some(&a), Some(&b)) => a.min(b),
            _ => 0,
        }
    }
}

pub struct ColorSampler {
    saturation_threshold: u8,
    kmeans: KMeansParams,
    background: Box<dyn BackgroundStrategy>,
}

impl ColorSampler {
    pub fn new(saturation_threshold: u8, kmeans: KMeansParams) -> Self {
        Self::with_strategy(saturation_threshold, kmeans, Box::new(CornerVote))
    }

    pub fn with_strategy(
        saturation_threshold: u8,
        kmeans: KMeansParams,
        background: Box<dyn BackgroundStrategy>,
    ) -> Self {
        Self {
            saturation_threshold,
            kmeans: KMeansParams { k: 2, ..kmeans },
            background,
        }
    }

    /// Representative shirt color (BGR) of the player inside `bbox`.
    ///
    /// Only the upper half of the box is used. Pixels whose HSV saturation is at or
    /// below the threshold are dropped unless that would drop every pixel.
    pub fn sample(&self, frame: &Mat, track_id: i64, bbox: &BBox) -> Result<Color> {
        let crop = clip(utils::to_rect(bbox), frame);
        let top = Rect::new(crop.x, crop.y, crop.width, crop.height / 2);
        if top.width < 1 || top.height < 1 {
            return Err(PitchError::DegenerateBox {
                track_id,
                width: crop.width,
                height: crop.height,
            });
        }

        let top_half = Mat::roi(frame, top)?.try_clone()?;
        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&top_half, &mut hsv, imgproc::COLOR_BGR2HSV)?;

        let mut all = Vec::with_capacity((top.width * top.height) as usize);
        let mut saturated = Vec::new();
        for row in 0..top.height {
            for col in 0..top.width {
                let px = top_half.at_2d::<Vec3b>(row, col)?;
                let color = Color::new(px[0] as f64, px[1] as f64, px[2] as f64);
                if hsv.at_2d::<Vec3b>(row, col)?[1] > self.saturation_threshold {
                    saturated.push(((row, col), color));
                }
                all.push(((row, col), color));
            }
        }
        let pixels = if saturated.is_empty() { all } else { saturated };

        let (positions, colors): (Vec<(i32, i32)>, Vec<Color>) = pixels.into_iter().unzip();
        let Some(clustering) = kmeans::fit(&colors, &self.kmeans) else {
            // A single surviving pixel is its own sample.
            return Ok(colors[0]);
        };

        let background = self.background.background_cluster(&positions, &clustering.labels);
        let player = if background == 0 { 1 } else { 0 };
        Ok(clustering.centroids[player])
    }
}

fn clip(rect: Rect, frame: &Mat) -> Rect {
    let x1 = rect.x.clamp(0, frame.cols());
    let y1 = rect.y.clamp(0, frame.rows());
    let x2 = (rect.x + rect.width).clamp(0, frame.cols());
    let y2 = (rect.y + rect.height).clamp(0, frame.rows());
    Rect::new(x1, y1, x2 - x1, y2 - y1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use opencv::core::{Scalar, CV_8UC3};

    const GRASS: [f64; 3] = [40.0, 140.0, 60.0];

    fn sampler() -> ColorSampler {
        ColorSampler::new(40, KMeansParams::default())
    }

    fn fill(frame: &mut Mat, rect: Rect, bgr: [f64; 3]) {
        imgproc::rectangle(
            frame,
            rect,
            Scalar::new(bgr[0], bgr[1], bgr[2], 0.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();
    }

    fn pitch(width: i32, height: i32) -> Mat {
        Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::new(GRASS[0], GRASS[1], GRASS[2], 0.0)).unwrap()
    }

    #[test]
    fn test_shirt_inside_grass() {
        let mut frame = pitch(200, 200);
        // Box 100..140 x 40..120, shirt occupies the centre of the upper half.
        fill(&mut frame, Rect::new(110, 50, 20, 25), [220.0, 30.0, 30.0]);
        let color = sampler().sample(&frame, 1, &BBox::new(100.0, 40.0, 140.0, 120.0)).unwrap();
        assert_relative_eq!(color[0], 220.0, epsilon = 1.0);
        assert_relative_eq!(color[1], 30.0, epsilon = 1.0);
        assert_relative_eq!(color[2], 30.0, epsilon = 1.0);
    }

    #[test]
    fn test_low_saturation_crop_falls_back() {
        let mut frame = Mat::new_rows_cols_with_default(100, 100, CV_8UC3, Scalar::all(200.0)).unwrap();
        fill(&mut frame, Rect::new(20, 10, 10, 10), [90.0, 90.0, 90.0]);
        let color = sampler().sample(&frame, 1, &BBox::new(10.0, 0.0, 40.0, 60.0)).unwrap();
        assert_relative_eq!(color[0], 90.0, epsilon = 1.0);
    }

    #[test]
    fn test_box_clipped_to_frame() {
        let mut frame = pitch(100, 100);
        fill(&mut frame, Rect::new(85, 0, 10, 20), [20.0, 20.0, 230.0]);
        let color = sampler().sample(&frame, 1, &BBox::new(80.0, -10.0, 120.0, 90.0)).unwrap();
        assert_relative_eq!(color[2], 230.0, epsilon = 1.0);
    }

    #[test]
    fn test_degenerate_box_is_an_error() {
        let frame = pitch(50, 50);
        let err = sampler().sample(&frame, 3, &BBox::new(10.0, 10.0, 20.0, 11.0)).unwrap_err();
        assert!(matches!(err, PitchError::DegenerateBox { track_id: 3, .. }));
    }

    #[test]
    fn test_corner_vote() {
        let vote = CornerVote;
        assert_eq!(vote.background_cluster(&[], &[1, 0, 0, 1]), 1);
        assert_eq!(vote.background_cluster(&[], &[0, 1, 1, 0]), 0);
        assert_eq!(vote.background_cluster(&[], &[1, 1, 0, 0]), 0);
    }

    /// Treats the cluster under the crop centre as background, the opposite of the default.
    struct CentreIsBackground;

    impl BackgroundStrategy for CentreIsBackground {
        fn background_cluster(&self, positions: &[(i32, i32)], labels: &[usize]) -> usize {
            let rows = positions.iter().map(|p| p.0).max().unwrap_or(0) + 1;
            let cols = positions.iter().map(|p| p.1).max().unwrap_or(0) + 1;
            let centre = (rows / 2, cols / 2);
            positions
                .iter()
                .position(|&p| p == centre)
                .map(|i| labels[i])
                .unwrap_or(0)
        }
    }

    #[test]
    fn test_pluggable_strategy() {
        let mut frame = pitch(200, 200);
        fill(&mut frame, Rect::new(110, 50, 20, 25), [220.0, 30.0, 30.0]);
        let sampler = ColorSampler::with_strategy(40, KMeansParams::default(), Box::new(CentreIsBackground));
        let color = sampler.sample(&frame, 1, &BBox::new(100.0, 40.0, 140.0, 120.0)).unwrap();
        assert_relative_eq!(color[0], GRASS[0], epsilon = 1.0);
        assert_relative_eq!(color[1], GRASS[1], epsilon = 1.0);
        assert_relative_eq!(color[2], GRASS[2], epsilon = 1.0);
    }
}
