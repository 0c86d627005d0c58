//! Top-down pitch schematic that entity positions are projected onto each frame.

use opencv::{
    core::{Mat, Point, Rect, Scalar, CV_8UC3},
    imgproc,
    prelude::*,
};

use crate::config::Config;
use crate::error::Result;
use crate::utils::bgr;

const BORDER: i32 = 5;
const PENALTY_DEPTH: i32 = 100;
const PENALTY_HALF_HEIGHT: i32 = 80;
const GOAL_DEPTH: i32 = 40;
const GOAL_HALF_HEIGHT: i32 = 40;
const CENTER_SPOT_RADIUS: i32 = 3;

pub struct FieldMap {
    width: i32,
    height: i32,
    pristine: Mat,
    canvas: Mat,
    player_radius: i32,
    ball_radius: i32,
    ball_color: Scalar,
}

impl FieldMap {
    pub fn new(config: &Config) -> Result<Self> {
        let pristine = draw_field(config)?;
        let canvas = pristine.try_clone()?;
        Ok(Self {
            width: config.map_width,
            height: config.map_height,
            pristine,
            canvas,
            player_radius: config.player_marker_radius,
            ball_radius: config.ball_marker_radius,
            ball_color: Scalar::new(255.0, 255.0, 255.0, 0.0),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Drop every marker and start again from the bare pitch.
    pub fn reset(&mut self) -> Result<()> {
        self.pristine.copy_to(&mut self.canvas)?;
        Ok(())
    }

    /// Linear frame-to-map scaling, `x * map_width / frame_width`, truncated toward zero.
    pub fn project(&self, x: i32, y: i32, frame_width: i32, frame_height: i32) -> Point {
        let mx = x as i64 * self.width as i64 / frame_width.max(1) as i64;
        let my = y as i64 * self.height as i64 / frame_height.max(1) as i64;
        Point::new(mx as i32, my as i32)
    }

    pub fn draw_player(&mut self, at: Point, color: Scalar) -> Result<()> {
        imgproc::circle(&mut self.canvas, at, self.player_radius, color, -1, imgproc::LINE_8, 0)?;
        Ok(())
    }

    pub fn draw_ball(&mut self, at: Point) -> Result<()> {
        imgproc::circle(&mut self.canvas, at, self.ball_radius, self.ball_color, -1, imgproc::LINE_8, 0)?;
        Ok(())
    }

    /// Independent copy of the current canvas.
    pub fn snapshot(&self) -> Result<Mat> {
        Ok(self.canvas.try_clone()?)
    }

    pub fn pristine(&self) -> &Mat {
        &self.pristine
    }
}

/// Rectangle spanning two inclusive corners.
fn span(x1: i32, y1: i32, x2: i32, y2: i32) -> Rect {
    Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1)
}

fn draw_field(config: &Config) -> opencv::Result<Mat> {
    let (w, h) = (config.map_width, config.map_height);
    let mut field = Mat::new_rows_cols_with_default(h, w, CV_8UC3, bgr(config.field_color))?;
    let line = bgr(config.line_color);
    let t = config.line_thickness;
    let (cx, cy) = (w / 2, h / 2);

    imgproc::rectangle(&mut field, span(BORDER, BORDER, w - BORDER, h - BORDER), line, t, imgproc::LINE_8, 0)?;
    imgproc::line(
        &mut field,
        Point::new(cx, BORDER),
        Point::new(cx, h - BORDER),
        line,
        t,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::circle(&mut field, Point::new(cx, cy), config.center_circle_radius, line, t, imgproc::LINE_8, 0)?;
    imgproc::circle(&mut field, Point::new(cx, cy), CENTER_SPOT_RADIUS, line, -1, imgproc::LINE_8, 0)?;

    // penalty areas
    let penalty = [
        span(BORDER, cy - PENALTY_HALF_HEIGHT, PENALTY_DEPTH, cy + PENALTY_HALF_HEIGHT),
        span(w - PENALTY_DEPTH, cy - PENALTY_HALF_HEIGHT, w - BORDER, cy + PENALTY_HALF_HEIGHT),
    ];
    // goal areas
    let goal = [
        span(BORDER, cy - GOAL_HALF_HEIGHT, GOAL_DEPTH, cy + GOAL_HALF_HEIGHT),
        span(w - GOAL_DEPTH, cy - GOAL_HALF_HEIGHT, w - BORDER, cy + GOAL_HALF_HEIGHT),
    ];
    for rect in penalty.iter().chain(goal.iter()) {
        imgproc::rectangle(&mut field, *rect, line, t, imgproc::LINE_8, 0)?;
    }

    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::Vec3b;

    fn map() -> FieldMap {
        FieldMap::new(&Config::default()).unwrap()
    }

    fn same_pixels(a: &Mat, b: &Mat) -> bool {
        a.size().unwrap() == b.size().unwrap() && a.data_bytes().unwrap() == b.data_bytes().unwrap()
    }

    #[test]
    fn test_pristine_field() {
        let map = map();
        let field = map.pristine();
        assert_eq!(field.rows(), 250);
        assert_eq!(field.cols(), 400);
        // Grass in a corner region, white on the halfway line.
        assert_eq!(*field.at_2d::<Vec3b>(1, 1).unwrap(), Vec3b::from([0, 128, 0]));
        assert_eq!(*field.at_2d::<Vec3b>(60, 200).unwrap(), Vec3b::from([255, 255, 255]));
    }

    #[test]
    fn test_projection_is_linear() {
        let map = map();
        assert_eq!(map.project(100, 50, 1000, 600), Point::new(40, 20));
        assert_eq!(map.project(0, 0, 1000, 600), Point::new(0, 0));
        assert_eq!(map.project(1000, 600, 1000, 600), Point::new(400, 250));
        // 101 * 400 / 1000 = 40.4 and 51 * 250 / 600 = 21.25 both truncate.
        assert_eq!(map.project(101, 51, 1000, 600), Point::new(40, 21));
        // Off-frame extrapolations truncate toward zero.
        assert_eq!(map.project(-3, -5, 1000, 600), Point::new(-1, -2));
    }

    #[test]
    fn test_reset_clears_markers() {
        let mut map = map();
        map.draw_player(Point::new(100, 100), Scalar::new(255.0, 0.0, 0.0, 0.0)).unwrap();
        map.draw_ball(Point::new(300, 60)).unwrap();
        assert!(!same_pixels(&map.snapshot().unwrap(), map.pristine()));

        map.reset().unwrap();
        map.reset().unwrap();
        assert!(same_pixels(&map.snapshot().unwrap(), map.pristine()));
        assert!(same_pixels(map.pristine(), &draw_field(&Config::default()).unwrap()));
    }

    #[test]
    fn test_markers() {
        let mut map = map();
        map.draw_player(Point::new(100, 100), Scalar::new(0.0, 0.0, 255.0, 0.0)).unwrap();
        map.draw_ball(Point::new(300, 60)).unwrap();
        let snap = map.snapshot().unwrap();
        assert_eq!(*snap.at_2d::<Vec3b>(100, 100).unwrap(), Vec3b::from([0, 0, 255]));
        assert_eq!(*snap.at_2d::<Vec3b>(104, 100).unwrap(), Vec3b::from([0, 0, 255]));
        assert_eq!(*snap.at_2d::<Vec3b>(60, 300).unwrap(), Vec3b::from([255, 255, 255]));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut map = map();
        let mut snap = map.snapshot().unwrap();
        imgproc::circle(&mut snap, Point::new(50, 50), 10, Scalar::all(0.0), -1, imgproc::LINE_8, 0).unwrap();
        assert!(same_pixels(&map.snapshot().unwrap(), map.pristine()));

        map.draw_ball(Point::new(50, 50)).unwrap();
        assert_eq!(*snap.at_2d::<Vec3b>(50, 50).unwrap(), Vec3b::from([0, 0, 0]));
    }
}
