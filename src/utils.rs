use opencv::{core::{Mat, Point, Rect, Scalar}, imgproc, prelude::*};

use crate::detection::BBox;

/// Integer corners of a box, truncated like the detector's pixel grid.
pub fn bbox_corners(bbox: &BBox) -> (i32, i32, i32, i32) {
    (bbox.x1 as i32, bbox.y1 as i32, bbox.x2 as i32, bbox.y2 as i32)
}

pub fn bbox_width(bbox: &BBox) -> i32 {
    let (x1, _, x2, _) = bbox_corners(bbox);
    x2 - x1
}

pub fn bbox_height(bbox: &BBox) -> i32 {
    let (_, y1, _, y2) = bbox_corners(bbox);
    y2 - y1
}

pub fn bbox_center(bbox: &BBox) -> Point {
    let (x1, y1, x2, y2) = bbox_corners(bbox);
    Point::new((x1 + x2) / 2, (y1 + y2) / 2)
}

/// Horizontal center on the bottom edge: where the object touches the pitch.
pub fn foot_point(bbox: &BBox) -> Point {
    let (x1, _, x2, y2) = bbox_corners(bbox);
    Point::new((x1 + x2) / 2, y2)
}

pub fn is_degenerate(bbox: &BBox) -> bool {
    bbox_width(bbox) < 2 || bbox_height(bbox) < 2
}

pub fn to_rect(bbox: &BBox) -> Rect {
    let (x1, y1, x2, y2) = bbox_corners(bbox);
    Rect::new(x1, y1, x2 - x1, y2 - y1)
}

/// BGR triple to an OpenCV color.
pub fn bgr(color: [u8; 3]) -> Scalar {
    Scalar::new(color[0] as f64, color[1] as f64, color[2] as f64, 0.0)
}

pub fn put_text(
    img: &mut Mat,
    text: &str,
    org: (i32, i32),
    color: Scalar,
    font_scale: f64,
    thickness: i32,
) -> opencv::Result<()> {
    let point = Point::new(org.0, org.1);
    imgproc::put_text(
        img,
        text,
        point,
        imgproc::FONT_HERSHEY_SIMPLEX,
        font_scale,
        color,
        thickness,
        imgproc::LINE_8,
        false,
    )
}
