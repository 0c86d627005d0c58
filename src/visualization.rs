use opencv::{
    core::{Mat, Point, Rect, Scalar, Size},
    imgproc,
    prelude::*,
};

use crate::config::Config;
use crate::detection::{BBox, ObjectClass};
use crate::error::Result;
use crate::team::Team;
use crate::utils;

// BGR
pub const TEAM_ONE_COLOR: Scalar = Scalar::new(255.0, 0.0, 0.0, 0.0); // Blue
pub const TEAM_TWO_COLOR: Scalar = Scalar::new(0.0, 0.0, 255.0, 0.0); // Red
const LABEL_TEXT_COLOR: Scalar = Scalar::new(0.0, 0.0, 0.0, 0.0);

/// Fixed marker color for a class, used whenever no team color applies.
pub fn class_color(class: ObjectClass) -> Scalar {
    match class {
        ObjectClass::Player => Scalar::new(255.0, 255.0, 255.0, 0.0),  // White
        ObjectClass::Referee => Scalar::new(0.0, 255.0, 255.0, 0.0),   // Yellow
        ObjectClass::Ball => Scalar::new(255.0, 0.0, 255.0, 0.0),      // Magenta
        ObjectClass::Other => Scalar::new(0.0, 255.0, 0.0, 0.0),       // Green
    }
}

pub fn team_color(team: Team) -> Scalar {
    match team {
        Team::One => TEAM_ONE_COLOR,
        Team::Two => TEAM_TWO_COLOR,
    }
}

/// Team color for resolved players, class color for everything else.
pub fn marker_color(class: ObjectClass, team: Option<Team>) -> Scalar {
    match (class, team) {
        (ObjectClass::Player, Some(team)) => team_color(team),
        _ => class_color(class),
    }
}

pub fn label_text(class: ObjectClass, track_id: i64, team: Option<Team>) -> String {
    match (class, team) {
        (ObjectClass::Player, Some(team)) => format!("{} | ID:{} | {}", class, track_id, team),
        _ => format!("{} | ID:{}", class, track_id),
    }
}

/// One class/team-resolved object ready to be drawn.
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    pub track_id: i64,
    pub class: ObjectClass,
    pub team: Option<Team>,
    pub bbox: BBox,
}

/// Partial ellipse under the object, a pointer above the ball, and an id tag.
pub fn draw_entity(frame: &mut Mat, entity: &Entity, config: &Config) -> Result<()> {
    let foot = utils::foot_point(&entity.bbox);
    let color = marker_color(entity.class, entity.team);

    let axes = Size::new(
        ((utils::bbox_width(&entity.bbox) as f32 * config.ellipse_width_factor) as i32).max(config.ellipse_min_width),
        ((utils::bbox_height(&entity.bbox) as f32 * config.ellipse_height_factor) as i32).max(config.ellipse_min_height),
    );
    imgproc::ellipse(
        frame,
        foot,
        axes,
        0.0,
        config.ellipse_start_angle,
        config.ellipse_end_angle,
        color,
        2,
        imgproc::LINE_4,
        0,
    )?;

    if entity.class == ObjectClass::Ball {
        imgproc::arrowed_line(
            frame,
            Point::new(foot.x, foot.y - 15),
            Point::new(foot.x, foot.y - 30),
            color,
            2,
            imgproc::LINE_8,
            0,
            0.4,
        )?;
    }

    let text = label_text(entity.class, entity.track_id, entity.team);
    draw_label(frame, &text, foot, color, config)
}

/// Filled tag centered below `anchor` with black text.
pub fn draw_label(frame: &mut Mat, text: &str, anchor: Point, color: Scalar, config: &Config) -> Result<()> {
    let mut baseline = 0;
    let text_size = imgproc::get_text_size(
        text,
        imgproc::FONT_HERSHEY_SIMPLEX,
        config.font_scale,
        config.label_thickness,
        &mut baseline,
    )?;
    let half = text_size.width / 2;

    let bg_rect = Rect::new(anchor.x - half - 5, anchor.y + 14, 2 * half + 11, 21);
    imgproc::rectangle(frame, bg_rect, color, -1, imgproc::LINE_8, 0)?;

    utils::put_text(
        frame,
        text,
        (anchor.x - half, anchor.y + 30),
        LABEL_TEXT_COLOR,
        config.font_scale,
        config.label_thickness,
    )?;
    Ok(())
}

/// Paste `map` into the frame at `offset`, clipped to the frame bounds.
pub fn composite_map(frame: &mut Mat, map: &Mat, offset: Point) -> Result<()> {
    let width = map.cols().min(frame.cols() - offset.x);
    let height = map.rows().min(frame.rows() - offset.y);
    if width <= 0 || height <= 0 || offset.x < 0 || offset.y < 0 {
        return Ok(());
    }
    let src = Mat::roi(map, Rect::new(0, 0, width, height))?;
    let mut dst = Mat::roi_mut(frame, Rect::new(offset.x, offset.y, width, height))?;
    src.copy_to(&mut dst)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, CV_8UC3};

    fn blank(rows: i32, cols: i32) -> Mat {
        Mat::new_rows_cols_with_default(rows, cols, CV_8UC3, Scalar::all(0.0)).unwrap()
    }

    fn pixel(frame: &Mat, x: i32, y: i32) -> Vec3b {
        *frame.at_2d::<Vec3b>(y, x).unwrap()
    }

    #[test]
    fn test_label_text() {
        assert_eq!(label_text(ObjectClass::Player, 4, Some(Team::Two)), "player | ID:4 | T2");
        assert_eq!(label_text(ObjectClass::Player, 4, None), "player | ID:4");
        assert_eq!(label_text(ObjectClass::Referee, 9, Some(Team::One)), "referee | ID:9");
        assert_eq!(label_text(ObjectClass::Ball, 1, None), "ball | ID:1");
    }

    #[test]
    fn test_marker_colors() {
        assert_eq!(marker_color(ObjectClass::Player, Some(Team::One)), TEAM_ONE_COLOR);
        assert_eq!(marker_color(ObjectClass::Player, Some(Team::Two)), TEAM_TWO_COLOR);
        assert_eq!(marker_color(ObjectClass::Player, None), class_color(ObjectClass::Player));
        assert_eq!(marker_color(ObjectClass::Referee, Some(Team::One)), class_color(ObjectClass::Referee));
    }

    #[test]
    fn test_draw_player_entity() {
        let mut frame = blank(400, 600);
        let entity = Entity {
            track_id: 3,
            class: ObjectClass::Player,
            team: Some(Team::Two),
            bbox: BBox::new(200.0, 100.0, 260.0, 220.0),
        };
        draw_entity(&mut frame, &entity, &Config::default()).unwrap();
        let mut baseline = 0;
        let text_size = imgproc::get_text_size("player | ID:3 | T2", imgproc::FONT_HERSHEY_SIMPLEX, 0.55, 2, &mut baseline)
            .unwrap();
        // Left padding of the tag, below the foot point (230, 220).
        let tag = pixel(&frame, 230 - text_size.width / 2 - 4, 220 + 24);
        assert_eq!(tag, Vec3b::from([0, 0, 255]));
        // Ellipse passes through the far right of its horizontal axis.
        assert_eq!(pixel(&frame, 230 + 30, 220), Vec3b::from([0, 0, 255]));
        // Nothing drawn well above the box.
        assert_eq!(pixel(&frame, 230, 50), Vec3b::from([0, 0, 0]));
    }

    #[test]
    fn test_ball_gets_arrow() {
        let mut frame = blank(400, 600);
        let entity = Entity {
            track_id: 1,
            class: ObjectClass::Ball,
            team: None,
            bbox: BBox::new(295.0, 190.0, 305.0, 200.0),
        };
        draw_entity(&mut frame, &entity, &Config::default()).unwrap();
        assert_eq!(pixel(&frame, 300, 200 - 20), Vec3b::from([255, 0, 255]));
    }

    #[test]
    fn test_composite_map() {
        let mut frame = blank(600, 1000);
        let map = Mat::new_rows_cols_with_default(250, 400, CV_8UC3, Scalar::new(0.0, 128.0, 0.0, 0.0)).unwrap();
        composite_map(&mut frame, &map, Point::new(10, 10)).unwrap();
        assert_eq!(pixel(&frame, 10, 10), Vec3b::from([0, 128, 0]));
        assert_eq!(pixel(&frame, 409, 259), Vec3b::from([0, 128, 0]));
        assert_eq!(pixel(&frame, 410, 260), Vec3b::from([0, 0, 0]));
        assert_eq!(pixel(&frame, 9, 9), Vec3b::from([0, 0, 0]));
    }

    #[test]
    fn test_composite_map_clipped() {
        let mut frame = blank(100, 120);
        let map = Mat::new_rows_cols_with_default(250, 400, CV_8UC3, Scalar::new(0.0, 128.0, 0.0, 0.0)).unwrap();
        composite_map(&mut frame, &map, Point::new(10, 10)).unwrap();
        assert_eq!(pixel(&frame, 119, 99), Vec3b::from([0, 128, 0]));
    }
}
