use log::{debug, warn};
use opencv::{
    core::{Mat, Point},
    prelude::*,
};
use serde::Serialize;

use crate::ball::BallTrajectory;
use crate::color::ColorSampler;
use crate::config::Config;
use crate::detection::{Detection, ObjectClass};
use crate::error::Result;
use crate::field_map::FieldMap;
use crate::kmeans::KMeansParams;
use crate::team::{Team, TeamClassifier, TeamColorModel};
use crate::track::TrackStore;
use crate::utils;
use crate::visualization::{self, Entity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackSummary {
    pub track_id: i64,
    pub class_name: ObjectClass,
    pub team: Option<u8>,
    pub map_position: [i32; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallSummary {
    pub position: [i32; 2],
    pub map_position: [i32; 2],
    pub interpolated: bool,
    pub low_confidence: bool,
}

/// What one processed frame resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSummary {
    pub frame_id: usize,
    pub tracks: Vec<TrackSummary>,
    pub ball: Option<BallSummary>,
}

/// All per-video state: track memory, team model, ball history and the field map.
///
/// Frames must be fed in order. Separate videos need separate instances.
pub struct MatchTracker {
    config: Config,
    tracks: TrackStore,
    teams: TeamClassifier,
    ball: BallTrajectory,
    field_map: FieldMap,
}

impl MatchTracker {
    pub fn new(config: &Config) -> Result<Self> {
        let params = KMeansParams {
            k: 2,
            n_init: config.kmeans_n_init,
            max_iter: config.kmeans_max_iter,
            seed: config.kmeans_seed,
            ..KMeansParams::default()
        };
        Ok(MatchTracker {
            config: config.clone(),
            tracks: TrackStore::new(),
            teams: TeamClassifier::new(
                ColorSampler::new(config.saturation_threshold, params),
                TeamColorModel::new(params),
            ),
            ball: BallTrajectory::new(config.max_interpolated_frames),
            field_map: FieldMap::new(config)?,
        })
    }

    /// Resolve classes and teams for this frame's detections, update the ball, and
    /// burn markers, labels and the field map into `frame`.
    pub fn process_frame(&mut self, frame: &mut Mat, detections: &[Detection], frame_id: usize) -> Result<FrameSummary> {
        let (frame_w, frame_h) = (frame.cols(), frame.rows());

        let mut resolved: Vec<Detection> = Vec::with_capacity(detections.len());
        for det in detections {
            if utils::is_degenerate(&det.bbox) {
                warn!("frame {}: skipping degenerate box for track {}", frame_id, det.track_id);
                continue;
            }
            let class = self.tracks.resolve_class(det.track_id, det.class);
            resolved.push(Detection::new(det.track_id, class, det.bbox));
        }

        // Sample shirts before anything is drawn over the frame.
        let players: Vec<&Detection> = resolved.iter().filter(|d| d.class == ObjectClass::Player).collect();
        for (track_id, team) in self.teams.assign_teams(frame, &players)? {
            self.tracks.set_team(track_id, team);
        }

        self.field_map.reset()?;

        let mut summary = FrameSummary { frame_id, tracks: Vec::with_capacity(resolved.len()), ball: None };
        for det in &resolved {
            let team: Option<Team> = match det.class {
                ObjectClass::Player => self.tracks.get_team(det.track_id),
                _ => None,
            };
            let foot = utils::foot_point(&det.bbox);
            let on_map = self.field_map.project(foot.x, foot.y, frame_w, frame_h);

            match det.class {
                ObjectClass::Player => {
                    self.field_map.draw_player(on_map, visualization::marker_color(det.class, team))?;
                }
                ObjectClass::Ball => {
                    self.ball.observe(foot);
                    self.field_map.draw_ball(on_map)?;
                    summary.ball = Some(BallSummary {
                        position: [foot.x, foot.y],
                        map_position: [on_map.x, on_map.y],
                        interpolated: false,
                        low_confidence: false,
                    });
                }
                _ => {}
            }

            let entity = Entity { track_id: det.track_id, class: det.class, team, bbox: det.bbox };
            visualization::draw_entity(frame, &entity, &self.config)?;

            summary.tracks.push(TrackSummary {
                track_id: det.track_id,
                class_name: det.class,
                team: team.map(|t| t.number()),
                map_position: [on_map.x, on_map.y],
            });
        }

        if summary.ball.is_none() {
            if let Some(estimate) = self.ball.interpolate() {
                let on_map = self.field_map.project(estimate.x, estimate.y, frame_w, frame_h);
                self.field_map.draw_ball(on_map)?;
                let low_confidence = self.ball.is_low_confidence(self.config.low_confidence_after);
                if low_confidence {
                    debug!(
                        "frame {}: ball extrapolated for {} frames",
                        frame_id,
                        self.ball.consecutive_interpolated()
                    );
                }
                summary.ball = Some(BallSummary {
                    position: [estimate.x, estimate.y],
                    map_position: [on_map.x, on_map.y],
                    interpolated: true,
                    low_confidence,
                });
            }
        }

        let map = self.field_map.snapshot()?;
        let offset = Point::new(self.config.map_offset[0], self.config.map_offset[1]);
        visualization::composite_map(frame, &map, offset)?;

        Ok(summary)
    }

    pub fn track_store(&self) -> &TrackStore {
        &self.tracks
    }

    pub fn team_classifier(&self) -> &TeamClassifier {
        &self.teams
    }

    pub fn ball(&self) -> &BallTrajectory {
        &self.ball
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }
}
