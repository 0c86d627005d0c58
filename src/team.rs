//! Two-team split of players by shirt color.

use log::{debug, info, warn};
use opencv::{core::Mat, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::color::ColorSampler;
use crate::detection::Detection;
use crate::error::{PitchError, Result};
use crate::kmeans::{self, Color, KMeansParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    One,
    Two,
}

impl Team {
    /// 1 or 2, as shown in labels.
    pub fn number(&self) -> u8 {
        match self {
            Team::One => 1,
            Team::Two => 2,
        }
    }

    fn from_cluster(cluster: usize) -> Self {
        if cluster == 0 {
            Team::One
        } else {
            Team::Two
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.number())
    }
}

/// Two centroids in color space, one per team. Fit once, then only predicts.
#[derive(Debug, Clone)]
pub struct TeamColorModel {
    params: KMeansParams,
    centroids: Option<[Color; 2]>,
}

impl TeamColorModel {
    pub fn new(params: KMeansParams) -> Self {
        Self {
            params: KMeansParams { k: 2, ..params },
            centroids: None,
        }
    }

    pub fn is_fit(&self) -> bool {
        self.centroids.is_some()
    }

    /// Fit the two team centroids. Returns false without changing anything when the
    /// model is already fit or fewer than two samples are given.
    pub fn fit(&mut self, samples: &[Color]) -> bool {
        if self.is_fit() {
            return false;
        }
        match kmeans::fit(samples, &self.params) {
            Some(clustering) => {
                self.centroids = Some([clustering.centroids[0], clustering.centroids[1]]);
                true
            }
            None => false,
        }
    }

    /// Team whose centroid is nearest to `sample`, or `None` before the model is fit.
    pub fn predict(&self, sample: &Color) -> Option<Team> {
        self.centroids
            .as_ref()
            .map(|c| Team::from_cluster(kmeans::nearest(c, sample)))
    }

    pub fn team_color(&self, team: Team) -> Option<Color> {
        self.centroids.map(|c| match team {
            Team::One => c[0],
            Team::Two => c[1],
        })
    }
}

/// Resolves each player track to a team exactly once.
pub struct TeamClassifier {
    sampler: ColorSampler,
    model: TeamColorModel,
    player_teams: HashMap<i64, Team>,
}

impl TeamClassifier {
    pub fn new(sampler: ColorSampler, model: TeamColorModel) -> Self {
        Self {
            sampler,
            model,
            player_teams: HashMap::new(),
        }
    }

    /// Sample every player without a team, fit the model on the first frame that
    /// offers at least two samples, then predict a team for each pending track.
    ///
    /// Returns the tracks resolved by this call.
    pub fn assign_teams(&mut self, frame: &Mat, players: &[&Detection]) -> Result<Vec<(i64, Team)>> {
        let mut pending: Vec<(i64, Color)> = Vec::new();
        for det in players {
            if self.player_teams.contains_key(&det.track_id)
                || pending.iter().any(|(id, _)| *id == det.track_id)
            {
                continue;
            }
            match self.sampler.sample(frame, det.track_id, &det.bbox) {
                Ok(color) => pending.push((det.track_id, color)),
                Err(PitchError::DegenerateBox { track_id, width, height }) => {
                    warn!("skipping color sample for track {}: {}x{} crop", track_id, width, height);
                }
                Err(e) => return Err(e),
            }
        }

        if pending.is_empty() {
            return Ok(Vec::new());
        }

        if !self.model.is_fit() {
            let samples: Vec<Color> = pending.iter().map(|(_, c)| *c).collect();
            if !self.model.fit(&samples) {
                debug!("deferring team model fit: {} sample(s)", samples.len());
                return Ok(Vec::new());
            }
            if let (Some(one), Some(two)) = (self.model.team_color(Team::One), self.model.team_color(Team::Two)) {
                info!(
                    "team model fit on {} players: T1 bgr=({:.0}, {:.0}, {:.0}) T2 bgr=({:.0}, {:.0}, {:.0})",
                    samples.len(), one[0], one[1], one[2], two[0], two[1], two[2]
                );
            }
        }

        let mut resolved = Vec::with_capacity(pending.len());
        for (track_id, color) in pending {
            if let Some(team) = self.model.predict(&color) {
                debug!("track {} -> {}", track_id, team);
                self.player_teams.insert(track_id, team);
                resolved.push((track_id, team));
            }
        }
        Ok(resolved)
    }

    /// `None` until `assign_teams` has resolved this track.
    pub fn get_player_team(&self, track_id: i64) -> Option<Team> {
        self.player_teams.get(&track_id).copied()
    }

    pub fn model(&self) -> &TeamColorModel {
        &self.model
    }
}
