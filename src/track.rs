use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::detection::ObjectClass;
use crate::team::Team;

/// What is remembered about one track id for the life of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    /// First class ever observed for the id; later observations are ignored.
    pub class: ObjectClass,
    pub team: Option<Team>,
}

/// Per-track memory of class and team.
#[derive(Debug, Default)]
pub struct TrackStore {
    records: HashMap<i64, TrackRecord>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frozen class for `track_id`, recording `observed` if the id is new.
    pub fn resolve_class(&mut self, track_id: i64, observed: ObjectClass) -> ObjectClass {
        self.records
            .entry(track_id)
            .or_insert_with(|| {
                debug!("track {} first seen as {}", track_id, observed);
                TrackRecord { class: observed, team: None }
            })
            .class
    }

    /// Overwrites any earlier team. Unknown ids are recorded as players.
    pub fn set_team(&mut self, track_id: i64, team: Team) {
        self.records
            .entry(track_id)
            .or_insert(TrackRecord { class: ObjectClass::Player, team: None })
            .team = Some(team);
    }

    pub fn get_team(&self, track_id: i64) -> Option<Team> {
        self.records.get(&track_id).and_then(|r| r.team)
    }

    pub fn get(&self, track_id: i64) -> Option<&TrackRecord> {
        self.records.get(&track_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
