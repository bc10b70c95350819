use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{error::{AnimError, Result}, resource_system::animation::CurveSource};

/// Clips loaded under this name hold the bind pose and are never sampled.
pub const BASE_POSE_CLIP_NAME: &str = "baseClip";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipKind {
    #[default]
    Sampled,
    BasePose,
}

impl ClipKind {
    pub fn from_clip_name(name: &str) -> Self {
        if name == BASE_POSE_CLIP_NAME {
            ClipKind::BasePose
        } else {
            ClipKind::Sampled
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AnimEvent {
    /// seconds, relative to the clip
    pub time: f32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl AnimEvent {
    pub fn new(time: f32) -> Self {
        Self {
            time,
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EventTrack {
    pub name: String,
    pub events: Vec<AnimEvent>,
}

impl EventTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), events: Vec::new() }
    }

    pub fn with_events(name: impl Into<String>, events: Vec<AnimEvent>) -> Self {
        Self { name: name.into(), events }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnimationClip {
    name: String,
    kind: ClipKind,
    group_index: usize,
    num_curves: usize,
    event_tracks: Vec<EventTrack>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, group_index: usize, num_curves: usize) -> Self {
        let name = name.into();
        Self {
            kind: ClipKind::from_clip_name(&name),
            name,
            group_index,
            num_curves,
            event_tracks: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ClipKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClipKind {
        self.kind
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn num_curves(&self) -> usize {
        self.num_curves
    }

    pub fn event_tracks(&self) -> &[EventTrack] {
        &self.event_tracks
    }

    pub fn add_event_track(&mut self, track: EventTrack) {
        self.event_tracks.push(track);
    }

    /// The referenced group must exist and carry exactly `num_curves` curves.
    pub fn validate(&self, source: &dyn CurveSource) -> Result<()> {
        let group = source.group(self.group_index).ok_or(AnimError::GroupOutOfRange {
            index: self.group_index,
            count: source.group_count(),
        })?;
        if group.num_curves() != self.num_curves {
            return Err(AnimError::ClipCurveMismatch {
                clip: self.name.clone(),
                group: self.group_index,
                expected: self.num_curves,
                actual: group.num_curves(),
            });
        }
        Ok(())
    }
}
