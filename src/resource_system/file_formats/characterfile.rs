use std::path::Path;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    game::clip::{ClipKind, EventTrack},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Joint {
    pub name: String,
    /// must reference an earlier joint
    pub parent: Option<usize>,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    pub group: usize,
    #[serde(default)]
    pub kind: ClipKind,
    #[serde(default)]
    pub event_tracks: Vec<EventTrack>,
}

/// Character description: skeleton, the animation file driving it and its clips.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CharacterFile {
    /// nax2 or nanim2 file, relative to the character file
    pub animation: String,
    pub joints: Vec<Joint>,
    pub clips: Vec<Clip>,
}

impl CharacterFile {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_description() {
        let json = r#"{
            "animation": "walk.nax2",
            "joints": [
                { "name": "root", "parent": null, "translation": [0, 0, 0], "rotation": [0, 0, 0, 1], "scale": [1, 1, 1] },
                { "name": "spine", "parent": 0, "translation": [0, 1, 0], "rotation": [0, 0, 0, 1], "scale": [1, 1, 1] }
            ],
            "clips": [
                { "name": "walk", "group": 0, "event_tracks": [
                    { "name": "Footstep", "events": [
                        { "time": 0.5, "translation": [0, 0, 0], "rotation": [0, 0, 0, 1], "scale": [1, 1, 1] }
                    ] }
                ] },
                { "name": "bind", "group": 1, "kind": "BasePose" }
            ]
        }"#;
        let file: CharacterFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.joints[1].parent, Some(0));
        assert_eq!(file.clips[0].kind, ClipKind::Sampled);
        assert_eq!(file.clips[0].event_tracks[0].events[0].time, 0.5);
        assert_eq!(file.clips[1].kind, ClipKind::BasePose);
    }
}
