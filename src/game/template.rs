use std::{path::Path, sync::Arc};

use super::{
    anim_state::AnimationState,
    character::CharacterAnimator,
    character_set::CharacterSet,
    clip::{AnimationClip, ClipKind, EventTrack},
    skeleton::{Skeleton, SkeletonSink},
};
use crate::{
    config::{AnimSettings, CURVES_PER_JOINT},
    error::{AnimError, Result},
    resource_system::{animation::CurveSource, file_formats::characterfile::CharacterFile, library::AnimationLibrary},
};

/// A live character created from a template, plus the clips it was asked to play.
#[derive(Clone)]
pub struct CharacterInstance {
    pub character: CharacterAnimator,
    pub clip_set: CharacterSet,
}

impl AsMut<CharacterAnimator> for CharacterInstance {
    fn as_mut(&mut self) -> &mut CharacterAnimator {
        &mut self.character
    }
}

/// Blueprint shared by all instances of one character type: skeleton, animation and clip table.
pub struct CharacterTemplate {
    character: CharacterAnimator,
    clips: Vec<Arc<AnimationClip>>,
    anim_enabled: bool,
}

impl CharacterTemplate {
    pub fn new(skeleton: Skeleton, animation: Arc<dyn CurveSource>, settings: AnimSettings) -> Result<Self> {
        let mut character = CharacterAnimator::with_settings(skeleton, settings);
        character.set_animation(animation)?;
        Ok(Self { character, clips: Vec::new(), anim_enabled: true })
    }

    /// Builds a template from a character description, loading its animation through `library`.
    /// The animation path is resolved relative to `base_dir`.
    pub fn from_file(
        file: &CharacterFile,
        base_dir: &Path,
        library: &mut AnimationLibrary,
        settings: AnimSettings,
    ) -> Result<Self> {
        let mut skeleton = Skeleton::with_capacity(file.joints.len());
        for joint in &file.joints {
            skeleton.add_joint(joint.name.clone(), joint.parent, joint.translation, joint.rotation, joint.scale)?;
        }
        let id = library.load(base_dir.join(&file.animation))?;
        let animation = library.get(id).ok_or_else(|| AnimError::UnsupportedFormat(file.animation.clone()))?;

        let mut template = Self::new(skeleton, animation, settings)?;
        for clip in &file.clips {
            let index = template.add_clip_with_kind(&clip.name, clip.group, clip.kind)?;
            for track in &clip.event_tracks {
                template.add_event_track(index, track.clone())?;
            }
        }
        Ok(template)
    }

    pub fn character(&self) -> &CharacterAnimator {
        &self.character
    }

    pub fn num_joints(&self) -> usize {
        self.character.skeleton().num_joints()
    }

    pub fn joint_by_name(&self, name: &str) -> Option<usize> {
        self.character.skeleton().joint_index_by_name(name)
    }

    /// Registers a clip driving every joint of the skeleton from `group_index`.
    pub fn add_clip(&mut self, name: &str, group_index: usize) -> Result<usize> {
        self.add_clip_with_kind(name, group_index, ClipKind::from_clip_name(name))
    }

    pub fn add_clip_with_kind(&mut self, name: &str, group_index: usize, kind: ClipKind) -> Result<usize> {
        let clip = AnimationClip::new(name, group_index, self.num_joints() * CURVES_PER_JOINT).with_kind(kind);
        if let Some(animation) = self.character.animation() {
            clip.validate(animation.as_ref())?;
        }
        self.clips.push(Arc::new(clip));
        Ok(self.clips.len() - 1)
    }

    pub fn add_event_track(&mut self, clip_index: usize, track: EventTrack) -> Result<()> {
        let count = self.clips.len();
        let clip = self
            .clips
            .get_mut(clip_index)
            .ok_or(AnimError::ClipOutOfRange { index: clip_index, count })?;
        Arc::make_mut(clip).add_event_track(track);
        Ok(())
    }

    pub fn clips(&self) -> &[Arc<AnimationClip>] {
        &self.clips
    }

    pub fn clip_index_by_name(&self, name: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.name() == name)
    }

    /// Seconds, taken from the clip's animation group.
    pub fn clip_duration(&self, clip_index: usize) -> Option<f32> {
        let clip = self.clips.get(clip_index)?;
        let animation = self.character.animation()?;
        animation.group(clip.group_index()).map(|g| g.duration())
    }

    pub fn set_anim_enabled(&mut self, enabled: bool) {
        self.anim_enabled = enabled;
    }

    /// New character playing the first clip at full weight.
    pub fn create_instance(self: &Arc<Self>) -> Result<CharacterInstance> {
        let mut character = self.character.clone();
        character.set_template(Arc::downgrade(self));
        if let Some(first) = self.clips.first() {
            let mut state = AnimationState::new();
            state.add_clip(first.clone(), 1.0)?;
            state.set_state_started(0.0);
            character.set_active_state(state);
        }
        Ok(CharacterInstance { character, clip_set: CharacterSet::new() })
    }

    /// Applies pending clip set changes and evaluates the instance, once per frame id.
    pub fn animate(&self, instance: &mut CharacterInstance, frame_id: u32, time: f32) -> Result<bool> {
        let character = &mut instance.character;
        character.set_anim_enabled(self.anim_enabled);
        if character.last_evaluation_frame_id() == Some(frame_id) {
            return Ok(false);
        }

        self.apply_clip_set(instance, time)?;
        instance.character.evaluate_frame(frame_id, time)
    }

    /// Turns a dirty clip set into the instance's new active state, started at `time`. A set
    /// without weight installs an empty state.
    pub fn apply_clip_set(&self, instance: &mut CharacterInstance, time: f32) -> Result<()> {
        if instance.clip_set.is_dirty() {
            let state = self.state_for(&instance.clip_set, time)?;
            instance.character.set_active_state(state);
            instance.clip_set.set_dirty(false);
        }
        Ok(())
    }

    fn state_for(&self, clip_set: &CharacterSet, time: f32) -> Result<AnimationState> {
        let mut state = AnimationState::new();
        let weight_sum = clip_set.weight_sum();
        if weight_sum > 0.0 {
            state.set_state_started(time);
            state.set_fade_in_time(clip_set.fade_in_time());
            for (name, weight) in clip_set.clips() {
                let index = self.clip_index_by_name(name).ok_or_else(|| AnimError::UnknownClip(name.to_string()))?;
                state.add_clip(self.clips[index].clone(), weight / weight_sum)?;
            }
        }
        Ok(state)
    }
}
