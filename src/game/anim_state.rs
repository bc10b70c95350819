use std::sync::Arc;

use super::clip::{AnimationClip, ClipKind};
use crate::error::{AnimError, Result};

#[derive(Debug, Clone)]
pub struct WeightedClip {
    pub clip: Arc<AnimationClip>,
    /// in [0, 1]
    pub weight: f32,
}

/// Weighted set of clips played together, plus when the state began and how long it fades in.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    clips: Vec<WeightedClip>,
    /// seconds, length of the crossfade from the previous state
    fade_in_time: f32,
    /// absolute time at which the state was activated
    state_started: f32,
    /// added to the state-relative time before sampling
    state_offset: f32,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every clip of a state must drive the same number of curves.
    pub fn add_clip(&mut self, clip: Arc<AnimationClip>, weight: f32) -> Result<&mut Self> {
        if let Some(first) = self.clips.first() {
            if first.clip.num_curves() != clip.num_curves() {
                return Err(AnimError::StateCurveMismatch {
                    expected: first.clip.num_curves(),
                    actual: clip.num_curves(),
                });
            }
        }
        let clamped = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        if clamped != weight {
            log::warn!("clip '{}' weight {} clamped to {}", clip.name(), weight, clamped);
        }
        self.clips.push(WeightedClip { clip, weight: clamped });
        Ok(self)
    }

    pub fn with_clip(mut self, clip: Arc<AnimationClip>, weight: f32) -> Result<Self> {
        self.add_clip(clip, weight)?;
        Ok(self)
    }

    pub fn clips(&self) -> &[WeightedClip] {
        &self.clips
    }

    pub fn clip(&self, index: usize) -> Option<&AnimationClip> {
        self.clips.get(index).map(|c| c.clip.as_ref())
    }

    pub fn clip_weight(&self, index: usize) -> Option<f32> {
        self.clips.get(index).map(|c| c.weight)
    }

    pub fn num_clips(&self) -> usize {
        self.clips.len()
    }

    pub fn num_curves(&self) -> usize {
        self.clips.first().map_or(0, |c| c.clip.num_curves())
    }

    pub fn is_valid(&self) -> bool {
        !self.clips.is_empty()
    }

    pub fn has_sampled_clips(&self) -> bool {
        self.clips.iter().any(|c| c.clip.kind() == ClipKind::Sampled)
    }

    pub fn fade_in_time(&self) -> f32 {
        self.fade_in_time
    }

    pub fn set_fade_in_time(&mut self, seconds: f32) {
        self.fade_in_time = seconds;
    }

    pub fn state_started(&self) -> f32 {
        self.state_started
    }

    pub fn set_state_started(&mut self, time: f32) {
        self.state_started = time;
    }

    pub fn state_offset(&self) -> f32 {
        self.state_offset
    }

    pub fn set_state_offset(&mut self, offset: f32) {
        self.state_offset = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_state_is_invalid() {
        let state = AnimationState::new();
        assert!(!state.is_valid());
        assert_eq!(state.num_curves(), 0);
    }

    #[test]
    fn rejects_mismatched_curve_counts() {
        let mut state = AnimationState::new();
        state.add_clip(Arc::new(AnimationClip::new("walk", 0, 6)), 1.0).unwrap();
        let result = state.add_clip(Arc::new(AnimationClip::new("wave", 1, 3)), 1.0);
        assert!(matches!(result, Err(AnimError::StateCurveMismatch { expected: 6, actual: 3 })));
        assert_eq!(state.num_clips(), 1);
    }

    #[test]
    fn weights_are_clamped() {
        let state = AnimationState::new()
            .with_clip(Arc::new(AnimationClip::new("walk", 0, 3)), 1.5)
            .unwrap()
            .with_clip(Arc::new(AnimationClip::new("run", 1, 3)), -0.5)
            .unwrap();
        assert_eq!(state.clip_weight(0), Some(1.0));
        assert_eq!(state.clip_weight(1), Some(0.0));
        assert!(state.has_sampled_clips());
    }

    #[test]
    fn base_pose_only_state_has_nothing_to_sample() {
        let state = AnimationState::new()
            .with_clip(Arc::new(AnimationClip::new("baseClip", 0, 3)), 1.0)
            .unwrap();
        assert!(state.is_valid());
        assert!(!state.has_sampled_clips());
    }
}
