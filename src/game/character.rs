use std::sync::{Arc, Weak};

use glam::{Quat, Vec4};

use super::{
    anim_events::{collect_state_events, AnimEventHandler},
    anim_state::AnimationState,
    blend::{sample_state, CurveCache, SampleScratch},
    clip::EventTrack,
    skeleton::{Skeleton, SkeletonSink},
    template::CharacterTemplate,
};
use crate::{
    config::{AnimSettings, CURVES_PER_JOINT},
    error::{AnimError, Result},
    resource_system::animation::CurveSource,
};

/// One animated character: a skeleton driven by a current and a previous animation state.
#[derive(Clone)]
pub struct CharacterAnimator {
    skeleton: Skeleton,
    animation: Option<Arc<dyn CurveSource>>,
    cur_state: AnimationState,
    prev_state: AnimationState,
    anim_enabled: bool,
    last_evaluation_frame_id: Option<u32>,
    event_handler: Option<Weak<dyn AnimEventHandler>>,
    template: Option<Weak<CharacterTemplate>>,
    settings: AnimSettings,

    scratch: SampleScratch,
    cache: CurveCache,
    out_tracks: Vec<EventTrack>,
}

impl AsMut<CharacterAnimator> for CharacterAnimator {
    fn as_mut(&mut self) -> &mut CharacterAnimator {
        self
    }
}

impl CharacterAnimator {
    pub fn new(skeleton: Skeleton) -> Self {
        Self::with_settings(skeleton, AnimSettings::default())
    }

    pub fn with_settings(skeleton: Skeleton, settings: AnimSettings) -> Self {
        Self {
            skeleton,
            animation: None,
            cur_state: AnimationState::default(),
            prev_state: AnimationState::default(),
            anim_enabled: true,
            last_evaluation_frame_id: None,
            event_handler: None,
            template: None,
            settings,
            scratch: SampleScratch::default(),
            cache: CurveCache::default(),
            out_tracks: Vec::new(),
        }
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        &mut self.skeleton
    }

    pub fn settings(&self) -> &AnimSettings {
        &self.settings
    }

    /// Attaches the animation data and sizes the per-character buffers for it.
    pub fn set_animation(&mut self, animation: Arc<dyn CurveSource>) -> Result<()> {
        let num_joints = self.skeleton.num_joints();
        if num_joints > self.settings.max_joints {
            return Err(AnimError::TooManyJoints { count: num_joints, max: self.settings.max_joints });
        }
        let max_group_curves = (0..animation.group_count())
            .filter_map(|i| animation.group(i))
            .map(|g| g.num_curves())
            .max()
            .unwrap_or(0);
        self.scratch.reserve_curves(max_group_curves.max(num_joints * CURVES_PER_JOINT));
        self.cache = CurveCache::for_source(animation.as_ref());
        self.animation = Some(animation);
        Ok(())
    }

    pub fn animation(&self) -> Option<&Arc<dyn CurveSource>> {
        self.animation.as_ref()
    }

    /// The current state becomes the previous one, which the new state crossfades from.
    pub fn set_active_state(&mut self, state: AnimationState) {
        log::debug!(
            "switching to state with {} clips (fade in {}s)",
            state.num_clips(),
            state.fade_in_time()
        );
        self.prev_state = std::mem::replace(&mut self.cur_state, state);
    }

    pub fn active_state(&self) -> &AnimationState {
        &self.cur_state
    }

    pub fn previous_state(&self) -> &AnimationState {
        &self.prev_state
    }

    pub fn set_anim_enabled(&mut self, enabled: bool) {
        self.anim_enabled = enabled;
    }

    pub fn is_anim_enabled(&self) -> bool {
        self.anim_enabled
    }

    pub fn last_evaluation_frame_id(&self) -> Option<u32> {
        self.last_evaluation_frame_id
    }

    pub fn set_last_evaluation_frame_id(&mut self, frame_id: u32) {
        self.last_evaluation_frame_id = Some(frame_id);
    }

    pub fn set_anim_event_handler<H: AnimEventHandler + 'static>(&mut self, handler: &Arc<H>) {
        let weak: Weak<dyn AnimEventHandler> = Arc::downgrade(handler) as Weak<dyn AnimEventHandler>;
        self.event_handler = Some(weak);
    }

    pub fn clear_anim_event_handler(&mut self) {
        self.event_handler = None;
    }

    pub fn set_template(&mut self, template: Weak<CharacterTemplate>) {
        self.template = Some(template);
    }

    pub fn template(&self) -> Option<Arc<CharacterTemplate>> {
        self.template.as_ref().and_then(Weak::upgrade)
    }

    /// Blends `state` at `time` into the character's key buffer and returns it. `None` when the
    /// state carries no weight.
    pub fn sample(&mut self, state: &AnimationState, time: f32) -> Result<Option<&[Vec4]>> {
        let animation = self.animation.as_ref().ok_or(AnimError::NoAnimation)?;
        self.scratch.reserve_curves(state.num_curves());
        let SampleScratch { keys, sample_keys, start_keys, .. } = &mut self.scratch;
        if !sample_state(animation.as_ref(), state, time, keys, sample_keys, start_keys, &mut self.cache)? {
            return Ok(None);
        }
        Ok(Some(&self.scratch.keys[..state.num_curves()]))
    }

    /// Skips the evaluation when this frame was already evaluated. Returns whether it ran.
    pub fn evaluate_frame(&mut self, frame_id: u32, time: f32) -> Result<bool> {
        if self.last_evaluation_frame_id == Some(frame_id) {
            return Ok(false);
        }
        self.last_evaluation_frame_id = Some(frame_id);
        self.evaluate_skeleton(time)?;
        Ok(true)
    }

    /// Samples the active state at `time`, crossfading from the previous state during the fade-in,
    /// writes the joints and evaluates the skeleton. The skeleton is evaluated even when nothing
    /// is sampled.
    pub fn evaluate_skeleton(&mut self, time: f32) -> Result<()> {
        if self.anim_enabled && self.cur_state.is_valid() {
            let mut cur_rel_time = time - self.cur_state.state_started();
            if cur_rel_time < 0.0 {
                log::debug!("clock went back to {time}, restarting the active state");
                cur_rel_time = 0.0;
                self.cur_state.set_state_started(time);
            }
            if self.cur_state.has_sampled_clips() {
                self.sample_joints(time, cur_rel_time)?;
            }
        }
        self.skeleton.evaluate();
        Ok(())
    }

    fn sample_joints(&mut self, time: f32, cur_rel_time: f32) -> Result<()> {
        let animation = self.animation.as_ref().ok_or(AnimError::NoAnimation)?;
        let num_joints = self.skeleton.num_joints();
        let num_curves = num_joints * CURVES_PER_JOINT;
        if self.cur_state.num_curves() != num_curves {
            return Err(AnimError::JointCurveMismatch { joints: num_joints, curves: self.cur_state.num_curves() });
        }
        self.scratch.reserve_curves(num_curves);
        let SampleScratch { keys, transition_keys, sample_keys, start_keys } = &mut self.scratch;

        let fade_in = self.cur_state.fade_in_time();
        let mut transition = None;
        if fade_in > 0.0 && cur_rel_time < fade_in && self.prev_state.is_valid() {
            if self.prev_state.num_curves() != num_curves {
                return Err(AnimError::JointCurveMismatch { joints: num_joints, curves: self.prev_state.num_curves() });
            }
            let prev_time = (time - self.prev_state.state_started()) + self.prev_state.state_offset();
            if sample_state(animation.as_ref(), &self.prev_state, prev_time, transition_keys, sample_keys, start_keys, &mut self.cache)? {
                transition = Some(cur_rel_time / fade_in);
            }
        }

        let cur_time = cur_rel_time + self.cur_state.state_offset();
        if !sample_state(animation.as_ref(), &self.cur_state, cur_time, keys, sample_keys, start_keys, &mut self.cache)? {
            return Ok(());
        }

        for joint in 0..num_joints {
            let base = joint * CURVES_PER_JOINT;
            let mut translate = keys[base].truncate();
            let mut rotate = Quat::from_vec4(keys[base + 1]);
            let mut scale = keys[base + 2].truncate();
            if let Some(lerp) = transition {
                translate = transition_keys[base].truncate().lerp(translate, lerp);
                rotate = Quat::from_vec4(transition_keys[base + 1]).slerp(rotate, lerp);
                scale = transition_keys[base + 2].truncate().lerp(scale, lerp);
            }
            self.skeleton.set_joint_local(joint, translate, rotate, scale);
        }
        Ok(())
    }

    /// Emits the events of the active state between the absolute times `from_time` and
    /// `to_time`. Needs a live event handler.
    pub fn emit_anim_events(&mut self, from_time: f32, to_time: f32) -> Result<usize> {
        if !self.cur_state.is_valid() {
            return Ok(0);
        }
        let started = self.cur_state.state_started();
        let offset = self.cur_state.state_offset();
        let state = std::mem::take(&mut self.cur_state);
        let emitted = self.emit_state_events(&state, (from_time - started) + offset, (to_time - started) + offset);
        self.cur_state = state;
        emitted
    }

    /// Emits the events of `state` between the state-relative times `from` and `to`. Windows that
    /// are empty or longer than the configured maximum emit nothing.
    pub fn emit_state_events(&mut self, state: &AnimationState, from: f32, to: f32) -> Result<usize> {
        let Some(handler) = self.event_handler.as_ref().and_then(Weak::upgrade) else {
            return Ok(0);
        };
        let window = to - from;
        if window <= 0.0 || window > self.settings.max_event_window {
            log::debug!("ignoring event window [{from}, {to}]");
            return Ok(0);
        }
        let animation = self.animation.as_ref().ok_or(AnimError::NoAnimation)?;

        collect_state_events(animation.as_ref(), state, from, to, self.settings.event_time_epsilon, &mut self.out_tracks);

        let mut emitted = 0;
        for track in &self.out_tracks {
            for event_index in 0..track.events.len() {
                handler.handle_event(track, event_index);
                emitted += 1;
            }
        }
        Ok(emitted)
    }

    /// Blended events of the last emission.
    pub fn emitted_tracks(&self) -> &[EventTrack] {
        &self.out_tracks
    }
}
