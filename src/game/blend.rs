use glam::{Quat, Vec4};

use super::anim_state::AnimationState;
use crate::{
    error::{AnimError, Result},
    resource_system::animation::{CurveSource, Interpolation},
};

/// Per-character sampling buffers, grown on demand and reused every frame.
#[derive(Debug, Clone, Default)]
pub struct SampleScratch {
    pub keys: Vec<Vec4>,
    pub transition_keys: Vec<Vec4>,
    pub sample_keys: Vec<Vec4>,
    pub start_keys: Vec<Vec4>,
}

impl SampleScratch {
    pub fn reserve_curves(&mut self, num_curves: usize) {
        for buffer in [&mut self.keys, &mut self.transition_keys, &mut self.sample_keys, &mut self.start_keys] {
            if buffer.len() < num_curves {
                buffer.resize(num_curves, Vec4::ZERO);
            }
        }
    }
}

/// Last sampled value of every animated curve, per (group, curve). Lets a static curve of a later
/// clip fall back to what an earlier clip produced.
#[derive(Debug, Clone, Default)]
pub struct CurveCache {
    group_offsets: Vec<usize>,
    clip_values: Vec<Vec4>,
}

impl CurveCache {
    pub fn for_source(source: &dyn CurveSource) -> Self {
        let mut group_offsets = Vec::with_capacity(source.group_count());
        let mut total = 0;
        for index in 0..source.group_count() {
            group_offsets.push(total);
            total += source.group(index).map_or(0, |g| g.num_curves());
        }
        Self { group_offsets, clip_values: vec![Vec4::ZERO; total] }
    }

    fn slot(&self, group: usize, curve: usize) -> Option<usize> {
        let slot = self.group_offsets.get(group)? + curve;
        (slot < self.clip_values.len()).then_some(slot)
    }

    pub fn clip_value(&self, group: usize, curve: usize) -> Vec4 {
        self.slot(group, curve).map_or(Vec4::ZERO, |s| self.clip_values[s])
    }

    pub fn set_clip_value(&mut self, group: usize, curve: usize, value: Vec4) {
        if let Some(slot) = self.slot(group, curve) {
            self.clip_values[slot] = value;
        }
    }
}

fn is_curve_animated(source: &dyn CurveSource, group: usize, curve: usize) -> bool {
    source
        .group(group)
        .and_then(|g| g.curve(curve))
        .is_some_and(|c| c.is_animated())
}

/// Blends every clip of `state` at `time` into `keys`.
///
/// Quaternion curves are slerped towards each clip by its share of the weight accumulated so far,
/// all other curves are summed weighted (not renormalised). A curve that is static in a clip, or
/// whose clip has zero weight, contributes the last value an earlier clip produced for it, or its
/// own start value when no earlier clip animates it. Returns false when the state carries no weight.
pub fn sample_state(
    source: &dyn CurveSource,
    state: &AnimationState,
    time: f32,
    keys: &mut [Vec4],
    sample_keys: &mut [Vec4],
    start_keys: &mut [Vec4],
    cache: &mut CurveCache,
) -> Result<bool> {
    let clips = state.clips();
    let mut weight_accum = 0.0f32;

    for (clip_index, entry) in clips.iter().enumerate() {
        let clip = &entry.clip;
        let clip_weight = entry.weight;
        let total = weight_accum + clip_weight;
        let scaled_weight = if total > 0.0 { clip_weight / total } else { 0.0 };

        clip.validate(source)?;
        let group_index = clip.group_index();
        let group = source.group(group_index).ok_or(AnimError::GroupOutOfRange {
            index: group_index,
            count: source.group_count(),
        })?;
        let num_curves = group.num_curves();
        if keys.len() < num_curves || sample_keys.len() < num_curves || start_keys.len() < num_curves {
            return Err(AnimError::CurveRangeOutOfBounds { first: 0, end: num_curves, count: keys.len() });
        }

        source.sample_curves(
            time,
            group_index,
            0,
            &mut sample_keys[..num_curves],
            Some(&mut start_keys[..num_curves]),
        )?;

        for (curve_index, curve) in group.curves.iter().enumerate() {
            let earlier = &clips[..clip_index];
            let (value, earlier_animated) = if curve.is_animated() && clip_weight > 0.0 {
                let sample = sample_keys[curve_index];
                cache.set_clip_value(group_index, curve_index, sample);
                let earlier_animated = earlier
                    .iter()
                    .any(|prev| is_curve_animated(source, prev.clip.group_index(), curve_index));
                (sample, earlier_animated)
            } else {
                // the last earlier clip animating this curve wins
                let fallback = earlier
                    .iter()
                    .filter(|prev| is_curve_animated(source, prev.clip.group_index(), curve_index))
                    .last()
                    .map(|prev| cache.clip_value(prev.clip.group_index(), curve_index));
                match fallback {
                    Some(value) => (value, true),
                    None => (start_keys[curve_index], false),
                }
            };

            let is_quat = curve.interpolation() == Interpolation::Quat;
            keys[curve_index] = match (earlier_animated, is_quat) {
                (false, true) => value,
                (false, false) => value * clip_weight,
                (true, true) => {
                    let accum = Quat::from_vec4(keys[curve_index]);
                    Vec4::from(accum.slerp(Quat::from_vec4(value), scaled_weight))
                }
                (true, false) => keys[curve_index] + value * clip_weight,
            };
        }
        weight_accum += clip_weight;
    }

    Ok(weight_accum > 0.0)
}
