use glam::{Quat, Vec4};
use serde::{Deserialize, Serialize};

use super::{curve::{Curve, Interpolation}, group::AnimationGroup};
use crate::error::{AnimError, Result};

/// Anything that can hand out animation groups and sample their curves.
pub trait CurveSource: Send + Sync {
    fn group_count(&self) -> usize;

    fn group(&self, index: usize) -> Option<&AnimationGroup>;

    /// Samples `keys.len()` curves of a group starting at `first_curve`. When `start_keys` is
    /// given it receives each curve's value at time 0.
    fn sample_curves(
        &self,
        time: f32,
        group_index: usize,
        first_curve: usize,
        keys: &mut [Vec4],
        start_keys: Option<&mut [Vec4]>,
    ) -> Result<()>;
}

/// Groups plus the flat key pool their curves index into. Immutable once built, shared between
/// characters behind an `Arc`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "RawAnimationAsset")]
pub struct AnimationAsset {
    name: String,
    groups: Vec<AnimationGroup>,
    keys: Vec<Vec4>,
}

#[derive(Deserialize)]
struct RawAnimationAsset {
    name: String,
    groups: Vec<AnimationGroup>,
    keys: Vec<Vec4>,
}

impl TryFrom<RawAnimationAsset> for AnimationAsset {
    type Error = AnimError;

    fn try_from(raw: RawAnimationAsset) -> Result<Self> {
        Self::new(raw.name, raw.groups, raw.keys)
    }
}

impl AnimationAsset {
    pub fn new(name: impl Into<String>, groups: Vec<AnimationGroup>, keys: Vec<Vec4>) -> Result<Self> {
        for (group_index, group) in groups.iter().enumerate() {
            for (curve_index, curve) in group.curves.iter().enumerate() {
                if let Some(first) = curve.first_key_index() {
                    let last = group
                        .num_keys
                        .checked_sub(1)
                        .and_then(|n| n.checked_mul(group.key_stride))
                        .and_then(|span| span.checked_add(first));
                    if !last.is_some_and(|last| last < keys.len()) {
                        return Err(AnimError::KeyRangeOutOfBounds { group: group_index, curve: curve_index });
                    }
                }
            }
        }
        Ok(Self { name: name.into(), groups, keys })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[AnimationGroup] {
        &self.groups
    }

    pub fn keys(&self) -> &[Vec4] {
        &self.keys
    }

    pub fn duration(&self, group_index: usize) -> Option<f32> {
        self.groups.get(group_index).map(AnimationGroup::duration)
    }

    fn sample_curve(&self, group: &AnimationGroup, curve: &Curve, time: f32) -> Vec4 {
        let Some(first) = curve.first_key_index() else {
            return curve.const_value();
        };
        let pos = group.time_to_index(time);
        match curve.interpolation() {
            Interpolation::None => curve.const_value(),
            Interpolation::Step => self.keys[first + pos.index0],
            Interpolation::Quat => {
                let q0 = Quat::from_vec4(self.keys[first + pos.index0]);
                let q1 = Quat::from_vec4(self.keys[first + pos.index1]);
                Vec4::from(q0.slerp(q1, pos.fraction))
            }
            Interpolation::Linear => {
                let v0 = self.keys[first + pos.index0];
                let v1 = self.keys[first + pos.index1];
                v0 + (v1 - v0) * pos.fraction
            }
        }
    }

    fn start_value(&self, group: &AnimationGroup, curve: &Curve) -> Vec4 {
        match (curve.first_key_index(), curve.interpolation()) {
            (Some(first), Interpolation::Step) => self.keys[first],
            _ => self.sample_curve(group, curve, 0.0),
        }
    }
}

impl CurveSource for AnimationAsset {
    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn group(&self, index: usize) -> Option<&AnimationGroup> {
        self.groups.get(index)
    }

    fn sample_curves(
        &self,
        time: f32,
        group_index: usize,
        first_curve: usize,
        keys: &mut [Vec4],
        mut start_keys: Option<&mut [Vec4]>,
    ) -> Result<()> {
        let group = self.groups.get(group_index).ok_or(AnimError::GroupOutOfRange {
            index: group_index,
            count: self.groups.len(),
        })?;
        let end = first_curve + keys.len();
        let start_len = start_keys.as_ref().map_or(keys.len(), |s| s.len());
        if end > group.num_curves() || start_len < keys.len() {
            return Err(AnimError::CurveRangeOutOfBounds { first: first_curve, end, count: group.num_curves() });
        }

        let curves = &group.curves[first_curve..end];
        for (i, curve) in curves.iter().enumerate() {
            keys[i] = self.sample_curve(group, curve, time);
            if let Some(start_keys) = start_keys.as_deref_mut() {
                start_keys[i] = self.start_value(group, curve);
            }
        }
        Ok(())
    }
}
