#![allow(dead_code)]

use std::sync::Arc;

use character_anim::{
    AnimSettings, AnimationAsset, AnimationClip, AnimationGroup, AnimationState, CharacterAnimator,
    CharacterTemplate, Curve, Interpolation, LoopType, Skeleton,
};
use glam::{Quat, Vec3, Vec4};

pub const KEY_TIME: f32 = 0.25;
pub const NUM_KEYS: usize = 4;
pub const WALK: usize = 0;
pub const RUN: usize = 1;
pub const IDLE: usize = 2;

pub fn rotation_key(axis: Vec3, step: usize) -> Vec4 {
    Vec4::from(Quat::from_axis_angle(axis, step as f32 * 0.4))
}

fn static_curves(root_translation: Vec4) -> Vec<Curve> {
    vec![
        Curve::collapsed(Interpolation::Linear, root_translation),
        Curve::collapsed(Interpolation::Quat, Vec4::W),
        Curve::collapsed(Interpolation::Linear, Vec4::new(1.0, 1.0, 1.0, 0.0)),
        Curve::collapsed(Interpolation::Linear, Vec4::new(0.0, 1.0, 0.0, 0.0)),
        Curve::collapsed(Interpolation::Quat, Vec4::W),
        Curve::collapsed(Interpolation::Linear, Vec4::new(1.0, 1.0, 1.0, 0.0)),
    ]
}

/// Two-joint animation: walk and run repeat over one second, the root moving along x by 1 resp.
/// 2 units per key; idle is a static clamped pose.
pub fn biped_asset() -> AnimationAsset {
    let mut keys = Vec::new();
    let mut groups = Vec::new();
    for (axis, step) in [(Vec3::Y, 1.0f32), (Vec3::X, 2.0)] {
        let first = keys.len();
        for k in 0..NUM_KEYS {
            keys.push(Vec4::new(k as f32 * step, 0.0, 0.0, 0.0));
            keys.push(rotation_key(axis, k));
            keys.push(rotation_key(axis, NUM_KEYS - k));
        }
        let mut curves = static_curves(Vec4::ZERO);
        curves[0] = Curve::new(Interpolation::Linear, first, true);
        curves[1] = Curve::new(Interpolation::Quat, first + 1, true);
        curves[4] = Curve::new(Interpolation::Quat, first + 2, true);
        groups.push(AnimationGroup {
            curves,
            start_key: 0,
            num_keys: NUM_KEYS,
            key_stride: 3,
            key_time: KEY_TIME,
            fade_in_frames: 0.0,
            loop_type: LoopType::Repeat,
        });
    }
    groups.push(AnimationGroup {
        curves: static_curves(Vec4::new(0.0, 0.0, 5.0, 0.0)),
        num_keys: NUM_KEYS,
        key_stride: 1,
        key_time: KEY_TIME,
        loop_type: LoopType::Clamp,
        ..Default::default()
    });
    AnimationAsset::new("biped", groups, keys).unwrap()
}

pub fn biped_skeleton() -> Skeleton {
    let mut skeleton = Skeleton::new();
    let root = skeleton.add_joint("root", None, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE).unwrap();
    skeleton
        .add_joint("spine", Some(root), Vec3::new(0.0, 1.0, 0.0), Quat::IDENTITY, Vec3::ONE)
        .unwrap();
    skeleton
}

pub fn clip(name: &str, group: usize) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(name, group, 6))
}

pub fn state(clips: &[(usize, f32)]) -> AnimationState {
    let mut state = AnimationState::new();
    for (group, weight) in clips {
        state.add_clip(clip(&format!("group{group}"), *group), *weight).unwrap();
    }
    state
}

pub fn character(asset: &Arc<AnimationAsset>) -> CharacterAnimator {
    let mut character = CharacterAnimator::new(biped_skeleton());
    character.set_animation(asset.clone()).unwrap();
    character
}

pub fn biped_template(asset: &Arc<AnimationAsset>) -> CharacterTemplate {
    let mut template = CharacterTemplate::new(biped_skeleton(), asset.clone(), AnimSettings::default()).unwrap();
    template.add_clip("walk", WALK).unwrap();
    template.add_clip("run", RUN).unwrap();
    template.add_clip("idle", IDLE).unwrap();
    template
}

/// Raw walk / run root translation at a key index.
pub fn root_x(group: usize, key: usize) -> f32 {
    let step = if group == RUN { 2.0 } else { 1.0 };
    (key % NUM_KEYS) as f32 * step
}
