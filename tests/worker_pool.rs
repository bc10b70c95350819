mod common;

use std::sync::Arc;

use character_anim::{
    job_system::worker_pool::{animate_characters, FrameTask},
    AnimError, CharacterAnimator, QueuedEventHandler, Skeleton,
};
use common::*;
use glam::{Quat, Vec3};

fn crowd(size: usize) -> Vec<CharacterAnimator> {
    let asset = Arc::new(biped_asset());
    (0..size)
        .map(|i| {
            let mut character = character(&asset);
            let mut walk = state(&[(WALK, 1.0)]);
            walk.set_state_offset(i as f32 * 0.25);
            character.set_active_state(walk);
            character
        })
        .collect()
}

#[test]
fn parallel_matches_sequential() {
    let task = FrameTask { frame_id: 1, prev_time: 0.0, time: 0.5, emit_events: false };
    let mut parallel = crowd(13);
    let mut sequential = crowd(13);

    assert!(animate_characters(&mut parallel, task, 4).is_empty());
    for character in &mut sequential {
        character.evaluate_skeleton(task.time).unwrap();
    }
    for (a, b) in parallel.iter().zip(&sequential) {
        for (ja, jb) in a.skeleton().joints().iter().zip(b.skeleton().joints()) {
            assert_eq!(ja.translate(), jb.translate());
            assert_eq!(ja.skin_matrix(), jb.skin_matrix());
        }
    }
    assert_eq!(parallel[3].skeleton().joint(0).unwrap().translate(), Vec3::new(root_x(WALK, 5), 0.0, 0.0));
}

#[test]
fn failures_are_reported_by_index() {
    let asset = Arc::new(biped_asset());
    let mut characters = crowd(5);
    let mut skeleton = Skeleton::new();
    skeleton.add_joint("only", None, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE).unwrap();
    let mut broken = CharacterAnimator::new(skeleton);
    broken.set_animation(asset).unwrap();
    broken.set_active_state(state(&[(WALK, 1.0)]));
    characters.insert(2, broken);

    let task = FrameTask { frame_id: 1, prev_time: 0.0, time: 0.1, emit_events: false };
    let failures = animate_characters(&mut characters, task, 3);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 2);
    assert!(matches!(failures[0].error, AnimError::JointCurveMismatch { .. }));
}

#[test]
fn events_from_all_workers_reach_the_queue() {
    let mut characters = crowd(8);
    let handler = Arc::new(QueuedEventHandler::new());
    for character in &mut characters {
        let mut walk = state(&[]);
        walk.add_clip(
            Arc::new({
                let mut clip = character_anim::AnimationClip::new("walk", WALK, 6);
                clip.add_event_track(character_anim::EventTrack::with_events(
                    "Footstep",
                    vec![character_anim::AnimEvent::new(0.5)],
                ));
                clip
            }),
            1.0,
        )
        .unwrap();
        character.set_active_state(walk);
        character.set_anim_event_handler(&handler);
    }

    let task = FrameTask { frame_id: 1, prev_time: 0.4, time: 0.6, emit_events: true };
    assert!(animate_characters(&mut characters, task, 3).is_empty());
    assert_eq!(handler.len(), 8);

    // same frame again: nothing is re-evaluated, nothing is re-emitted
    assert!(animate_characters(&mut characters, task, 3).is_empty());
    assert_eq!(handler.len(), 8);
}

#[test]
fn empty_crowd_is_fine() {
    let task = FrameTask { frame_id: 0, prev_time: 0.0, time: 0.0, emit_events: true };
    let mut nobody: Vec<CharacterAnimator> = Vec::new();
    assert!(animate_characters(&mut nobody, task, 8).is_empty());
}

#[test]
fn template_instances_switch_clips_before_parallel_evaluation() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instances: Vec<_> = (0..6).map(|_| template.create_instance().unwrap()).collect();
    for instance in instances.iter_mut().skip(3) {
        instance.clip_set.add_clip("run", 1.0);
        template.apply_clip_set(instance, 0.0).unwrap();
    }

    let task = FrameTask { frame_id: 1, prev_time: 0.0, time: 0.5, emit_events: false };
    assert!(animate_characters(&mut instances, task, 2).is_empty());
    for (index, instance) in instances.iter().enumerate() {
        let group = if index < 3 { WALK } else { RUN };
        let root = instance.character.skeleton().joint(0).unwrap().translate();
        assert_eq!(root, Vec3::new(root_x(group, 2), 0.0, 0.0), "instance {index}");
        assert!(!instance.clip_set.is_dirty());
    }
}
