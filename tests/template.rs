mod common;

use std::sync::Arc;

use character_anim::{AnimError, ClipKind};
use common::*;
use glam::Vec3;

#[test]
fn instances_start_on_the_first_clip() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instance = template.create_instance().unwrap();

    let state = instance.character.active_state();
    assert_eq!(state.num_clips(), 1);
    assert_eq!(state.clip(0).unwrap().name(), "walk");
    assert_eq!(state.clip_weight(0), Some(1.0));
    assert!(instance.character.template().is_some());

    assert!(template.animate(&mut instance, 1, 0.25).unwrap());
    let root = instance.character.skeleton().joint(0).unwrap().translate();
    assert_eq!(root, Vec3::new(root_x(WALK, 1), 0.0, 0.0));
}

#[test]
fn animate_runs_once_per_frame() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instance = template.create_instance().unwrap();

    assert!(template.animate(&mut instance, 3, 0.25).unwrap());
    assert!(!template.animate(&mut instance, 3, 0.5).unwrap());
    assert!(template.animate(&mut instance, 4, 0.5).unwrap());
}

#[test]
fn clip_set_weights_are_normalised() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instance = template.create_instance().unwrap();

    instance.clip_set.add_clip("walk", 1.0);
    instance.clip_set.add_clip("run", 3.0);
    instance.clip_set.set_fade_in_time(0.2);
    template.animate(&mut instance, 1, 2.0).unwrap();

    assert!(!instance.clip_set.is_dirty());
    let state = instance.character.active_state();
    assert_eq!(state.clip_weight(0), Some(0.25));
    assert_eq!(state.clip_weight(1), Some(0.75));
    assert_eq!(state.state_started(), 2.0);
    assert_eq!(state.fade_in_time(), 0.2);
    assert_eq!(instance.character.previous_state().clip(0).unwrap().name(), "walk");
}

#[test]
fn weightless_clip_set_clears_the_state() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instance = template.create_instance().unwrap();

    instance.clip_set.add_clip("walk", 0.0);
    template.animate(&mut instance, 1, 0.5).unwrap();
    assert!(!instance.character.active_state().is_valid());
}

#[test]
fn unknown_clip_names_are_errors() {
    let asset = Arc::new(biped_asset());
    let template = Arc::new(biped_template(&asset));
    let mut instance = template.create_instance().unwrap();

    instance.clip_set.add_clip("swim", 1.0);
    match template.animate(&mut instance, 1, 0.0) {
        Err(AnimError::UnknownClip(name)) => assert_eq!(name, "swim"),
        other => panic!("expected an unknown clip error, got {:?}", other.map(|_| ())),
    }
    assert!(instance.clip_set.is_dirty());
}

#[test]
fn clip_table_queries() {
    let asset = Arc::new(biped_asset());
    let mut template = biped_template(&asset);
    assert_eq!(template.clip_index_by_name("run"), Some(1));
    assert_eq!(template.clip_duration(1), Some(1.0));
    assert_eq!(template.joint_by_name("spine"), Some(1));

    let base = template.add_clip("baseClip", IDLE).unwrap();
    assert_eq!(template.clips()[base].kind(), ClipKind::BasePose);
    assert!(matches!(template.add_clip("ghost", 7), Err(AnimError::GroupOutOfRange { index: 7, .. })));
    assert!(matches!(
        template.add_event_track(42, character_anim::EventTrack::new("Footstep")),
        Err(AnimError::ClipOutOfRange { index: 42, .. })
    ));
}

#[test]
fn disabled_template_freezes_instances() {
    let asset = Arc::new(biped_asset());
    let mut template = biped_template(&asset);
    template.set_anim_enabled(false);
    let template = Arc::new(template);
    let mut instance = template.create_instance().unwrap();

    template.animate(&mut instance, 1, 0.5).unwrap();
    assert!(!instance.character.is_anim_enabled());
    assert_eq!(instance.character.skeleton().joint(0).unwrap().translate(), Vec3::ZERO);
}
