use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use character_anim::{
    job_system::worker_pool::{animate_characters, FrameTask},
    resource_system::file_formats::characterfile::CharacterFile,
    AnimEvent, AnimSettings, AnimationAsset, AnimationGroup, AnimationLibrary, CharacterInstance, CharacterTemplate,
    Curve, EventTrack, Interpolation, LoopType, QueuedEventHandler, Skeleton,
};
use clap::Parser;
use glam::{Quat, Vec3, Vec4};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser)]
#[command(name = "testbed")]
#[command(about = "Animates a crowd of characters and reports footsteps")]
struct Cli {
    /// Number of characters
    #[arg(short, long, default_value_t = 1000)]
    characters: usize,

    /// Simulated seconds
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f32,

    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// JSON file overriding the animation settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Character description to animate instead of the built-in leg rig
    #[arg(long)]
    character: Option<PathBuf>,
}

const KEY_TIME: f32 = 1.0 / 30.0;
const CYCLE_KEYS: usize = 30;

/// Hip, knee and foot swinging around x. `speed` scales the stride length and swing.
fn gait_keys(keys: &mut Vec<Vec4>, speed: f32) -> usize {
    let first = keys.len();
    for k in 0..CYCLE_KEYS {
        let phase = k as f32 / CYCLE_KEYS as f32 * std::f32::consts::TAU;
        let swing = phase.sin() * 0.4 * speed;
        keys.push(Vec4::new(0.0, 1.0 + (phase * 2.0).cos().abs() * 0.05 * speed, k as f32 * 0.05 * speed, 0.0));
        keys.push(Vec4::from(Quat::from_rotation_x(swing)));
        keys.push(Vec4::from(Quat::from_rotation_x(-swing.abs() * 0.8)));
    }
    first
}

fn leg_curves(first_key: Option<usize>) -> Vec<Curve> {
    let joint = |translation: Vec4| {
        [
            Curve::collapsed(Interpolation::Linear, translation),
            Curve::collapsed(Interpolation::Quat, Vec4::W),
            Curve::collapsed(Interpolation::Linear, Vec4::new(1.0, 1.0, 1.0, 0.0)),
        ]
    };
    let mut curves: Vec<Curve> = [
        joint(Vec4::new(0.0, 1.0, 0.0, 0.0)),
        joint(Vec4::new(0.0, -0.5, 0.0, 0.0)),
        joint(Vec4::new(0.0, -0.5, 0.0, 0.0)),
    ]
    .concat();
    if let Some(first) = first_key {
        curves[0] = Curve::new(Interpolation::Linear, first, true);
        curves[1] = Curve::new(Interpolation::Quat, first + 1, true);
        curves[4] = Curve::new(Interpolation::Quat, first + 2, true);
    }
    curves
}

fn leg_template(settings: AnimSettings) -> Result<CharacterTemplate> {
    let mut keys = Vec::new();
    let mut groups = Vec::new();
    for speed in [1.0, 2.0] {
        let first = gait_keys(&mut keys, speed);
        groups.push(AnimationGroup {
            curves: leg_curves(Some(first)),
            num_keys: CYCLE_KEYS,
            key_stride: 3,
            key_time: KEY_TIME,
            loop_type: LoopType::Repeat,
            ..Default::default()
        });
    }
    groups.push(AnimationGroup {
        curves: leg_curves(None),
        num_keys: 1,
        key_stride: 1,
        key_time: KEY_TIME,
        loop_type: LoopType::Clamp,
        ..Default::default()
    });
    let asset = AnimationAsset::new("leg", groups, keys)?;

    let mut skeleton = Skeleton::with_capacity(3);
    let hip = skeleton.add_joint("hip", None, Vec3::Y, Quat::IDENTITY, Vec3::ONE)?;
    let knee = skeleton.add_joint("knee", Some(hip), Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, Vec3::ONE)?;
    skeleton.add_joint("foot", Some(knee), Vec3::new(0.0, -0.5, 0.0), Quat::IDENTITY, Vec3::ONE)?;

    let mut template = CharacterTemplate::new(skeleton, Arc::new(asset), settings)?;
    let cycle = CYCLE_KEYS as f32 * KEY_TIME;
    for (name, group) in [("walk", 0), ("run", 1), ("idle", 2)] {
        let index = template.add_clip(name, group)?;
        if name != "idle" {
            let mut step = AnimEvent::new(0.0);
            step.translation = Vec3::new(0.0, 0.0, 1.0);
            let mut other = step;
            other.time = cycle * 0.5;
            template.add_event_track(index, EventTrack::with_events("Footstep", vec![step, other]))?;
        }
    }
    Ok(template)
}

/// Cycles every character through the template's clips, shifted by its index.
fn pick_clip_set(instance: &mut CharacterInstance, clip_names: &[String], index: usize, second: usize) {
    instance.clip_set.clear_clips();
    instance.clip_set.add_clip(clip_names[(second + index) % clip_names.len()].as_str(), 1.0);
    instance.clip_set.set_fade_in_time(0.3);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => AnimSettings::from_json_file(path).with_context(|| format!("reading {}", path.display()))?,
        None => AnimSettings::default(),
    };
    let workers = settings.worker_threads;

    let mut library = AnimationLibrary::new();
    let template = match &cli.character {
        Some(path) => {
            let file = CharacterFile::load(path).with_context(|| format!("reading {}", path.display()))?;
            let base_dir = path.parent().unwrap_or(Path::new("."));
            CharacterTemplate::from_file(&file, base_dir, &mut library, settings)?
        }
        None => leg_template(settings)?,
    };
    let template = Arc::new(template);
    log::info!("{} joints, {} clips", template.num_joints(), template.clips().len());
    let clip_names: Vec<String> = template.clips().iter().map(|c| c.name().to_string()).collect();
    if clip_names.is_empty() {
        bail!("the character has no clips");
    }

    let footsteps = Arc::new(QueuedEventHandler::new());
    let mut crowd = Vec::with_capacity(cli.characters);
    for _ in 0..cli.characters {
        let mut instance = template.create_instance()?;
        instance.character.set_anim_event_handler(&footsteps);
        crowd.push(instance);
    }

    let dt = 1.0 / cli.fps;
    let frames = (cli.seconds * cli.fps) as u32;
    let mut prev_time = 0.0;
    let mut second = usize::MAX;
    let started = Instant::now();
    for frame_id in 0..frames {
        let time = frame_id as f32 * dt;
        if time as usize != second {
            second = time as usize;
            for (index, instance) in crowd.iter_mut().enumerate() {
                pick_clip_set(instance, &clip_names, index, second);
                template.apply_clip_set(instance, time)?;
            }
        }

        let task = FrameTask { frame_id, prev_time, time, emit_events: frame_id > 0 };
        for failure in animate_characters(&mut crowd, task, workers) {
            log::warn!("character {} failed: {}", failure.index, failure.error);
        }
        prev_time = time;

        let events = footsteps.drain();
        if !events.is_empty() {
            let strongest = events.iter().map(|e| e.event.translation.length()).fold(0.0, f32::max);
            log::debug!("frame {frame_id}: {} footsteps, strongest {strongest:.2}", events.len());
        }
        if frame_id % (cli.fps as u32).max(1) == 0 {
            log::info!("t={time:.1}s {} footsteps", events.len());
        }
    }

    let elapsed = started.elapsed();
    log::info!(
        "{} characters x {frames} frames in {:.2?} ({:.2?} per frame)",
        crowd.len(),
        elapsed,
        elapsed / frames.max(1)
    );
    Ok(())
}
