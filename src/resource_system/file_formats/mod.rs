pub mod characterfile;
pub mod nanim2;
pub mod nax2;

use std::path::Path;

use crate::{
    error::{AnimError, Result},
    resource_system::animation::AnimationAsset,
};

/// Upper bound for buffers sized from counts read out of a file; larger files grow as they are read.
pub(crate) const MAX_PREALLOC: usize = 1 << 16;

/// Loads an animation, picking the format from the file extension.
pub fn load_animation<P: AsRef<Path>>(path: P) -> Result<AnimationAsset> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("nax2") => nax2::load(path),
        Some("nanim2") => nanim2::load(path),
        _ => Err(AnimError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn save_animation<P: AsRef<Path>>(asset: &AnimationAsset, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("nax2") => nax2::save(asset, path),
        Some("nanim2") => nanim2::save(asset, path),
        _ => Err(AnimError::UnsupportedFormat(path.display().to_string())),
    }
}
