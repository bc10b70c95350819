use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use generational_arena::{Arena, Index};

use super::{animation::AnimationAsset, file_formats};
use crate::error::Result;

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub struct AnimationId(pub Index);
impl Into<Index> for AnimationId {
    fn into(self) -> Index {
        self.0
    }
}

struct Entry {
    asset: Arc<AnimationAsset>,
    path: Option<PathBuf>,
}

/// Loaded animations, shared by every character that uses them.
#[derive(Default)]
pub struct AnimationLibrary {
    assets: Arena<Entry>,
    by_path: HashMap<PathBuf, AnimationId>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the file once; later calls with the same path return the same id.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<AnimationId> {
        let path = path.as_ref().to_path_buf();
        if let Some(id) = self.by_path.get(&path) {
            if self.assets.contains(id.0) {
                return Ok(*id);
            }
        }
        let asset = file_formats::load_animation(&path)?;
        log::info!(
            "loaded animation {} ({} groups, {} keys)",
            path.display(),
            asset.groups().len(),
            asset.keys().len()
        );
        let id = AnimationId(self.assets.insert(Entry { asset: Arc::new(asset), path: Some(path.clone()) }));
        self.by_path.insert(path, id);
        Ok(id)
    }

    pub fn insert(&mut self, asset: AnimationAsset) -> AnimationId {
        AnimationId(self.assets.insert(Entry { asset: Arc::new(asset), path: None }))
    }

    pub fn get(&self, id: AnimationId) -> Option<Arc<AnimationAsset>> {
        self.assets.get(id.0).map(|e| e.asset.clone())
    }

    pub fn remove(&mut self, id: AnimationId) -> Option<Arc<AnimationAsset>> {
        let entry = self.assets.remove(id.0)?;
        if let Some(path) = &entry.path {
            self.by_path.remove(path);
        }
        Some(entry.asset)
    }

    /// Drops every animation no character holds any more. Returns how many were dropped.
    pub fn collect_unused(&mut self) -> usize {
        let unused: Vec<Index> = self
            .assets
            .iter()
            .filter(|(_, e)| Arc::strong_count(&e.asset) == 1)
            .map(|(idx, _)| idx)
            .collect();
        for idx in &unused {
            self.remove(AnimationId(*idx));
        }
        if !unused.is_empty() {
            log::debug!("dropped {} unused animations", unused.len());
        }
        unused.len()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_asset() -> AnimationAsset {
        AnimationAsset::new("empty", Vec::new(), Vec::new()).unwrap()
    }

    #[test]
    fn unused_assets_are_collected() {
        let mut library = AnimationLibrary::new();
        let kept = library.insert(empty_asset());
        let dropped = library.insert(empty_asset());
        let held = library.get(kept).unwrap();

        assert_eq!(library.collect_unused(), 1);
        assert!(library.get(dropped).is_none());
        assert!(library.get(kept).is_some());
        drop(held);
        assert_eq!(library.collect_unused(), 1);
        assert!(library.is_empty());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let mut library = AnimationLibrary::new();
        assert!(library.load("walk.fbx").is_err());
    }
}
