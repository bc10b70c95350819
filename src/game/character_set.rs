/// Clips an instance wants to play and their raw weights. Any change marks the set dirty so the
/// next animate call rebuilds the active state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterSet {
    clips: Vec<(String, f32)>,
    fade_in_time: f32,
    dirty: bool,
}

impl CharacterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the clip, or updates its weight when it is already in the set.
    pub fn add_clip(&mut self, name: impl Into<String>, weight: f32) {
        let name = name.into();
        match self.clips.iter_mut().find(|(n, _)| *n == name) {
            Some((_, w)) => *w = weight,
            None => self.clips.push((name, weight)),
        }
        self.dirty = true;
    }

    pub fn remove_clip(&mut self, name: &str) -> bool {
        let before = self.clips.len();
        self.clips.retain(|(n, _)| n != name);
        let removed = self.clips.len() != before;
        self.dirty |= removed;
        removed
    }

    pub fn clear_clips(&mut self) {
        self.clips.clear();
        self.dirty = true;
    }

    pub fn set_clip_weight(&mut self, name: &str, weight: f32) -> bool {
        match self.clips.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, w)) => {
                *w = weight;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn clips(&self) -> impl Iterator<Item = (&str, f32)> {
        self.clips.iter().map(|(n, w)| (n.as_str(), *w))
    }

    pub fn num_clips(&self) -> usize {
        self.clips.len()
    }

    pub fn weight_sum(&self) -> f32 {
        self.clips.iter().map(|(_, w)| w).sum()
    }

    pub fn fade_in_time(&self) -> f32 {
        self.fade_in_time
    }

    pub fn set_fade_in_time(&mut self, seconds: f32) {
        self.fade_in_time = seconds;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_mark_dirty() {
        let mut set = CharacterSet::new();
        assert!(!set.is_dirty());
        set.add_clip("walk", 0.5);
        assert!(set.is_dirty());
        set.set_dirty(false);
        assert!(!set.remove_clip("run"));
        assert!(!set.is_dirty());
        assert!(set.set_clip_weight("walk", 1.0));
        assert!(set.is_dirty());
    }

    #[test]
    fn re_adding_updates_weight() {
        let mut set = CharacterSet::new();
        set.add_clip("walk", 0.5);
        set.add_clip("run", 0.25);
        set.add_clip("walk", 0.75);
        assert_eq!(set.num_clips(), 2);
        assert_eq!(set.weight_sum(), 1.0);
        assert_eq!(set.clips().next(), Some(("walk", 0.75)));
    }
}
