use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::curve::Curve;

/// What happens when sample time leaves [0, duration)
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LoopType {
    Clamp = 0,
    Repeat = 1,
}

impl LoopType {
    /// Anything other than `repeat` reads as clamp.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "repeat" => LoopType::Repeat,
            _ => LoopType::Clamp,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            LoopType::Clamp => "clamp",
            LoopType::Repeat => "repeat",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(LoopType::Clamp),
            1 => Some(LoopType::Repeat),
            _ => None,
        }
    }
}

/// Pair of keys bracketing a sample time. Indices are already multiplied by the key stride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPosition {
    pub index0: usize,
    pub index1: usize,
    /// in [0, 1]
    pub fraction: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnimationGroup {
    pub curves: Vec<Curve>,
    pub start_key: i32,
    pub num_keys: usize,
    /// distance between two consecutive keys of one curve in the key pool
    pub key_stride: usize,
    /// seconds per key
    pub key_time: f32,
    /// informational, not used for blending
    pub fade_in_frames: f32,
    pub loop_type: LoopType,
}

impl Default for AnimationGroup {
    fn default() -> Self {
        Self {
            curves: Vec::new(),
            start_key: 0,
            num_keys: 0,
            key_stride: 0,
            key_time: 0.0,
            fade_in_frames: 0.0,
            loop_type: LoopType::Repeat,
        }
    }
}

impl AnimationGroup {
    pub fn num_curves(&self) -> usize {
        self.curves.len()
    }

    pub fn curve(&self, index: usize) -> Option<&Curve> {
        self.curves.get(index)
    }

    pub fn duration(&self) -> f32 {
        self.num_keys as f32 * self.key_time
    }

    pub fn time_to_index(&self, time: f32) -> KeyPosition {
        if self.num_keys == 0 || self.key_time <= 0.0 || !time.is_finite() {
            return KeyPosition { index0: 0, index1: 0, fraction: 0.0 };
        }
        let frame = time / self.key_time;
        let whole = frame.floor();
        // a tiny key time can push the frame to infinity
        let fraction = if frame.is_finite() { (frame - whole).clamp(0.0, 1.0) } else { 0.0 };
        // the cast saturates for huge times, keep the arithmetic saturating too
        let key0 = (whole as i64).saturating_sub(self.start_key as i64);
        let key1 = key0.saturating_add(1);
        let num_keys = self.num_keys as i64;

        let (key0, key1) = match self.loop_type {
            LoopType::Clamp => (key0.clamp(0, num_keys - 1), key1.clamp(0, num_keys - 1)),
            LoopType::Repeat => (key0.rem_euclid(num_keys), key1.rem_euclid(num_keys)),
        };

        KeyPosition {
            index0: key0 as usize * self.key_stride,
            index1: key1 as usize * self.key_stride,
            fraction,
        }
    }

    /// Whether `time` lies in [start, stop], honouring the loop policy. A repeating window may
    /// wrap around the end of the animation.
    pub fn is_inbetween(&self, time: f32, start: f32, stop: f32) -> bool {
        let duration = self.duration();
        match self.loop_type {
            LoopType::Repeat if duration > 0.0 => {
                let norm_start = start.rem_euclid(duration);
                let norm_stop = stop.rem_euclid(duration);
                if norm_start < norm_stop {
                    time >= norm_start && time <= norm_stop
                } else {
                    time >= norm_start || time <= norm_stop
                }
            }
            _ => time >= start && time <= stop,
        }
    }
}
