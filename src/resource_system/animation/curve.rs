use glam::Vec4;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Discriminants match the on-disk codes of the binary format.
#[derive(Serialize_repr, Deserialize_repr, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Interpolation {
    /// always returns the constant value
    None = 0,
    Step = 1,
    Quat = 2,
    Linear = 3,
}

impl Interpolation {
    /// Anything unrecognised reads as linear.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "none" => Interpolation::None,
            "step" => Interpolation::Step,
            "quat" => Interpolation::Quat,
            _ => Interpolation::Linear,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Interpolation::None => "none",
            Interpolation::Step => "step",
            Interpolation::Quat => "quat",
            Interpolation::Linear => "linear",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Interpolation::None),
            1 => Some(Interpolation::Step),
            2 => Some(Interpolation::Quat),
            3 => Some(Interpolation::Linear),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    interpolation: Interpolation,
    /// None = collapsed, the curve always yields `const_value`
    first_key_index: Option<usize>,
    const_value: Vec4,
    is_animated: bool,
}

impl Default for Curve {
    fn default() -> Self {
        Self {
            interpolation: Interpolation::Linear,
            first_key_index: None,
            const_value: Vec4::ZERO,
            is_animated: true,
        }
    }
}

impl Curve {
    pub fn new(interpolation: Interpolation, first_key_index: usize, is_animated: bool) -> Self {
        Self {
            interpolation,
            first_key_index: Some(first_key_index),
            const_value: Vec4::ZERO,
            is_animated,
        }
    }

    pub fn collapsed(interpolation: Interpolation, value: Vec4) -> Self {
        Self {
            interpolation,
            first_key_index: None,
            const_value: value,
            is_animated: false,
        }
    }

    pub fn with_const_value(mut self, value: Vec4) -> Self {
        self.const_value = value;
        self
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn first_key_index(&self) -> Option<usize> {
        self.first_key_index
    }

    pub fn is_collapsed(&self) -> bool {
        self.first_key_index.is_none()
    }

    pub fn const_value(&self) -> Vec4 {
        self.const_value
    }

    pub fn is_animated(&self) -> bool {
        self.is_animated
    }

    pub fn set_animated(&mut self, is_animated: bool) {
        self.is_animated = is_animated;
    }
}
