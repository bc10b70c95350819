pub mod asset;
pub mod curve;
pub mod group;

pub use asset::{AnimationAsset, CurveSource};
pub use curve::{Curve, Interpolation};
pub use group::{AnimationGroup, KeyPosition, LoopType};
