pub mod config;
pub mod error;
pub mod game;
pub mod job_system;
pub mod resource_system;

pub use config::AnimSettings;
pub use error::{AnimError, Result};
pub use game::{
    anim_events::{AnimEventHandler, EmittedEvent, QueuedEventHandler},
    anim_state::AnimationState,
    character::CharacterAnimator,
    character_set::CharacterSet,
    clip::{AnimEvent, AnimationClip, ClipKind, EventTrack},
    skeleton::{Skeleton, SkeletonSink},
    template::{CharacterInstance, CharacterTemplate},
};
pub use resource_system::{
    animation::{AnimationAsset, AnimationGroup, Curve, CurveSource, Interpolation, LoopType},
    library::{AnimationId, AnimationLibrary},
};
