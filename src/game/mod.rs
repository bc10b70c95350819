pub mod anim_events;
pub mod anim_state;
pub mod blend;
pub mod character;
pub mod character_set;
pub mod clip;
pub mod skeleton;
pub mod template;
