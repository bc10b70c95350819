use crossbeam_queue::SegQueue;

use super::{
    anim_state::AnimationState,
    clip::{AnimEvent, EventTrack},
};
use crate::resource_system::animation::CurveSource;

pub trait AnimEventHandler: Send + Sync {
    /// Called once per emitted event; `track.events[event_index]` is the blended event.
    fn handle_event(&self, track: &EventTrack, event_index: usize);
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEvent {
    pub track: String,
    pub event: AnimEvent,
}

/// Collects events from any thread, drain on the consuming side.
#[derive(Debug, Default)]
pub struct QueuedEventHandler {
    queue: SegQueue<EmittedEvent>,
}

impl QueuedEventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<EmittedEvent> {
        let mut events = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl AnimEventHandler for QueuedEventHandler {
    fn handle_event(&self, track: &EventTrack, event_index: usize) {
        if let Some(event) = track.events.get(event_index) {
            self.queue.push(EmittedEvent { track: track.name.clone(), event: *event });
        }
    }
}

/// Merges one weighted clip event into the output tracks. Events of the same track closer than
/// `epsilon` seconds accumulate translation and scale; the rotation of the first one is kept.
fn add_emit_event(out: &mut Vec<EventTrack>, track_name: &str, event: &AnimEvent, weight: f32, epsilon: f32) {
    let track_index = match out.iter().position(|t| t.name == track_name) {
        Some(index) => index,
        None => {
            out.push(EventTrack::new(track_name));
            out.len() - 1
        }
    };
    let track = &mut out[track_index];

    match track.events.iter_mut().find(|e| (e.time - event.time).abs() < epsilon) {
        Some(existing) => {
            existing.translation += event.translation * weight;
            existing.scale += event.scale * weight;
        }
        None => track.events.push(AnimEvent {
            time: event.time,
            translation: event.translation * weight,
            rotation: event.rotation,
            scale: event.scale * weight,
        }),
    }
}

/// Gathers the events of every weighted clip of `state` whose time falls into [from, to], both
/// given relative to the state. `out` is cleared first; track order is first-seen order.
pub fn collect_state_events(
    source: &dyn CurveSource,
    state: &AnimationState,
    from: f32,
    to: f32,
    epsilon: f32,
    out: &mut Vec<EventTrack>,
) {
    out.clear();
    for entry in state.clips() {
        if entry.weight <= 0.0 {
            continue;
        }
        let Some(group) = source.group(entry.clip.group_index()) else {
            log::debug!("clip '{}' has no group, its events are skipped", entry.clip.name());
            continue;
        };
        for track in entry.clip.event_tracks() {
            for event in &track.events {
                if group.is_inbetween(event.time, from, to) {
                    add_emit_event(out, &track.name, event, entry.weight, epsilon);
                }
            }
        }
    }
}
