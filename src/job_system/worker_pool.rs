use crossbeam::channel::Sender;

use crate::{error::AnimError, game::character::CharacterAnimator};

/// One frame of work for every character.
#[derive(Debug, Clone, Copy)]
pub struct FrameTask {
    pub frame_id: u32,
    /// time of the previous frame, events in (prev_time, time] are emitted
    pub prev_time: f32,
    pub time: f32,
    pub emit_events: bool,
}

#[derive(Debug)]
pub struct CharacterFailure {
    pub index: usize,
    pub error: AnimError,
}

fn worker_loop<C: AsMut<CharacterAnimator>>(
    first_index: usize,
    characters: &mut [C],
    task: FrameTask,
    failure_tx: Sender<CharacterFailure>,
) {
    for (offset, character) in characters.iter_mut().enumerate() {
        let character = character.as_mut();
        // a frame that was already evaluated has already emitted its events
        let result = character.evaluate_frame(task.frame_id, task.time).and_then(|evaluated| {
            if evaluated && task.emit_events {
                character.emit_anim_events(task.prev_time, task.time)?;
            }
            Ok(())
        });
        if let Err(error) = result {
            let _ = failure_tx.send(CharacterFailure { index: first_index + offset, error });
        }
    }
}

/// Evaluates `characters` on up to `workers` threads. Each character owns its sampling buffers,
/// so chunks are processed without any locking. Returns the characters that failed.
pub fn animate_characters<C>(characters: &mut [C], task: FrameTask, workers: usize) -> Vec<CharacterFailure>
where
    C: AsMut<CharacterAnimator> + Send,
{
    if characters.is_empty() {
        return Vec::new();
    }
    let workers = workers.clamp(1, characters.len());
    let chunk_size = characters.len().div_ceil(workers);
    let (failure_tx, failure_rx) = crossbeam::channel::unbounded::<CharacterFailure>();

    let scoped = crossbeam::thread::scope(|scope| {
        for (chunk_index, chunk) in characters.chunks_mut(chunk_size).enumerate() {
            let failure_tx = failure_tx.clone();
            scope.spawn(move |_| {
                worker_loop(chunk_index * chunk_size, chunk, task, failure_tx);
            });
        }
    });
    if scoped.is_err() {
        log::error!("an animation worker panicked");
    }
    drop(failure_tx);

    let mut failures: Vec<CharacterFailure> = failure_rx.try_iter().collect();
    failures.sort_by_key(|f| f.index);
    failures
}
