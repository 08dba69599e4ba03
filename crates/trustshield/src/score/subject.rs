use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::SystemTime;

use parking_lot::Mutex;

use crate::events::{AuditEvent, AuditSink};
use crate::score::{ScoreEvent, ScoreReason, SubjectId, MAX_SCORE, MIN_SCORE};

pub fn clamp_score(current: u8, delta: i32) -> u8 {
    let next = i64::from(current) + i64::from(delta);
    next.clamp(i64::from(MIN_SCORE), i64::from(MAX_SCORE)) as u8
}

/// One tracked score.
///
/// Readers load the published value without locking. Writers hold the
/// history lock across read, clamp, record and publish, so other readers
/// never observe an unclamped value and events are recorded in apply order.
#[derive(Debug)]
pub struct Subject {
    id: SubjectId,
    score: AtomicU8,
    history: Mutex<VecDeque<ScoreEvent>>,
    history_limit: usize,
}

impl Subject {
    pub fn new(id: SubjectId, initial: u8, history_limit: usize) -> Self {
        Self {
            id,
            score: AtomicU8::new(initial.min(MAX_SCORE)),
            history: Mutex::new(VecDeque::new()),
            history_limit: history_limit.max(1),
        }
    }

    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    pub fn score(&self) -> u8 {
        self.score.load(Ordering::Acquire)
    }

    pub fn apply(&self, delta: i32, reason: ScoreReason, sink: &dyn AuditSink) -> ScoreEvent {
        let mut history = self.history.lock();
        let current = self.score.load(Ordering::Acquire);
        let next = clamp_score(current, delta);
        self.commit(&mut history, current, next, delta, reason, sink)
    }

    /// Sets the score outright, recording the jump as one event.
    pub fn reset(&self, score: u8, reason: ScoreReason, sink: &dyn AuditSink) -> ScoreEvent {
        let mut history = self.history.lock();
        let current = self.score.load(Ordering::Acquire);
        let next = score.min(MAX_SCORE);
        let delta = i32::from(next) - i32::from(current);
        self.commit(&mut history, current, next, delta, reason, sink)
    }

    pub fn history(&self) -> Vec<ScoreEvent> {
        self.history.lock().iter().cloned().collect()
    }

    fn commit(
        &self,
        history: &mut VecDeque<ScoreEvent>,
        current: u8,
        next: u8,
        delta: i32,
        reason: ScoreReason,
        sink: &dyn AuditSink,
    ) -> ScoreEvent {
        let event = ScoreEvent {
            subject_id: self.id.clone(),
            delta,
            applied: i32::from(next) - i32::from(current),
            reason,
            score_after: next,
            timestamp: SystemTime::now(),
        };
        self.score.store(next, Ordering::Release);
        history.push_back(event.clone());
        while history.len() > self.history_limit {
            history.pop_front();
        }
        sink.record(AuditEvent::score_changed(&event));
        event
    }
}
