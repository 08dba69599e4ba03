use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::config::{ScoreSettings, SessionSettings};
use crate::events::AuditSink;
use crate::score::{ScoreEvent, ScoreReason, Subject, SubjectId};

/// Owns every subject and applies deltas to them.
///
/// The global subject lives for the whole process; session subjects share
/// the session idle expiry and `max_sessions` capacity. An evicted session
/// subject comes back at `initial_session`, the same as after a logout.
pub struct ScoreAggregator {
    global: Arc<Subject>,
    sessions: Cache<SubjectId, Arc<Subject>>,
    initial_session: u8,
    history_limit: usize,
    sink: Arc<dyn AuditSink>,
}

impl ScoreAggregator {
    pub fn new(
        scores: &ScoreSettings,
        sessions: &SessionSettings,
        sink: Arc<dyn AuditSink>,
    ) -> Self {
        let cache = Cache::builder()
            .max_capacity(sessions.max_sessions.max(1))
            .time_to_idle(Duration::from_secs(sessions.idle_seconds.max(1)))
            .build();
        Self {
            global: Arc::new(Subject::new(
                SubjectId::global(),
                scores.initial_global,
                scores.history_limit,
            )),
            sessions: cache,
            initial_session: scores.initial_session,
            history_limit: scores.history_limit,
            sink,
        }
    }

    pub fn global(&self) -> &Arc<Subject> {
        &self.global
    }

    pub fn subject(&self, id: &SubjectId) -> Arc<Subject> {
        if id.is_global() {
            return self.global.clone();
        }
        self.sessions.get_with(id.clone(), || {
            Arc::new(Subject::new(id.clone(), self.initial_session, self.history_limit))
        })
    }

    /// Applies `delta` and returns the clamped score.
    pub fn apply_delta(&self, id: &SubjectId, delta: i32, reason: ScoreReason) -> u8 {
        self.apply(id, delta, reason).score_after
    }

    pub fn apply(&self, id: &SubjectId, delta: i32, reason: ScoreReason) -> ScoreEvent {
        let event = self.subject(id).apply(delta, reason, self.sink.as_ref());
        tracing::debug!(
            "score {} {:+} ({:?}) -> {}",
            event.subject_id,
            event.applied,
            reason,
            event.score_after
        );
        event
    }

    /// Returns a session subject to its starting score.
    pub fn rebaseline(&self, id: &SubjectId) -> ScoreEvent {
        self.subject(id)
            .reset(self.initial_session, ScoreReason::Baseline, self.sink.as_ref())
    }

    pub fn score(&self, id: &SubjectId) -> u8 {
        if id.is_global() {
            return self.global.score();
        }
        self.sessions
            .get(id)
            .map(|subject| subject.score())
            .unwrap_or(self.initial_session)
    }

    pub fn global_score(&self) -> u8 {
        self.global.score()
    }

    pub fn history(&self, id: &SubjectId) -> Vec<ScoreEvent> {
        if id.is_global() {
            return self.global.history();
        }
        self.sessions
            .get(id)
            .map(|subject| subject.history())
            .unwrap_or_default()
    }
}
