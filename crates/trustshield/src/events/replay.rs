//! Rebuilding scores and verdict sequences from an ordered event log.
//!
//! Replay is only exact while the log still holds every event of the
//! subjects involved; a bounded log that has dropped records replays from
//! the oldest retained state.

use std::collections::BTreeMap;

use super::event::AuditEvent;
use crate::gates::GateVerdict;
use crate::score::{clamp_score, ScoreReason, SubjectId};

/// Recomputes each subject's score by re-applying the requested deltas.
///
/// A subject starts from `initial(subject)`; `Baseline` events set the
/// score outright.
pub fn replay_scores(
    events: &[AuditEvent],
    initial: impl Fn(&SubjectId) -> u8,
) -> BTreeMap<SubjectId, u8> {
    let mut scores = BTreeMap::new();
    for event in events {
        if let AuditEvent::ScoreChanged {
            subject_id,
            reason,
            delta,
            score_after,
            ..
        } = event
        {
            let next = if *reason == ScoreReason::Baseline {
                *score_after
            } else {
                let current = scores
                    .get(subject_id)
                    .copied()
                    .unwrap_or_else(|| initial(subject_id));
                clamp_score(current, *delta)
            };
            scores.insert(subject_id.clone(), next);
        }
    }
    scores
}

/// Gate verdicts recorded for `subject`, in invocation order.
pub fn verdict_trace(events: &[AuditEvent], subject: &SubjectId) -> Vec<GateVerdict> {
    events
        .iter()
        .filter_map(|event| match event {
            AuditEvent::GateDecided {
                subject_id,
                verdict,
                ..
            } if subject_id == subject => Some(*verdict),
            _ => None,
        })
        .collect()
}
