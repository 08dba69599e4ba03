//! Bounded in-memory audit log and the sink seam that feeds it.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::bus::Bus;
use crate::events::event::AuditEvent;

/// Receives every scoring event and gate verdict.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// An audit event stamped with its position in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub seq: u64,
    pub event: AuditEvent,
}

#[derive(Debug, Default)]
struct LogInner {
    next_seq: u64,
    records: VecDeque<AuditRecord>,
}

/// Keeps the newest `capacity` records; older ones are dropped.
#[derive(Debug)]
pub struct MemoryAuditLog {
    inner: Mutex<LogInner>,
    capacity: usize,
}

impl MemoryAuditLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(LogInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn append(&self, event: AuditEvent) -> AuditRecord {
        self.append_then(event, |_| {})
    }

    /// Appends and runs `after` before releasing the log lock, so anything
    /// `after` forwards sees records in sequence order.
    pub fn append_then(&self, event: AuditEvent, after: impl FnOnce(&AuditRecord)) -> AuditRecord {
        let mut inner = self.inner.lock();
        let record = AuditRecord {
            seq: inner.next_seq,
            event,
        };
        inner.next_seq += 1;
        inner.records.push_back(record.clone());
        while inner.records.len() > self.capacity {
            inner.records.pop_front();
        }
        after(&record);
        record
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// The newest `limit` records, oldest first.
    pub fn tail(&self, limit: usize) -> Vec<AuditRecord> {
        let inner = self.inner.lock();
        let skip = inner.records.len().saturating_sub(limit);
        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Records with `seq >= seq`, oldest first.
    pub fn since(&self, seq: u64) -> Vec<AuditRecord> {
        self.inner
            .lock()
            .records
            .iter()
            .filter(|record| record.seq >= seq)
            .cloned()
            .collect()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.inner
            .lock()
            .records
            .iter()
            .map(|record| record.event.clone())
            .collect()
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, event: AuditEvent) {
        self.append(event);
    }
}

/// Fans records out to the memory log and the broadcast bus.
#[derive(Clone)]
pub struct AuditTrail {
    log: Arc<MemoryAuditLog>,
    bus: Bus,
}

impl AuditTrail {
    pub fn new(log: Arc<MemoryAuditLog>, bus: Bus) -> Self {
        Self { log, bus }
    }

    pub fn log(&self) -> &Arc<MemoryAuditLog> {
        &self.log
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

impl AuditSink for AuditTrail {
    fn record(&self, event: AuditEvent) {
        self.log.append_then(event, |record| {
            // No subscribers is fine.
            let _ = self.bus.publish(record.clone());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::{GateVerdict, HoneypotVerdict};
    use crate::score::SubjectId;

    fn make_event() -> AuditEvent {
        AuditEvent::gate(
            &SubjectId::global(),
            GateVerdict::Honeypot(HoneypotVerdict::Triggered),
        )
    }

    #[test]
    fn new_log_is_empty() {
        let log = MemoryAuditLog::new(8);
        assert!(log.is_empty());
        assert!(log.tail(10).is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let log = MemoryAuditLog::new(8);
        let ids: Vec<_> = (0..3)
            .map(|_| {
                let event = make_event();
                let id = event.id();
                log.append(event);
                id
            })
            .collect();
        let recorded: Vec<_> = log.events().iter().map(AuditEvent::id).collect();
        assert_eq!(recorded, ids);
    }

    #[test]
    fn capacity_drops_oldest() {
        let log = MemoryAuditLog::new(2);
        for _ in 0..5 {
            log.append(make_event());
        }
        let seqs: Vec<u64> = log.tail(10).iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![3, 4]);
    }

    #[test]
    fn tail_and_since() {
        let log = MemoryAuditLog::new(16);
        for _ in 0..5 {
            log.append(make_event());
        }
        assert_eq!(log.tail(2).iter().map(|r| r.seq).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(log.since(3).len(), 2);
        assert!(log.since(100).is_empty());
        assert_eq!(log.since(0).len(), 5);
    }

    #[tokio::test]
    async fn trail_publishes_to_bus() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let trail = AuditTrail::new(Arc::new(MemoryAuditLog::new(8)), bus);

        trail.record(make_event());

        let received = rx.recv().await.expect("recv");
        assert_eq!(received.seq, 0);
        assert_eq!(trail.log().len(), 1);
    }
}
