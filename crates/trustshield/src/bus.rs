use tokio::sync::broadcast;

use crate::events::AuditRecord;

#[derive(Clone)]
pub struct Bus {
    sender: broadcast::Sender<AuditRecord>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditRecord> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        record: AuditRecord,
    ) -> Result<usize, broadcast::error::SendError<AuditRecord>> {
        self.sender.send(record)
    }
}
