use std::sync::mpsc;

use crate::{EngineEvent, EventKind, RequestId};

/// Receives human-readable progress messages. Reporting never affects control flow.
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Forwards progress to the engine's event channel, tagged with the request id.
pub struct ChannelProgressSink {
    request_id: RequestId,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(request_id: RequestId, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { request_id, tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn report(&self, message: &str) {
        let _ = self.tx.send(EngineEvent {
            request_id: self.request_id,
            kind: EventKind::Progress(message.to_string()),
        });
    }
}
