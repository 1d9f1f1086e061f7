//! Events emitted after the store has confirmed a write.

use procure_types::{
    CriterionId, ProjectId, ScoreId, ScoreValue, UserId, VendorId, VendorStatus,
};
use tokio::sync::broadcast;

/// Something the engine persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationEvent {
    VendorRegistered {
        project_id: ProjectId,
        vendor_id: VendorId,
        by: UserId,
    },

    StatusChanged {
        project_id: ProjectId,
        vendor_id: VendorId,
        from: VendorStatus,
        to: VendorStatus,
        by: UserId,
    },

    VendorArchived {
        project_id: ProjectId,
        vendor_id: VendorId,
        by: UserId,
    },

    ScoreSaved {
        project_id: ProjectId,
        score_id: ScoreId,
        vendor_id: VendorId,
        criterion_id: CriterionId,
        evaluator_id: UserId,
        value: ScoreValue,
    },

    ScoresSubmitted {
        project_id: ProjectId,
        vendor_id: VendorId,
        evaluator_id: UserId,
        count: usize,
    },

    ConsensusRecorded {
        project_id: ProjectId,
        vendor_id: VendorId,
        criterion_id: CriterionId,
        value: ScoreValue,
        by: UserId,
        /// `true` when an existing consensus was overwritten.
        revised: bool,
    },
}

/// Fan-out of engine events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<EvaluationEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EvaluationEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: EvaluationEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_emitted_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        bus.emit(EvaluationEvent::VendorArchived {
            project_id: ProjectId::new("p1"),
            vendor_id: VendorId::new("v1"),
            by: UserId::new("u1"),
        });
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, EvaluationEvent::VendorArchived { .. }));
    }

    #[test]
    fn emitting_without_subscribers_is_silent() {
        EventBus::new(0).emit(EvaluationEvent::ScoresSubmitted {
            project_id: ProjectId::new("p1"),
            vendor_id: VendorId::new("v1"),
            evaluator_id: UserId::new("e1"),
            count: 0,
        });
    }
}
