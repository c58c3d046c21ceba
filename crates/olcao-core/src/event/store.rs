use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{WorkflowEvent, WorkflowEventKind};

/// Almacenamiento de eventos append-only.
pub trait EventStore: Send {
    /// Agrega un evento a partir de su kind y devuelve el evento completo (con seq y ts).
    fn append_kind(&mut self, run_id: Uuid, kind: WorkflowEventKind) -> WorkflowEvent;
    /// Lista eventos de una corrida (orden ascendente por seq).
    fn list(&self, run_id: Uuid) -> Vec<WorkflowEvent>;
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    inner: HashMap<Uuid, Vec<WorkflowEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: WorkflowEventKind) -> WorkflowEvent {
        let events = self.inner.entry(run_id).or_default();
        let ev = WorkflowEvent { seq: events.len() as u64,
                                 run_id,
                                 kind,
                                 ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<WorkflowEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_per_run() {
        let mut store = InMemoryEventStore::default();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.append_kind(a, WorkflowEventKind::Report { message: "one".into() });
        store.append_kind(b, WorkflowEventKind::Report { message: "other".into() });
        let second = store.append_kind(a, WorkflowEventKind::RunCompleted { exit_status: 0 });
        assert_eq!(second.seq, 1);
        assert_eq!(store.list(a).len(), 2);
        assert_eq!(store.list(b)[0].seq, 0);
        assert!(store.list(Uuid::new_v4()).is_empty());
    }
}
