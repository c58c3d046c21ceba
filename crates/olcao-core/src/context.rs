//! Contexto explícito del plugin: configuración, registry y log de eventos.
//!
//! Se abre al arrancar el programa y se cierra al final. Usarlo cerrado es
//! un `ContextError::Closed`.
use uuid::Uuid;

use crate::config::OlcaoConfig;
use crate::errors::ContextError;
use crate::event::{EventStore, InMemoryEventStore, WorkflowEvent, WorkflowEventKind};
use crate::registry::PluginRegistry;

pub struct PluginContext {
    config: OlcaoConfig,
    registry: PluginRegistry,
    events: Box<dyn EventStore>,
    open: bool,
}

impl PluginContext {
    pub fn open(config: OlcaoConfig, registry: PluginRegistry) -> Self {
        Self::with_store(config, registry, Box::new(InMemoryEventStore::default()))
    }

    pub fn with_store(config: OlcaoConfig, registry: PluginRegistry, events: Box<dyn EventStore>) -> Self {
        log::debug!("plugin context opened ({} capabilities)", registry.entries().len());
        Self { config,
               registry,
               events,
               open: true }
    }

    pub fn ensure_open(&self) -> Result<(), ContextError> {
        if self.open {
            Ok(())
        } else {
            Err(ContextError::Closed)
        }
    }

    pub fn close(&mut self) -> Result<(), ContextError> {
        self.ensure_open()?;
        self.open = false;
        log::debug!("plugin context closed");
        Ok(())
    }

    pub fn config(&self) -> Result<&OlcaoConfig, ContextError> {
        self.ensure_open()?;
        Ok(&self.config)
    }

    pub fn registry(&self) -> Result<&PluginRegistry, ContextError> {
        self.ensure_open()?;
        Ok(&self.registry)
    }

    pub fn append_event(&mut self, run_id: Uuid, kind: WorkflowEventKind) -> Result<WorkflowEvent, ContextError> {
        self.ensure_open()?;
        Ok(self.events.append_kind(run_id, kind))
    }

    /// Eventos de una corrida. Legible aún cerrado, para inspección final.
    pub fn events(&self, run_id: Uuid) -> Vec<WorkflowEvent> {
        self.events.list(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_context_rejects_use() {
        let mut ctx = PluginContext::open(OlcaoConfig::default(), PluginRegistry::new());
        let run = Uuid::new_v4();
        ctx.append_event(run, WorkflowEventKind::Report { message: "hi".into() }).unwrap();
        ctx.close().unwrap();
        assert_eq!(ctx.close(), Err(ContextError::Closed));
        assert!(ctx.config().is_err());
        assert_eq!(ctx.append_event(run, WorkflowEventKind::RunCompleted { exit_status: 0 }).unwrap_err(),
                   ContextError::Closed);
        assert_eq!(ctx.events(run).len(), 1);
    }
}
