//! Routes chain events to the module they are addressed to.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use cellsim_core::config::ChainSettings;

use crate::error::ChainError;
use crate::event::{ChainEvent, ModuleName, TransmissionOutcome};
use crate::modules::{
    ChainContext, ChainModule, DownstreamModule, GeocasterModule, UpstreamModule,
};
use crate::region::RegionRegistry;
use crate::scheduler::EventScheduler;

/// Maps module names to modules and dispatches addressed events.
pub struct ChainManager {
    modules: HashMap<ModuleName, Arc<dyn ChainModule>>,
}

impl ChainManager {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Build the standard three-stage chain and its outcome channel.
    ///
    /// The receiver half carries acknowledgments and failure reports
    /// back to whatever injected the messages.
    pub fn standard(
        registry: Arc<RegionRegistry>,
        scheduler: Arc<dyn EventScheduler>,
        settings: ChainSettings,
    ) -> (Self, mpsc::UnboundedReceiver<TransmissionOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let ctx = Arc::new(ChainContext {
            registry,
            scheduler,
            outcomes: outcome_tx,
            settings,
        });

        let mut manager = Self::new();
        manager.register(Arc::new(UpstreamModule::new(ctx.clone())));
        manager.register(Arc::new(GeocasterModule::new(ctx.clone())));
        manager.register(Arc::new(DownstreamModule::new(ctx)));
        (manager, outcome_rx)
    }

    /// Register a module under its own name. Re-registering a name
    /// replaces the previous module.
    pub fn register(&mut self, module: Arc<dyn ChainModule>) {
        let name = module.name();
        tracing::info!(module = %name, "chain module registered");
        self.modules.insert(name, module);
    }

    /// Dispatch an event to the module it is addressed to. An address
    /// with no registered module is a wiring bug and fails the run.
    pub fn dispatch(&self, event: ChainEvent) -> Result<(), ChainError> {
        let module = self
            .modules
            .get(&event.target)
            .ok_or(ChainError::UnknownModule(event.target))?;
        module.handle(event)
    }
}

impl Default for ChainManager {
    fn default() -> Self {
        Self::new()
    }
}
