//! Wires the recipe engine for one tenant.
//!
//! [`RecipeHost`] builds every component from an [`OrchardConfig`]: the
//! folder queue and result ledger under the application data directory, the
//! tenant's settings and shell descriptor, the handler registry with the built-in
//! handlers, and a task engine whose bus routes `ExecuteWork` tasks to the
//! scheduler.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{debug, info};

use crate::config::OrchardConfig;
use crate::error::Result;
use crate::execution::{
    ExecutionId, RecipeExecutor, RecipeManager, RecipeScheduler, RecipeStepExecutor,
};
use crate::handlers::{ActivateShellStep, FeatureStep, HandlerRegistry, StepHandler};
use crate::ledger::{RecipeResult, RecipeResultAccessor, StepResultLedger};
use crate::queue::{FolderStepQueue, StepQueue};
use crate::recipe::{Recipe, RecipeHarvester};
use crate::tasks::{TaskBus, TaskProcessingEngine};
use crate::tenant::settings::{self, SharedShellSettings};
use crate::tenant::{
    EventBus, ShellDescriptor, ShellDescriptorManager, ShellEventHandler, ShellSettingsStore,
    TenantState,
};

/// Records shell reload requests raised by the engine.
///
/// Stands in for the multi-tenant host, which would rebuild the shell.
#[derive(Debug, Default)]
pub struct ShellReloadTracker {
    reloads: Mutex<Vec<(String, u64)>>,
}

impl ShellReloadTracker {
    /// `(tenant, serial)` pairs in the order they were requested.
    pub fn reloads(&self) -> Vec<(String, u64)> {
        self.reloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn count(&self) -> usize {
        self.reloads.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ShellEventHandler for ShellReloadTracker {
    fn shell_descriptor_changed(
        &self,
        descriptor: &ShellDescriptor,
        tenant: &str,
    ) -> anyhow::Result<()> {
        debug!(
            "Shell reload requested for tenant '{}' at serial {}",
            tenant, descriptor.serial_number
        );
        self.reloads
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((tenant.to_string(), descriptor.serial_number));
        Ok(())
    }
}

/// Every engine component for one tenant, wired together.
pub struct RecipeHost {
    project_root: PathBuf,
    app_data: PathBuf,
    config: OrchardConfig,
    settings: SharedShellSettings,
    settings_store: Arc<ShellSettingsStore>,
    events: Arc<EventBus>,
    queue: Arc<FolderStepQueue>,
    ledger: Arc<StepResultLedger>,
    descriptors: Arc<ShellDescriptorManager>,
    engine: Arc<TaskProcessingEngine>,
    bus: TaskBus,
    scheduler: Arc<RecipeScheduler>,
    manager: Arc<RecipeManager>,
    executor: RecipeExecutor,
    reloads: Arc<ShellReloadTracker>,
}

impl RecipeHost {
    /// Open the host with the built-in handlers.
    pub fn open(project_root: &Path, config: &OrchardConfig) -> Result<Self> {
        Self::open_with_handlers(project_root, config, Vec::new())
    }

    /// Open the host with additional step handlers.
    ///
    /// Extra handlers are registered after the built-in ones and may not
    /// claim their names.
    pub fn open_with_handlers(
        project_root: &Path,
        config: &OrchardConfig,
        extra_handlers: Vec<Box<dyn StepHandler>>,
    ) -> Result<Self> {
        let app_data = config.app_data_dir(project_root);
        debug!("Opening recipe host in {}", app_data.display());

        let events = Arc::new(EventBus::new());
        let reloads = Arc::new(ShellReloadTracker::default());
        events.subscribe_shell(reloads.clone());

        let settings_store = Arc::new(ShellSettingsStore::for_tenant(&app_data, &config.tenant));
        let settings: SharedShellSettings =
            Arc::new(RwLock::new(settings_store.load(&config.tenant)?));
        let queue = Arc::new(FolderStepQueue::new(&app_data));
        let ledger = Arc::new(StepResultLedger::in_app_data(&app_data));
        let descriptors = Arc::new(ShellDescriptorManager::for_tenant(
            &app_data,
            &config.tenant,
            events.clone(),
        ));

        let mut handlers = HandlerRegistry::new();
        handlers.register(Box::new(FeatureStep::new(
            descriptors.clone(),
            config.available_features.clone(),
        )))?;
        handlers.register(Box::new(ActivateShellStep::new(
            settings.clone(),
            settings_store.clone(),
        )))?;
        for handler in extra_handlers {
            handlers.register(handler)?;
        }

        let step_queue: Arc<dyn StepQueue> = queue.clone();
        let step_executor = Arc::new(RecipeStepExecutor::new(
            step_queue.clone(),
            Arc::new(handlers),
            ledger.clone(),
            events.clone(),
        ));

        let engine = Arc::new(TaskProcessingEngine::new());
        let scheduler = Arc::new(RecipeScheduler::new(
            engine.clone(),
            settings.clone(),
            descriptors.clone(),
            step_executor,
            events.clone(),
        ));

        let mut bus = TaskBus::new();
        bus.register(scheduler.clone());

        let manager = Arc::new(RecipeManager::new(
            step_queue,
            ledger.clone(),
            scheduler.clone(),
            events.clone(),
        ));
        let executor = RecipeExecutor::new(manager.clone(), descriptors.clone());

        Ok(Self {
            project_root: project_root.to_path_buf(),
            app_data,
            config: config.clone(),
            settings,
            settings_store,
            events,
            queue,
            ledger,
            descriptors,
            engine,
            bus,
            scheduler,
            manager,
            executor,
            reloads,
        })
    }

    /// Schedule a recipe through the [`RecipeExecutor`].
    pub fn execute(&self, recipe: &Recipe) -> Result<Option<ExecutionId>> {
        self.executor.execute(recipe)
    }

    /// Run queued tasks until none remain.
    pub fn pump(&self) -> Result<usize> {
        let executed = self.engine.pump(&self.bus)?;
        debug!("Pumped {} task(s)", executed);
        Ok(executed)
    }

    /// Progress of an execution.
    pub fn result(&self, execution_id: &ExecutionId) -> Result<RecipeResult> {
        RecipeResultAccessor::new(self.ledger.clone()).get_result(execution_id)
    }

    /// Schedule work again for an execution whose steps are still queued.
    ///
    /// Returns `false` when nothing is queued for the id.
    pub fn resume(&self, execution_id: &ExecutionId) -> Result<bool> {
        let pending = self.queue.pending(execution_id)?;
        if pending == 0 {
            return Ok(false);
        }

        info!(
            "Resuming execution {} with {} queued step(s)",
            execution_id, pending
        );
        self.scheduler.schedule_work(execution_id)?;
        Ok(true)
    }

    /// Executions with steps still queued.
    pub fn interrupted_executions(&self) -> Result<Vec<ExecutionId>> {
        self.queue.executions()
    }

    /// Recipes available in the configured recipe directories.
    pub fn harvester(&self) -> RecipeHarvester {
        RecipeHarvester::new(self.config.recipe_dirs(&self.project_root))
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &OrchardConfig {
        &self.config
    }

    pub fn app_data(&self) -> &Path {
        &self.app_data
    }

    pub fn settings(&self) -> &SharedShellSettings {
        &self.settings
    }

    /// Current tenant state.
    pub fn tenant_state(&self) -> TenantState {
        settings::snapshot(&self.settings).state
    }

    /// Set and persist the tenant state, returning the previous one.
    pub fn set_tenant_state(&self, state: TenantState) -> Result<TenantState> {
        let previous = settings::set_state(&self.settings, state);
        self.settings_store.persist(&self.settings)?;
        Ok(previous)
    }

    pub fn settings_store(&self) -> &Arc<ShellSettingsStore> {
        &self.settings_store
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn queue(&self) -> &Arc<FolderStepQueue> {
        &self.queue
    }

    pub fn ledger(&self) -> &Arc<StepResultLedger> {
        &self.ledger
    }

    pub fn descriptors(&self) -> &Arc<ShellDescriptorManager> {
        &self.descriptors
    }

    pub fn engine(&self) -> &Arc<TaskProcessingEngine> {
        &self.engine
    }

    pub fn scheduler(&self) -> &Arc<RecipeScheduler> {
        &self.scheduler
    }

    pub fn manager(&self) -> &Arc<RecipeManager> {
        &self.manager
    }

    pub fn executor(&self) -> &RecipeExecutor {
        &self.executor
    }

    pub fn reloads(&self) -> &Arc<ShellReloadTracker> {
        &self.reloads
    }
}
