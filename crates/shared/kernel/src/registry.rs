//! The module registry.
//!
//! [`ModuleManager`] owns every module, the [`Environment`] they run in and the queue of toggles
//! requested from inside callbacks. It is the single writer for module state: all transitions go
//! through it, and it publishes the resulting notifications on the [`EventBus`].

use crate::arbiters::Arbiters;
use crate::error::{KernelError, KernelErrorExt};
use crate::module::context::Command;
use crate::module::{Feature, Module, ModuleBehavior, Transition};
use crate::session::{Environment, Session};
use fxhash::FxHashMap;
use hotbar_domain::bind::KeyBind;
use hotbar_domain::category::CategorySet;
use hotbar_domain::config::{FailurePolicy, HostConfig};
use hotbar_domain::events::{GameEvent, Notification, RefreshArrayListEvent, ToggleModuleEvent};
use hotbar_domain::input::InputState;
use hotbar_event_bus::EventBus;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

/// Rounds of queued toggles applied after one outer operation before the rest is dropped.
const MAX_COMMAND_ROUNDS: usize = 16;

/// Registration index of a module; also its producer identity in arbitration queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(u32);

impl ModuleId {
    pub(crate) const UNASSIGNED: Self = Self(u32::MAX);

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Persisted state of one module.
///
/// `enabled` is absent for modules whose category does not persist it. Absent fields keep the
/// module's current value on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<KeyBind>,
    #[serde(default)]
    pub values: serde_json::Value,
}

/// Owner of all modules and the single entry point for changing their state.
#[derive(Debug)]
pub struct ModuleManager {
    modules: Vec<Box<dyn Feature>>,
    index: FxHashMap<String, ModuleId>,
    env: Environment,
    commands: Vec<Command>,
    bus: EventBus,
    policy: FailurePolicy,
    persist_categories: CategorySet,
}

impl ModuleManager {
    pub fn new(bus: EventBus, config: &HostConfig) -> Self {
        Self {
            modules: Vec::new(),
            index: FxHashMap::default(),
            env: Environment { tick_rate: config.tick.rate_hz, ..Environment::default() },
            commands: Vec::new(),
            bus,
            policy: config.modules.failure_policy,
            persist_categories: config.modules.persist_enabled_categories,
        }
    }

    /// Adds a module and runs its `init` hook.
    ///
    /// # Errors
    /// * [`KernelError::DuplicateModule`] if a module with the same (case-insensitive) name exists.
    /// * [`KernelError::Activation`] if `init` fails; the module is not registered.
    pub fn register<B: ModuleBehavior>(&mut self, module: Module<B>) -> Result<ModuleId, KernelError> {
        let mut module: Box<dyn Feature> = Box::new(module);
        let name = module.info().name().to_owned();
        let key = name.to_lowercase();
        if self.index.contains_key(&key) {
            return Err(KernelError::DuplicateModule { message: name.into(), context: None });
        }

        let raw = u32::try_from(self.modules.len()).map_err(|_| "module registry is full")?;
        let id = ModuleId(raw);
        module.attach(id).map_err(|source| KernelError::Activation {
            module: name.clone(),
            direction: "initialize",
            source,
            context: None,
        })?;

        info!(module = %name, category = %module.info().category(), %id, "Module registered");
        self.index.insert(key, id);
        self.modules.push(module);
        Ok(id)
    }

    pub fn id(&self, name: &str) -> Option<ModuleId> {
        self.index.get(&name.to_lowercase()).copied()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Feature> {
        self.id(name).map(|id| self.modules[id.index()].as_ref())
    }

    pub fn get_by_id(&self, id: ModuleId) -> Option<&dyn Feature> {
        self.modules.get(id.index()).map(AsRef::as_ref)
    }

    /// Modules in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Feature> {
        self.modules.iter().map(AsRef::as_ref)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub const fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub const fn session(&self) -> &Session {
        &self.env.session
    }

    pub const fn input(&self) -> InputState {
        self.env.input
    }

    pub const fn tick(&self) -> u64 {
        self.env.tick
    }

    pub const fn arbiters(&self) -> &Arbiters {
        &self.env.arbiters
    }

    pub const fn arbiters_mut(&mut self) -> &mut Arbiters {
        &mut self.env.arbiters
    }

    pub fn set_session(&mut self, session: Session) {
        self.env.session = session;
    }

    pub fn set_input(&mut self, input: InputState) {
        self.env.input = input;
    }

    /// Advances the tick counter and returns the new tick.
    pub fn advance_tick(&mut self) -> u64 {
        self.env.tick += 1;
        self.env.tick
    }

    /// Writes `enabled` on a module and applies any toggles its callbacks queued.
    ///
    /// # Errors
    /// * [`KernelError::UnknownModule`] for an unregistered name.
    /// * [`KernelError::Activation`] if `enable`/`disable` failed; the stored flag then follows
    ///   the configured [`FailurePolicy`] and nothing is published.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<Transition, KernelError> {
        let id = self.id(name).ok_or_else(|| KernelError::unknown(name))?;
        let result = self.apply(id, enabled);
        self.run_commands();
        result
    }

    /// Flips `enabled`.
    pub fn toggle(&mut self, name: &str) -> Result<Transition, KernelError> {
        let enabled = self.get(name).ok_or_else(|| KernelError::unknown(name))?.state().enabled;
        self.set_enabled(name, !enabled)
    }

    /// Returns `true` if visibility changed.
    pub fn set_hidden(&mut self, name: &str, hidden: bool) -> Result<bool, KernelError> {
        let id = self.id(name).ok_or_else(|| KernelError::unknown(name))?;
        let changed = self.modules[id.index()].set_hidden(hidden);
        if changed {
            self.bus.publish(RefreshArrayListEvent)?;
        }
        Ok(changed)
    }

    pub fn set_bind(&mut self, name: &str, bind: KeyBind) -> Result<(), KernelError> {
        let id = self.id(name).ok_or_else(|| KernelError::unknown(name))?;
        self.modules[id.index()].set_bind(bind);
        debug!(module = %name, %bind, "Bind changed");
        Ok(())
    }

    pub fn set_group_enabled(&mut self, name: &str, path: &str, enabled: bool) -> Result<(), KernelError> {
        self.feature_mut(name)?.set_group_enabled(path, enabled)
    }

    pub fn select_choice(&mut self, name: &str, path: &str, choice: &str) -> Result<(), KernelError> {
        self.feature_mut(name)?.select_choice(path, choice)
    }

    pub fn set_range(&mut self, name: &str, path: &str, low: i32, high: i32) -> Result<(), KernelError> {
        self.feature_mut(name)?.set_range(path, low, high)
    }

    /// Delivers an event to every module in registration order.
    ///
    /// Framework handling runs before a module's own listeners:
    /// * `WorldChange` into a world reconciles deferred activation (ignores the gate).
    /// * `Disconnect` disables modules configured to deactivate on session end (gated).
    /// * `KeyPress` toggles modules bound to the key.
    ///
    /// Listener and callback failures are logged; dispatch continues with the next module.
    /// Returns the number of module listeners that ran.
    pub fn dispatch(&mut self, event: &GameEvent) -> usize {
        let mut ran = 0;
        for index in 0..self.modules.len() {
            let id = self.modules[index].id();
            match event {
                GameEvent::WorldChange { world: Some(_) } => {
                    let module = &mut self.modules[index];
                    if let Err(err) = module.reconcile(&mut self.env, &mut self.commands, self.policy) {
                        error!(error = %err, "Deferred activation failed");
                    }
                },
                GameEvent::Disconnect => {
                    let module = &self.modules[index];
                    if module.info().deactivates_on_session_end() && module.handles_events(&self.env.session) {
                        self.apply_logged(id, false);
                    }
                },
                GameEvent::KeyPress { key } => {
                    let state = self.modules[index].state();
                    if state.bind.matches(*key) {
                        let enabled = !state.enabled;
                        self.apply_logged(id, enabled);
                    }
                },
                GameEvent::Tick { .. } | GameEvent::WorldChange { world: None } => {},
            }
            ran += self.modules[index].dispatch(event, &mut self.env, &mut self.commands);
        }
        self.run_commands();
        ran
    }

    /// Whether `enabled` of this module is written to snapshots.
    pub fn persists_enabled(&self, module: &dyn Feature) -> bool {
        let info = module.info();
        info.persist_enabled_override().unwrap_or_else(|| self.persist_categories.includes(info.category()))
    }

    pub fn snapshot(&self) -> Vec<ModuleSnapshot> {
        self.iter()
            .map(|module| {
                let state = module.state();
                ModuleSnapshot {
                    name: module.info().name().to_owned(),
                    enabled: self.persists_enabled(module).then_some(state.enabled),
                    hidden: Some(state.hidden),
                    bind: Some(state.bind),
                    values: module.values().to_json(),
                }
            })
            .collect()
    }

    /// Applies persisted state: values first, then visibility, bind and `enabled`.
    ///
    /// Unknown names are skipped. `enabled` goes through the normal transition path, so it takes
    /// effect immediately inside a session and is deferred otherwise; activation failures are
    /// logged and do not abort the restore. Returns the number of modules restored.
    ///
    /// # Errors
    /// Returns [`KernelError::InvalidValue`] if a stored value tree does not fit the module. All
    /// trees are checked before any module is touched, so nothing is applied in that case.
    pub fn restore(&mut self, snapshots: &[ModuleSnapshot]) -> Result<usize, KernelError> {
        for snapshot in snapshots.iter().filter(|snapshot| !snapshot.values.is_null()) {
            if let Some(module) = self.get(&snapshot.name) {
                module
                    .check_values(&snapshot.values)
                    .context(format!("Restoring values of '{}'", snapshot.name))?;
            }
        }

        let mut restored = 0;
        for snapshot in snapshots {
            let Some(id) = self.id(&snapshot.name) else {
                warn!(module = %snapshot.name, "Skipping snapshot of unknown module");
                continue;
            };

            let module = &mut self.modules[id.index()];
            if !snapshot.values.is_null() {
                module
                    .restore_values(&snapshot.values)
                    .context(format!("Restoring values of '{}'", snapshot.name))?;
            }
            if let Some(bind) = snapshot.bind {
                module.set_bind(bind);
            }
            if snapshot.hidden.is_some_and(|hidden| module.set_hidden(hidden)) {
                self.bus.publish(RefreshArrayListEvent)?;
            }

            let persists = self.persists_enabled(self.modules[id.index()].as_ref());
            if let Some(enabled) = snapshot.enabled.filter(|_| persists) {
                self.apply_logged(id, enabled);
                self.run_commands();
            }
            restored += 1;
        }
        info!(restored, total = snapshots.len(), "Module state restored");
        Ok(restored)
    }

    fn feature_mut(&mut self, name: &str) -> Result<&mut dyn Feature, KernelError> {
        let id = self.id(name).ok_or_else(|| KernelError::unknown(name))?;
        Ok(self.modules[id.index()].as_mut())
    }

    fn apply(&mut self, id: ModuleId, enabled: bool) -> Result<Transition, KernelError> {
        let module = &mut self.modules[id.index()];
        let transition = module.set_enabled(enabled, &mut self.env, &mut self.commands, self.policy)?;

        if let Transition::Applied { enabled } = transition {
            let module = &self.modules[id.index()];
            let name = module.info().name().to_owned();
            let hidden = module.state().hidden;
            self.bus.publish(Notification::toggled(name.clone(), enabled))?;
            self.bus.publish(ToggleModuleEvent { name, hidden, enabled })?;
        }
        Ok(transition)
    }

    fn apply_logged(&mut self, id: ModuleId, enabled: bool) {
        if let Err(err) = self.apply(id, enabled) {
            // Activation failures were already logged with their module.
            if !matches!(err, KernelError::Activation { .. }) {
                error!(error = %err, "Module transition failed");
            }
        }
    }

    fn run_commands(&mut self) {
        for _ in 0..MAX_COMMAND_ROUNDS {
            if self.commands.is_empty() {
                return;
            }
            for command in std::mem::take(&mut self.commands) {
                let (name, enabled) = match command {
                    Command::SetEnabled { module, enabled } => (module, Some(enabled)),
                    Command::Toggle { module } => (module, None),
                };
                let Some(id) = self.id(&name) else {
                    warn!(module = %name, "Queued toggle for unknown module");
                    continue;
                };
                let enabled = enabled.unwrap_or_else(|| !self.modules[id.index()].state().enabled);
                self.apply_logged(id, enabled);
            }
        }
        if !self.commands.is_empty() {
            warn!(dropped = self.commands.len(), "Queued toggles kept re-queuing; dropping the rest");
            self.commands.clear();
        }
    }
}
