//! The module activation state machine.
//!
//! A [`Module`] pairs static metadata ([`ModuleInfo`]) and persisted state ([`ModuleState`]) with
//! a user-supplied [`ModuleBehavior`]. Writes to `enabled` only reach the behaviour's
//! `enable`/`disable` callbacks while a session is active, and only on a real change; otherwise
//! the flag is stored silently and reconciled when the next world is joined.

pub mod context;
pub mod error;
pub mod listener;

use crate::error::{KernelError, ModuleError};
use crate::registry::ModuleId;
use crate::session::{Environment, Session};
use crate::value::ValueGroup;
use context::{Command, ModuleContext};
use hotbar_domain::bind::KeyBind;
use hotbar_domain::category::Category;
use hotbar_domain::config::FailurePolicy;
use hotbar_domain::constants::TRANSLATION_ROOT;
use hotbar_domain::events::GameEvent;
use listener::{Gate, Listener};
use std::fmt::Debug;
use tracing::{debug, error, trace, warn};

/// Immutable identity and construction-time flags of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    name: String,
    category: Category,
    default_bind: KeyBind,
    default_enabled: bool,
    default_hidden: bool,
    suppress_activation: bool,
    deactivate_on_session_end: bool,
    persist_enabled: Option<bool>,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
            default_bind: KeyBind::NONE,
            default_enabled: false,
            default_hidden: false,
            suppress_activation: false,
            deactivate_on_session_end: false,
            persist_enabled: None,
        }
    }

    #[must_use]
    pub const fn bind(mut self, bind: KeyBind) -> Self {
        self.default_bind = bind;
        self
    }

    #[must_use]
    pub const fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.default_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.default_hidden = hidden;
        self
    }

    /// One-shot modules: callbacks run but the flag falls back to `false` and nothing is announced.
    #[must_use]
    pub const fn suppress_activation(mut self, suppress: bool) -> Self {
        self.suppress_activation = suppress;
        self
    }

    #[must_use]
    pub const fn deactivate_on_session_end(mut self, deactivate: bool) -> Self {
        self.deactivate_on_session_end = deactivate;
        self
    }

    /// Overrides the category rule for writing `enabled` to snapshots.
    #[must_use]
    pub const fn persist_enabled(mut self, persist: bool) -> Self {
        self.persist_enabled = Some(persist);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn category(&self) -> Category {
        self.category
    }

    pub const fn default_bind(&self) -> KeyBind {
        self.default_bind
    }

    pub const fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    pub const fn is_activation_suppressed(&self) -> bool {
        self.suppress_activation
    }

    pub const fn deactivates_on_session_end(&self) -> bool {
        self.deactivate_on_session_end
    }

    pub const fn persist_enabled_override(&self) -> Option<bool> {
        self.persist_enabled
    }

    /// `hotbar.module.<lowerCamelName>`
    pub fn translation_base_key(&self) -> String {
        format!("{TRANSLATION_ROOT}.{}", lower_camel_case(&self.name))
    }

    pub fn description_key(&self) -> String {
        format!("{}.description", self.translation_base_key())
    }

    pub fn message_key(&self, key: &str) -> String {
        format!("{}.messages.{key}", self.translation_base_key())
    }
}

/// Persisted and transient state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleState {
    pub enabled: bool,
    pub hidden: bool,
    pub bind: KeyBind,
    /// `enable` has run without a matching `disable` since. Never persisted.
    pub callbacks_active: bool,
}

/// Outcome of a write to `enabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same value as before; nothing ran.
    Unchanged,
    /// Stored without a session; callbacks deferred.
    Deferred,
    /// Callback succeeded; announce it.
    Applied { enabled: bool },
    /// Callback succeeded on a one-shot module; the flag was reset.
    Suppressed,
}

/// The behaviour half of a module, supplied by feature crates.
pub trait ModuleBehavior: Debug + Send + 'static {
    /// Runs once when the module is registered.
    fn init(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    fn enable(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    fn disable(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Default configuration tree.
    fn values() -> ValueGroup
    where
        Self: Sized,
    {
        ValueGroup::new()
    }

    fn listeners() -> Vec<Listener<Self>>
    where
        Self: Sized,
    {
        Vec::new()
    }

    /// Short HUD suffix, e.g. the configured CPS.
    fn tag(&self, _values: &ValueGroup) -> Option<String> {
        None
    }
}

/// Object-safe view of a [`Module`] used by the registry.
pub trait Feature: Debug + Send {
    fn id(&self) -> ModuleId;

    fn info(&self) -> &ModuleInfo;

    fn state(&self) -> &ModuleState;

    fn values(&self) -> &ValueGroup;

    fn tag(&self) -> Option<String>;

    /// Whether gated listeners may run right now.
    fn handles_events(&self, session: &Session) -> bool {
        self.state().enabled && session.is_active()
    }

    /// `enabled` and its callbacks have actually run.
    fn is_running(&self) -> bool {
        self.state().enabled && self.state().callbacks_active
    }

    fn attach(&mut self, id: ModuleId) -> Result<(), ModuleError>;

    fn set_enabled(
        &mut self,
        enabled: bool,
        env: &mut Environment,
        commands: &mut Vec<Command>,
        policy: FailurePolicy,
    ) -> Result<Transition, KernelError>;

    /// Brings the callbacks in line with a flag written without a session: runs `enable` or
    /// `disable` once a world is joined. Returns whether a callback ran.
    fn reconcile(
        &mut self,
        env: &mut Environment,
        commands: &mut Vec<Command>,
        policy: FailurePolicy,
    ) -> Result<bool, KernelError>;

    /// Delivers an event to matching listeners; returns how many ran.
    fn dispatch(&mut self, event: &GameEvent, env: &mut Environment, commands: &mut Vec<Command>) -> usize;

    /// Returns `true` if the value changed.
    fn set_hidden(&mut self, hidden: bool) -> bool;

    fn set_bind(&mut self, bind: KeyBind);

    fn set_group_enabled(&mut self, path: &str, enabled: bool) -> Result<(), KernelError>;

    fn select_choice(&mut self, path: &str, choice: &str) -> Result<(), KernelError>;

    fn set_range(&mut self, path: &str, low: i32, high: i32) -> Result<(), KernelError>;

    /// Checks that a persisted tree fits without applying it.
    fn check_values(&self, json: &serde_json::Value) -> Result<(), KernelError>;

    /// Applies a persisted tree; on error the current values are kept whole.
    fn restore_values(&mut self, json: &serde_json::Value) -> Result<(), KernelError>;
}

/// A registered module: metadata, state, configuration tree and behaviour.
pub struct Module<B: ModuleBehavior> {
    id: ModuleId,
    info: ModuleInfo,
    state: ModuleState,
    values: ValueGroup,
    listeners: Vec<Listener<B>>,
    transitioning: bool,
    behavior: B,
}

impl<B: ModuleBehavior> Module<B> {
    pub fn new(info: ModuleInfo, behavior: B) -> Self {
        let state = ModuleState {
            enabled: info.default_enabled,
            hidden: info.default_hidden,
            bind: info.default_bind,
            callbacks_active: false,
        };
        Self {
            id: ModuleId::UNASSIGNED,
            info,
            state,
            values: B::values(),
            listeners: B::listeners(),
            transitioning: false,
            behavior,
        }
    }

    pub const fn behavior(&self) -> &B {
        &self.behavior
    }

    /// Runs `enable`/`disable` and maps failure to [`KernelError::Activation`].
    fn run_callback(
        &mut self,
        enabled: bool,
        env: &mut Environment,
        commands: &mut Vec<Command>,
    ) -> Result<(), KernelError> {
        if self.transitioning {
            return Err(KernelError::Reentrant {
                message: format!("'{}' is already running a callback", self.info.name).into(),
                context: None,
            });
        }

        self.transitioning = true;
        let mut ctx = ModuleContext::new(self.id, &self.values, env, commands);
        let result =
            if enabled { self.behavior.enable(&mut ctx) } else { self.behavior.disable(&mut ctx) };
        self.transitioning = false;

        result.map_err(|source| {
            let direction = direction(enabled);
            error!(module = %self.info.name, direction, error = %source, "Module activation failed");
            KernelError::Activation {
                module: self.info.name.clone(),
                direction,
                source,
                context: None,
            }
        })
    }

    fn finish(&mut self, enabled: bool) -> Transition {
        self.state.callbacks_active = enabled && !self.info.suppress_activation;
        if self.info.suppress_activation {
            self.state.enabled = false;
            debug!(module = %self.info.name, direction = direction(enabled), "One-shot module ran");
            return Transition::Suppressed;
        }
        self.values.new_state(enabled);
        debug!(module = %self.info.name, enabled, "Module toggled");
        Transition::Applied { enabled }
    }
}

impl<B: ModuleBehavior> Feature for Module<B> {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn info(&self) -> &ModuleInfo {
        &self.info
    }

    fn state(&self) -> &ModuleState {
        &self.state
    }

    fn values(&self) -> &ValueGroup {
        &self.values
    }

    fn tag(&self) -> Option<String> {
        self.behavior.tag(&self.values)
    }

    fn attach(&mut self, id: ModuleId) -> Result<(), ModuleError> {
        self.id = id;
        self.behavior.init()
    }

    fn set_enabled(
        &mut self,
        enabled: bool,
        env: &mut Environment,
        commands: &mut Vec<Command>,
        policy: FailurePolicy,
    ) -> Result<Transition, KernelError> {
        if self.transitioning {
            return Err(KernelError::Reentrant {
                message: format!("'{}' is already running a callback", self.info.name).into(),
                context: Some(direction(enabled).into()),
            });
        }
        if self.state.enabled == enabled {
            return Ok(Transition::Unchanged);
        }

        let previous = self.state.enabled;
        self.state.enabled = enabled;

        if !env.session.is_active() {
            trace!(module = %self.info.name, enabled, "Stored without session");
            return Ok(Transition::Deferred);
        }

        if let Err(err) = self.run_callback(enabled, env, commands) {
            if policy == FailurePolicy::Rollback {
                self.state.enabled = previous;
            }
            return Err(err);
        }
        Ok(self.finish(enabled))
    }

    fn reconcile(
        &mut self,
        env: &mut Environment,
        commands: &mut Vec<Command>,
        policy: FailurePolicy,
    ) -> Result<bool, KernelError> {
        let enabled = self.state.enabled;
        if enabled == self.state.callbacks_active || !env.session.is_active() {
            return Ok(false);
        }

        // A failed callback leaves `callbacks_active` alone, so the next join retries.
        if let Err(err) = self.run_callback(enabled, env, commands) {
            if policy == FailurePolicy::Rollback {
                self.state.enabled = self.state.callbacks_active;
            }
            return Err(err);
        }
        self.finish(enabled);
        Ok(true)
    }

    fn dispatch(&mut self, event: &GameEvent, env: &mut Environment, commands: &mut Vec<Command>) -> usize {
        let kind = event.kind();
        let mut ran = 0;
        for listener in self.listeners.iter().filter(|l| l.kind == kind) {
            if listener.gate == Gate::Module && !self.handles_events(&env.session) {
                continue;
            }
            let mut ctx = ModuleContext::new(self.id, &self.values, env, commands);
            if let Err(err) = (listener.callback)(&mut self.behavior, event, &mut ctx) {
                warn!(module = %self.info.name, event = ?kind, error = %err, "Listener failed");
            }
            ran += 1;
        }
        ran
    }

    fn set_hidden(&mut self, hidden: bool) -> bool {
        let changed = self.state.hidden != hidden;
        self.state.hidden = hidden;
        changed
    }

    fn set_bind(&mut self, bind: KeyBind) {
        self.state.bind = bind;
    }

    fn set_group_enabled(&mut self, path: &str, enabled: bool) -> Result<(), KernelError> {
        let running = self.is_running();
        self.values
            .group_mut(path)
            .ok_or_else(|| unknown_value(path))?
            .set_enabled(enabled, running)
    }

    fn select_choice(&mut self, path: &str, choice: &str) -> Result<(), KernelError> {
        match self.values.get_mut(path) {
            Some(crate::value::ValueNode::Choice(group)) => group.select(choice),
            _ => Err(unknown_value(path)),
        }
    }

    fn set_range(&mut self, path: &str, low: i32, high: i32) -> Result<(), KernelError> {
        match self.values.get_mut(path) {
            Some(crate::value::ValueNode::Range(range)) => range.set(low, high),
            _ => Err(unknown_value(path)),
        }
    }

    fn check_values(&self, json: &serde_json::Value) -> Result<(), KernelError> {
        self.values.clone().restore(json, false)
    }

    fn restore_values(&mut self, json: &serde_json::Value) -> Result<(), KernelError> {
        let mut values = self.values.clone();
        values.restore(json, self.is_running())?;
        self.values = values;
        Ok(())
    }
}

impl<B: ModuleBehavior> Debug for Module<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("id", &self.id)
            .field("info", &self.info)
            .field("state", &self.state)
            .field("behavior", &self.behavior)
            .finish_non_exhaustive()
    }
}

const fn direction(enabled: bool) -> &'static str {
    if enabled { "enable" } else { "disable" }
}

fn unknown_value(path: &str) -> KernelError {
    KernelError::InvalidValue { message: format!("no such value '{path}'").into(), context: None }
}

/// `"AutoClicker"` -> `"autoClicker"`, `"Fast Break"` -> `"fastBreak"`.
fn lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name.split_whitespace().enumerate() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotbar_domain::events::{EventKind, PlayerInfo, WorldInfo};

    #[derive(Debug, Default)]
    struct Recorder {
        enables: u32,
        disables: u32,
        ticks: u32,
        fail: bool,
    }

    impl ModuleBehavior for Recorder {
        fn enable(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            self.enables += 1;
            if self.fail { Err(ModuleError::failed("refused")) } else { Ok(()) }
        }

        fn disable(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
            self.disables += 1;
            if self.fail { Err(ModuleError::failed("refused")) } else { Ok(()) }
        }

        fn listeners() -> Vec<Listener<Self>> {
            vec![Listener::on(EventKind::Tick, |recorder, _, _| {
                recorder.ticks += 1;
                Ok(())
            })]
        }
    }

    fn in_session() -> Environment {
        Environment {
            session: Session::new(WorldInfo::new("overworld"), PlayerInfo::new("steve")),
            ..Environment::default()
        }
    }

    fn recorder() -> Module<Recorder> {
        Module::new(ModuleInfo::new("Recorder", Category::Combat), Recorder::default())
    }

    #[test]
    fn translation_keys() {
        let info = ModuleInfo::new("AutoClicker", Category::Combat);
        assert_eq!(info.translation_base_key(), "hotbar.module.autoClicker");
        assert_eq!(info.description_key(), "hotbar.module.autoClicker.description");
        assert_eq!(info.message_key("noTarget"), "hotbar.module.autoClicker.messages.noTarget");
        assert_eq!(lower_camel_case("Fast Break"), "fastBreak");
    }

    #[test]
    fn same_value_writes_are_idempotent() {
        let mut module = recorder();
        let mut env = in_session();
        let mut commands = Vec::new();
        let policy = FailurePolicy::default();

        for value in [true, true, true, false, false, true] {
            module.set_enabled(value, &mut env, &mut commands, policy).expect("callback accepts");
        }
        assert_eq!(module.behavior().enables, 2);
        assert_eq!(module.behavior().disables, 1);
    }

    #[test]
    fn without_session_the_flag_is_stored_silently() {
        let mut module = recorder();
        let mut env = Environment::default();
        let mut commands = Vec::new();

        let outcome = module
            .set_enabled(true, &mut env, &mut commands, FailurePolicy::default())
            .expect("no session is not an error");
        assert_eq!(outcome, Transition::Deferred);
        assert!(module.state().enabled);
        assert_eq!(module.behavior().enables, 0);
        assert!(!module.state().callbacks_active);
    }

    #[test]
    fn reconcile_runs_deferred_enable_once() {
        let mut module = recorder();
        let mut env = Environment::default();
        let mut commands = Vec::new();
        let policy = FailurePolicy::default();

        module.set_enabled(true, &mut env, &mut commands, policy).expect("stored");
        env.session = Session::new(WorldInfo::new("nether"), PlayerInfo::new("alex"));

        assert!(module.reconcile(&mut env, &mut commands, policy).expect("callback accepts"));
        assert!(!module.reconcile(&mut env, &mut commands, policy).expect("callback accepts"));
        assert_eq!(module.behavior().enables, 1);
    }

    #[test]
    fn reconcile_runs_deferred_disable_of_a_running_module() {
        let mut module = recorder();
        let mut env = in_session();
        let mut commands = Vec::new();
        let policy = FailurePolicy::default();

        module.set_enabled(true, &mut env, &mut commands, policy).expect("callback accepts");
        env.session.clear();
        module.set_enabled(false, &mut env, &mut commands, policy).expect("stored");
        assert!(module.state().callbacks_active);

        env.session = Session::new(WorldInfo::new("overworld"), PlayerInfo::new("steve"));
        assert!(module.reconcile(&mut env, &mut commands, policy).expect("callback accepts"));
        assert_eq!((module.behavior().enables, module.behavior().disables), (1, 1));
        assert!(!module.state().callbacks_active);
    }

    #[test]
    fn failed_deferred_enable_is_retried_on_the_next_join() {
        let mut module = Module::new(
            ModuleInfo::new("Recorder", Category::Combat),
            Recorder { fail: true, ..Recorder::default() },
        );
        let mut env = Environment::default();
        let mut commands = Vec::new();
        let policy = FailurePolicy::KeepAttempted;

        module.set_enabled(true, &mut env, &mut commands, policy).expect("stored");
        env.session = Session::new(WorldInfo::new("overworld"), PlayerInfo::new("steve"));
        module.reconcile(&mut env, &mut commands, policy).expect_err("callback fails");
        assert!(module.state().enabled);
        assert!(!module.is_running());

        module.behavior.fail = false;
        assert!(module.reconcile(&mut env, &mut commands, policy).expect("callback accepts"));
        assert!(module.is_running());
        assert_eq!(module.behavior().enables, 2);
    }

    #[test]
    fn failure_keeps_attempted_value_by_default() {
        let mut module = Module::new(
            ModuleInfo::new("Recorder", Category::Combat),
            Recorder { fail: true, ..Recorder::default() },
        );
        let mut env = in_session();
        let mut commands = Vec::new();

        let err = module
            .set_enabled(true, &mut env, &mut commands, FailurePolicy::KeepAttempted)
            .expect_err("callback fails");
        assert!(matches!(err, KernelError::Activation { direction: "enable", .. }));
        assert!(module.state().enabled);
    }

    #[test]
    fn failure_rolls_back_when_configured() {
        let mut module = Module::new(
            ModuleInfo::new("Recorder", Category::Combat),
            Recorder { fail: true, ..Recorder::default() },
        );
        let mut env = in_session();
        let mut commands = Vec::new();

        module
            .set_enabled(true, &mut env, &mut commands, FailurePolicy::Rollback)
            .expect_err("callback fails");
        assert!(!module.state().enabled);
    }

    #[test]
    fn transitioning_flag_rejects_reentry() {
        let mut module = recorder();
        let mut env = in_session();
        let mut commands = Vec::new();
        module.transitioning = true;

        let err = module
            .set_enabled(true, &mut env, &mut commands, FailurePolicy::default())
            .expect_err("re-entry is rejected");
        assert!(matches!(err, KernelError::Reentrant { .. }));
        assert!(!module.state().enabled, "rejected write leaves the flag alone");
    }

    #[test]
    fn suppressed_activation_resets_the_flag() {
        let mut module = Module::new(
            ModuleInfo::new("Panic", Category::Misc).suppress_activation(true),
            Recorder::default(),
        );
        let mut env = in_session();
        let mut commands = Vec::new();

        let outcome = module
            .set_enabled(true, &mut env, &mut commands, FailurePolicy::default())
            .expect("callback accepts");
        assert_eq!(outcome, Transition::Suppressed);
        assert!(!module.state().enabled);
        assert_eq!(module.behavior().enables, 1);
    }

    #[test]
    fn gated_listeners_follow_enabled_and_session() {
        let mut module = recorder();
        let mut env = in_session();
        let mut commands = Vec::new();
        let tick = GameEvent::Tick { tick: 1 };

        assert_eq!(module.dispatch(&tick, &mut env, &mut commands), 0);
        module.set_enabled(true, &mut env, &mut commands, FailurePolicy::default()).expect("enable");
        assert_eq!(module.dispatch(&tick, &mut env, &mut commands), 1);

        env.session.clear();
        assert_eq!(module.dispatch(&tick, &mut env, &mut commands), 0);
        assert_eq!(module.behavior().ticks, 1);
    }
}
