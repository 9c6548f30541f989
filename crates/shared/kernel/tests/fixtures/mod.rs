#![allow(dead_code)]

use hotbar_domain::category::Category;
use hotbar_domain::config::HostConfig;
use hotbar_domain::events::{EventKind, PlayerInfo, WorldInfo};
use hotbar_domain::input::{ClickRequest, MouseButton};
use hotbar_event_bus::EventBus;
use hotbar_kernel::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// Counters shared between a test and the recorder owned by the registry.
#[derive(Debug, Default)]
pub struct Calls {
    pub enables: AtomicU32,
    pub disables: AtomicU32,
    pub inits: AtomicU32,
    pub ticks: AtomicU32,
    pub disconnects: AtomicU32,
    pub fail: AtomicBool,
}

impl Calls {
    pub fn enables(&self) -> u32 {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disables(&self) -> u32 {
        self.disables.load(Ordering::SeqCst)
    }

    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub struct Recorder {
    pub calls: Arc<Calls>,
    /// Module to enable from inside `enable`.
    pub chain: Option<&'static str>,
}

impl Recorder {
    pub fn new(calls: &Arc<Calls>) -> Self {
        Self { calls: Arc::clone(calls), chain: None }
    }

    fn outcome(&self) -> Result<(), ModuleError> {
        if self.calls.fail.load(Ordering::SeqCst) {
            Err(ModuleError::failed("refused"))
        } else {
            Ok(())
        }
    }
}

impl ModuleBehavior for Recorder {
    fn init(&mut self) -> Result<(), ModuleError> {
        self.calls.inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn enable(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.calls.enables.fetch_add(1, Ordering::SeqCst);
        if let Some(other) = self.chain {
            ctx.request_toggle(other, true);
        }
        self.outcome()
    }

    fn disable(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.calls.disables.fetch_add(1, Ordering::SeqCst);
        let id = ctx.id();
        ctx.arbiters.attack.withdraw(&id);
        self.outcome()
    }

    fn values() -> ValueGroup {
        ValueGroup::new()
            .with("Mode", ValueNode::Choice(ChoiceGroup::new(&["Legit", "Blatant"], "Legit")))
            .with("Silent", ValueNode::Boolean(true))
    }

    fn listeners() -> Vec<Listener<Self>> {
        vec![
            Listener::on(EventKind::Tick, |recorder, _, ctx| {
                recorder.calls.ticks.fetch_add(1, Ordering::SeqCst);
                let id = ctx.id();
                ctx.arbiters.attack.submit(id, 1, 1, ClickRequest { button: MouseButton::Left, count: 1 });
                Ok(())
            }),
            Listener::on(EventKind::Disconnect, |recorder, _, _| {
                recorder.calls.disconnects.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        ]
    }
}

pub fn manager() -> ModuleManager {
    manager_with(&HostConfig::default())
}

pub fn manager_with(config: &HostConfig) -> ModuleManager {
    ModuleManager::new(EventBus::new(), config)
}

pub fn register(manager: &mut ModuleManager, info: ModuleInfo) -> Arc<Calls> {
    let calls = Arc::new(Calls::default());
    manager.register(Module::new(info, Recorder::new(&calls))).expect("recorder registers");
    calls
}

pub fn combat(name: &str) -> ModuleInfo {
    ModuleInfo::new(name, Category::Combat)
}

pub fn join(manager: &mut ModuleManager) {
    let world = WorldInfo::new("overworld");
    manager.set_session(Session::new(world.clone(), PlayerInfo::new("steve")));
    manager.dispatch(&hotbar_domain::events::GameEvent::WorldChange { world: Some(world) });
}

pub fn leave(manager: &mut ModuleManager) {
    manager.dispatch(&hotbar_domain::events::GameEvent::Disconnect);
    manager.set_session(Session::default());
    manager.dispatch(&hotbar_domain::events::GameEvent::WorldChange { world: None });
}
