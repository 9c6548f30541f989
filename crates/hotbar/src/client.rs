use crate::error::{ClientError, ClientErrorExt};
use hotbar_domain::bind::KeyBind;
use hotbar_domain::config::HostConfig;
use hotbar_domain::events::{GameEvent, PlayerInfo, WorldInfo};
use hotbar_domain::input::{ClickRequest, InputState, Rotation};
use hotbar_event_bus::{Event, EventBus};
use hotbar_kernel::error::KernelError;
use hotbar_kernel::module::{Module, ModuleBehavior, Transition};
use hotbar_kernel::registry::{ModuleId, ModuleManager, ModuleSnapshot};
use hotbar_kernel::session::Session;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

/// What the host should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Listener callbacks that ran.
    pub listeners: usize,
    /// Winning attack request, consumed.
    pub attack: Option<ClickRequest>,
    /// Winning use request, consumed.
    pub interact: Option<ClickRequest>,
    /// Rotation currently owned by the highest-priority producer.
    pub rotation: Option<Rotation>,
}

impl TickReport {
    /// Total clicks granted this tick.
    pub fn clicks(&self) -> u32 {
        self.attack.iter().chain(self.interact.iter()).map(|r| r.count).sum()
    }
}

/// The host-facing controller.
///
/// Owns the [`ModuleManager`] and the event bus, translates host hooks (world join, disconnect,
/// key presses, ticks) into [`GameEvent`]s and consumes the arbitration queues once per tick.
#[derive(Debug)]
pub struct Client {
    manager: ModuleManager,
    bus: EventBus,
    running: bool,
}

impl Client {
    /// Builds a client with every built-in module compiled into this build.
    ///
    /// `seed` feeds the modules' random sources; the same seed and the same input replay the
    /// same session.
    ///
    /// # Errors
    /// * [`ClientError::Kernel`] if the configuration is unusable or a module fails to register.
    #[instrument(skip_all, fields(features = ?crate::features::ENABLED))]
    pub fn init(config: &HostConfig, seed: u64) -> Result<Self, ClientError> {
        if config.tick.rate_hz == 0 {
            return Err(KernelError::InvalidValue {
                message: "tick rate must be greater than zero".into(),
                context: None,
            })
            .context("Validating [tick] config");
        }

        let bus = EventBus::new();
        let mut client = Self { manager: ModuleManager::new(bus.clone(), config), bus, running: true };
        client.register_builtin(seed)?;

        info!(modules = client.manager.len(), rate_hz = config.tick.rate_hz, "Client initialized");
        Ok(client)
    }

    #[cfg_attr(not(feature = "autoclicker"), allow(clippy::unused_self, unused_variables))]
    fn register_builtin(&mut self, seed: u64) -> Result<(), ClientError> {
        #[cfg(feature = "autoclicker")]
        self.register(hotbar_autoclicker::AutoClicker::module(seed))?;
        Ok(())
    }

    /// Registers an additional module.
    pub fn register<B: ModuleBehavior>(&mut self, module: Module<B>) -> Result<ModuleId, ClientError> {
        self.ensure_running()?;
        Ok(self.manager.register(module)?)
    }

    /// Read access to the registered modules and the host environment.
    pub const fn modules(&self) -> &ModuleManager {
        &self.manager
    }

    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Subscribes to an event the core publishes ([`ToggleModuleEvent`],
    /// [`Notification`], [`RefreshArrayListEvent`]).
    ///
    /// [`ToggleModuleEvent`]: hotbar_domain::events::ToggleModuleEvent
    /// [`Notification`]: hotbar_domain::events::Notification
    /// [`RefreshArrayListEvent`]: hotbar_domain::events::RefreshArrayListEvent
    pub fn subscribe<E: Event>(&self) -> Result<broadcast::Receiver<Arc<E>>, ClientError> {
        self.ensure_running()?;
        Ok(self.bus.subscribe::<E>()?)
    }

    /// Applies persisted module state; returns how many modules it matched.
    pub fn load(&mut self, snapshots: &[ModuleSnapshot]) -> Result<usize, ClientError> {
        self.ensure_running()?;
        let restored = self.manager.restore(snapshots).context("Loading module state")?;
        info!(restored, total = snapshots.len(), "Module state loaded");
        Ok(restored)
    }

    /// Starts a session; modules enabled outside of it activate now.
    #[instrument(skip_all, fields(world = %world.name))]
    pub fn join_world(&mut self, world: WorldInfo, player: PlayerInfo) -> Result<(), ClientError> {
        self.ensure_running()?;
        if self.manager.session().is_active() {
            self.disconnect()?;
        }
        self.manager.set_session(Session::new(world.clone(), player));
        self.manager.dispatch(&GameEvent::WorldChange { world: Some(world) });
        Ok(())
    }

    /// Ends the session. Pending requests are dropped; without a session nothing happens.
    pub fn disconnect(&mut self) -> Result<(), ClientError> {
        self.ensure_running()?;
        if !self.manager.session().is_active() {
            return Ok(());
        }
        self.manager.dispatch(&GameEvent::Disconnect);
        self.manager.set_session(Session::default());
        self.manager.arbiters_mut().clear();
        self.manager.dispatch(&GameEvent::WorldChange { world: None });
        debug!("Session ended");
        Ok(())
    }

    pub fn set_input(&mut self, input: InputState) -> Result<(), ClientError> {
        self.ensure_running()?;
        self.manager.set_input(input);
        Ok(())
    }

    /// Forwards a key press; modules bound to `key` toggle.
    pub fn press_key(&mut self, key: i32) -> Result<(), ClientError> {
        self.ensure_running()?;
        self.manager.dispatch(&GameEvent::KeyPress { key });
        Ok(())
    }

    /// Runs one host tick: dispatches `Tick`, consumes the click winners and ages the queues.
    pub fn tick(&mut self) -> Result<TickReport, ClientError> {
        self.ensure_running()?;
        let tick = self.manager.advance_tick();
        let listeners = self.manager.dispatch(&GameEvent::Tick { tick });

        let arbiters = self.manager.arbiters_mut();
        let report = TickReport {
            tick,
            listeners,
            attack: arbiters.attack.pop_winner(),
            interact: arbiters.interact.pop_winner(),
            rotation: arbiters.rotation.peek_winner().copied(),
        };
        arbiters.tick();
        Ok(report)
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<Transition, ClientError> {
        self.ensure_running()?;
        Ok(self.manager.set_enabled(name, enabled)?)
    }

    pub fn toggle(&mut self, name: &str) -> Result<Transition, ClientError> {
        self.ensure_running()?;
        Ok(self.manager.toggle(name)?)
    }

    pub fn set_hidden(&mut self, name: &str, hidden: bool) -> Result<bool, ClientError> {
        self.ensure_running()?;
        Ok(self.manager.set_hidden(name, hidden)?)
    }

    pub fn set_bind(&mut self, name: &str, bind: KeyBind) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.manager.set_bind(name, bind)?)
    }

    pub fn set_group_enabled(&mut self, name: &str, path: &str, enabled: bool) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.manager.set_group_enabled(name, path, enabled)?)
    }

    pub fn select_choice(&mut self, name: &str, path: &str, choice: &str) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.manager.select_choice(name, path, choice)?)
    }

    pub fn set_range(&mut self, name: &str, path: &str, low: i32, high: i32) -> Result<(), ClientError> {
        self.ensure_running()?;
        Ok(self.manager.set_range(name, path, low, high)?)
    }

    /// Current persisted view of every module.
    pub fn snapshot(&self) -> Vec<ModuleSnapshot> {
        self.manager.snapshot()
    }

    /// Ends any session, closes the event channels and returns the state to persist.
    ///
    /// Every later call fails with [`ClientError::ShutDown`].
    pub fn shutdown(&mut self) -> Result<Vec<ModuleSnapshot>, ClientError> {
        self.disconnect()?;
        let snapshots = self.manager.snapshot();
        let channels = self.bus.shutdown();
        self.running = false;
        info!(channels, modules = snapshots.len(), "Client shut down");
        Ok(snapshots)
    }

    fn ensure_running(&self) -> Result<(), ClientError> {
        if self.running {
            Ok(())
        } else {
            Err(ClientError::ShutDown { message: "no further calls are accepted".into(), context: None })
        }
    }
}
