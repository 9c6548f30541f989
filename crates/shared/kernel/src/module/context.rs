use crate::arbiters::Arbiters;
use crate::registry::ModuleId;
use crate::session::{Environment, Session};
use crate::value::ValueGroup;
use hotbar_domain::input::InputState;

/// A toggle requested from inside a callback, applied once the current transition finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetEnabled { module: String, enabled: bool },
    Toggle { module: String },
}

/// What a behaviour callback can see and do.
#[derive(Debug)]
pub struct ModuleContext<'a> {
    id: ModuleId,
    values: &'a ValueGroup,
    session: &'a Session,
    input: InputState,
    tick: u64,
    tick_rate: u32,
    pub arbiters: &'a mut Arbiters,
    commands: &'a mut Vec<Command>,
}

impl<'a> ModuleContext<'a> {
    pub(crate) fn new(
        id: ModuleId,
        values: &'a ValueGroup,
        env: &'a mut Environment,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            id,
            values,
            session: &env.session,
            input: env.input,
            tick: env.tick,
            tick_rate: env.tick_rate,
            arbiters: &mut env.arbiters,
            commands,
        }
    }

    /// Identity of the module being called; use it as the producer for arbitration requests.
    pub const fn id(&self) -> ModuleId {
        self.id
    }

    /// The module's configuration tree.
    pub const fn values(&self) -> &'a ValueGroup {
        self.values
    }

    pub const fn session(&self) -> &'a Session {
        self.session
    }

    pub const fn input(&self) -> InputState {
        self.input
    }

    pub const fn tick(&self) -> u64 {
        self.tick
    }

    pub const fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Queues an enable/disable of another (or the same) module.
    pub fn request_toggle(&mut self, module: impl Into<String>, enabled: bool) {
        self.commands.push(Command::SetEnabled { module: module.into(), enabled });
    }

    /// Queues a flip of another (or the same) module.
    pub fn request_flip(&mut self, module: impl Into<String>) {
        self.commands.push(Command::Toggle { module: module.into() });
    }
}
