use crate::error::ModuleError;
use crate::module::context::ModuleContext;
use hotbar_domain::events::{EventKind, GameEvent};

/// When a listener may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gate {
    /// Only while the module is enabled and a session is active. Checked per event.
    #[default]
    Module,
    /// Regardless of module or session state.
    Always,
}

pub type Callback<B> = fn(&mut B, &GameEvent, &mut ModuleContext<'_>) -> Result<(), ModuleError>;

/// An explicitly registered event handler of a behaviour.
pub struct Listener<B> {
    pub kind: EventKind,
    pub gate: Gate,
    pub callback: Callback<B>,
}

impl<B> Listener<B> {
    /// A gated listener.
    pub const fn on(kind: EventKind, callback: Callback<B>) -> Self {
        Self { kind, gate: Gate::Module, callback }
    }

    /// A listener that ignores the gate.
    pub const fn always(kind: EventKind, callback: Callback<B>) -> Self {
        Self { kind, gate: Gate::Always, callback }
    }
}

impl<B> std::fmt::Debug for Listener<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener").field("kind", &self.kind).field("gate", &self.gate).finish_non_exhaustive()
    }
}
