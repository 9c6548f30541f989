pub use crate::module::error::{ModuleError, ModuleErrorExt};
use hotbar_event_bus::EventBusError;
use std::borrow::Cow;

#[hotbar_derive::hotbar_error]
pub enum KernelError {
    #[error("Duplicate module{}: {message}", format_context(.context))]
    DuplicateModule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown module{}: {message}", format_context(.context))]
    UnknownModule { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Re-entrant toggle{}: {message}", format_context(.context))]
    Reentrant { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Failed to {direction} module '{module}'{}: {source}", format_context(.context))]
    Activation {
        module: String,
        direction: &'static str,
        #[source]
        source: ModuleError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Invalid request{}: {message}", format_context(.context))]
    InvalidRequest { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid value{}: {message}", format_context(.context))]
    InvalidValue { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Event bus error{}: {source}", format_context(.context))]
    Bus { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal kernel error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl KernelError {
    pub(crate) fn unknown(name: &str) -> Self {
        Self::UnknownModule { message: format!("'{name}'").into(), context: None }
    }
}
