use hotbar_event_bus::EventBusError;
use hotbar_kernel::error::KernelError;
use std::borrow::Cow;

#[hotbar_derive::hotbar_error]
pub enum ClientError {
    /// The client was shut down; no further calls are accepted.
    #[error("Client is shut down{}: {message}", format_context(.context))]
    ShutDown { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Kernel error{}: {source}", format_context(.context))]
    Kernel { source: KernelError, context: Option<Cow<'static, str>> },

    #[error("Event bus error{}: {source}", format_context(.context))]
    Bus { source: EventBusError, context: Option<Cow<'static, str>> },

    #[error("Internal client error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
