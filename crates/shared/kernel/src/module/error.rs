use std::borrow::Cow;

/// Errors raised by module behaviours from their callbacks.
#[hotbar_derive::hotbar_error]
pub enum ModuleError {
    #[error("Module callback failed{}: {message}", format_context(.context))]
    Failed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal module error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ModuleError {
    pub fn failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Failed { message: message.into(), context: None }
    }
}
