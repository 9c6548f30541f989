use hotbar_kernel::error::ModuleError;
use std::borrow::Cow;

#[hotbar_derive::hotbar_error]
pub enum ClickerError {
    #[error("Invalid clicks per second{}: {message}", format_context(.context))]
    InvalidCps { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid tick rate{}: {message}", format_context(.context))]
    InvalidTickRate { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal clicker error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl From<ClickerError> for ModuleError {
    fn from(err: ClickerError) -> Self {
        Self::Failed { message: err.to_string().into(), context: None }
    }
}
