use hotbar_derive::hotbar_error;
use std::borrow::Cow;

#[hotbar_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Loading '{path}' failed{}: {source}", format_context(.context))]
    Load {
        path: String,
        #[source]
        source: std::num::ParseIntError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err: DemoError = "boom".into();
    let _ = err.to_string();

    let load = DemoError::Load {
        path: "binds.toml".to_owned(),
        source: "x".parse::<i32>().unwrap_err(),
        context: None,
    };
    let _ = load.to_string();
}
