#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toggled {
    pub name: String,
    pub enabled: bool,
}

impl Toggled {
    pub fn new(name: &str, enabled: bool) -> Self {
        Self { name: name.to_owned(), enabled }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice(pub u32);
