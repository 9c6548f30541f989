//! String identifiers shared by configuration files, snapshots and the scripting surface.

pub const COMBAT: &str = "combat";
pub const PLAYER: &str = "player";
pub const MOVEMENT: &str = "movement";
pub const RENDER: &str = "render";
pub const WORLD: &str = "world";
pub const MISC: &str = "misc";
pub const EXPLOIT: &str = "exploit";
pub const FUN: &str = "fun";

/// Prefix of every translation key emitted by modules.
pub const TRANSLATION_ROOT: &str = "hotbar.module";

/// Tick rate of the host loop unless configured otherwise.
pub const DEFAULT_TICK_RATE: u32 = 20;
