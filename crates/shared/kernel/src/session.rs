use hotbar_domain::events::{PlayerInfo, WorldInfo};
use hotbar_domain::input::InputState;

/// The live world/actor context. Side-effecting activation only happens while it is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    world: Option<WorldInfo>,
    player: Option<PlayerInfo>,
}

impl Session {
    #[must_use]
    pub fn new(world: WorldInfo, player: PlayerInfo) -> Self {
        Self { world: Some(world), player: Some(player) }
    }

    /// Both a world and a local player are present.
    pub const fn is_active(&self) -> bool {
        self.world.is_some() && self.player.is_some()
    }

    pub const fn world(&self) -> Option<&WorldInfo> {
        self.world.as_ref()
    }

    pub const fn player(&self) -> Option<&PlayerInfo> {
        self.player.as_ref()
    }

    pub fn clear(&mut self) {
        self.world = None;
        self.player = None;
    }
}

/// Everything a module may observe or touch while one of its callbacks runs.
#[derive(Debug, Default)]
pub struct Environment {
    pub session: Session,
    pub input: InputState,
    pub arbiters: crate::arbiters::Arbiters,
    pub tick: u64,
    pub tick_rate: u32,
}
