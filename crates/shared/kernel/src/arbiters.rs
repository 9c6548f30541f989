use crate::request::RequestHandler;
use hotbar_domain::input::{ClickRequest, Rotation};

/// The shared outputs modules compete for.
///
/// Click grants are consumed (popped) by the host once per tick; rotation stays owned by its
/// winner until the request expires.
#[derive(Debug, Default)]
pub struct Arbiters {
    pub attack: RequestHandler<ClickRequest>,
    pub interact: RequestHandler<ClickRequest>,
    pub rotation: RequestHandler<Rotation>,
}

impl Arbiters {
    /// Ages every queue by one tick.
    pub fn tick(&mut self) {
        self.attack.tick(1);
        self.interact.tick(1);
        self.rotation.tick(1);
    }

    pub fn clear(&mut self) {
        self.attack.clear();
        self.interact.clear();
        self.rotation.clear();
    }
}
