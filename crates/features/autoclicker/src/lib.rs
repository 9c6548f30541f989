//! # AutoClicker
//!
//! Clicks automatically while a mouse button is held.
//!
//! The module has two toggleable sides, `Left` (attack, on by default) and `Right` (use, off by
//! default). Each side owns a [`ClickScheduler`] that decides how many clicks fall into the
//! current tick. Instead of pressing keys itself, the module submits a [`ClickRequest`] into the
//! shared attack/interact queue, so the host can arbitrate it against other modules.
//!
//! The left side does not click at blocks outside creative mode, so holding attack on a block
//! keeps mining it.

mod error;
pub mod scheduler;

pub use crate::error::{ClickerError, ClickerErrorExt};
pub use crate::scheduler::{ClickScheduler, Technique};

use hotbar_domain::category::Category;
use hotbar_domain::events::{EventKind, GameEvent};
use hotbar_domain::input::{ClickRequest, CrosshairTarget, MouseButton};
use hotbar_kernel::prelude::*;
use tracing::trace;

pub const NAME: &str = "AutoClicker";

/// Priority of click requests; above idle producers, below combat automation.
pub const CLICK_PRIORITY: u32 = 10;

const LEFT: &str = "Left";
const RIGHT: &str = "Right";
const CPS: &str = "CPS";
const TECHNIQUE: &str = "Technique";

#[derive(Debug)]
pub struct AutoClicker {
    left: ClickScheduler,
    right: ClickScheduler,
}

impl AutoClicker {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { left: ClickScheduler::new(seed), right: ClickScheduler::new(seed.rotate_left(32) ^ 1) }
    }

    /// The registrable module.
    #[must_use]
    pub fn module(seed: u64) -> Module<Self> {
        Module::new(ModuleInfo::new(NAME, Category::Combat), Self::new(seed))
    }

    fn side(button: MouseButton) -> ValueGroup {
        let (enabled, cps) = match button {
            MouseButton::Left => (true, 5..=8),
            MouseButton::Right => (false, 3..=5),
        };
        ValueGroup::toggleable(enabled)
            .with(CPS, ValueNode::Range(RangeValue::new(cps, 1..=20)))
            .with(TECHNIQUE, ValueNode::Choice(ChoiceGroup::new(&Technique::NAMES, "Normal")))
    }

    fn on_tick(&mut self, _event: &GameEvent, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        let input = ctx.input();
        let creative = ctx.session().player().is_some_and(|p| p.creative);
        let should_target_block = creative || input.crosshair != CrosshairTarget::Block;

        if input.attack_pressed && should_target_block {
            self.click(MouseButton::Left, ctx)?;
        }
        if input.use_pressed {
            self.click(MouseButton::Right, ctx)?;
        }
        Ok(())
    }

    fn click(&mut self, button: MouseButton, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        let (path, scheduler) = match button {
            MouseButton::Left => (LEFT, &mut self.left),
            MouseButton::Right => (RIGHT, &mut self.right),
        };
        let Some(side) = ctx.values().group(path) else {
            return Err(ModuleError::from(format!("missing '{path}' settings")));
        };
        if !side.enabled() {
            return Ok(());
        }

        let cps = side.range(CPS).map(RangeValue::get).ok_or("missing CPS setting")?;
        let technique = side
            .choice(TECHNIQUE)
            .and_then(|c| Technique::from_choice(c.active().name()))
            .unwrap_or_default();
        scheduler.configure(cps, technique, ctx.tick_rate())?;

        let count = scheduler.clicks(|| true);
        if count == 0 {
            return Ok(());
        }

        trace!(?button, count, tick = ctx.tick(), "Requesting clicks");
        let id = ctx.id();
        let queue = match button {
            MouseButton::Left => &mut ctx.arbiters.attack,
            MouseButton::Right => &mut ctx.arbiters.interact,
        };
        queue.submit(id, CLICK_PRIORITY, 1, ClickRequest { button, count });
        Ok(())
    }
}

impl ModuleBehavior for AutoClicker {
    fn enable(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.left.reset();
        self.right.reset();
        Ok(())
    }

    fn disable(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        let id = ctx.id();
        ctx.arbiters.attack.withdraw(&id);
        ctx.arbiters.interact.withdraw(&id);
        Ok(())
    }

    fn values() -> ValueGroup {
        ValueGroup::new()
            .with(LEFT, ValueNode::Group(Self::side(MouseButton::Left)))
            .with(RIGHT, ValueNode::Group(Self::side(MouseButton::Right)))
    }

    fn listeners() -> Vec<Listener<Self>> {
        vec![Listener::on(EventKind::Tick, Self::on_tick)]
    }

    fn tag(&self, values: &ValueGroup) -> Option<String> {
        let left = values.group(LEFT).filter(|g| g.enabled())?;
        let cps = left.range(CPS)?;
        Some(format!("{}-{}", cps.low(), cps.high()))
    }
}
