use crate::error::ClickerError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// How the clicks-per-second target is picked each second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Technique {
    /// Uniformly random within the configured range, re-rolled every second.
    #[default]
    Normal,
    /// The midpoint of the range, every second.
    Stabilized,
}

impl Technique {
    pub const NAMES: [&'static str; 2] = ["Normal", "Stabilized"];

    pub fn from_choice(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("normal") {
            Some(Self::Normal)
        } else if name.eq_ignore_ascii_case("stabilized") {
            Some(Self::Stabilized)
        } else {
            None
        }
    }
}

/// Decides how many clicks fall into the current tick.
///
/// The per-second target is spread over the ticks of that second with an integer budget measured
/// in `1 / tick_rate` clicks, so the remainder carries over and no click is lost to rounding.
/// Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct ClickScheduler {
    rng: StdRng,
    cps: RangeInclusive<u32>,
    technique: Technique,
    tick_rate: u32,
    current_cps: u32,
    budget: u32,
    tick_in_second: u32,
}

impl ClickScheduler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            cps: 1..=1,
            technique: Technique::default(),
            tick_rate: hotbar_domain::constants::DEFAULT_TICK_RATE,
            current_cps: 0,
            budget: 0,
            tick_in_second: 0,
        }
    }

    /// Applies the current settings; takes effect from the next second.
    ///
    /// # Errors
    /// * [`ClickerError::InvalidCps`] for a negative or inverted range.
    /// * [`ClickerError::InvalidTickRate`] for a zero tick rate.
    pub fn configure(
        &mut self,
        cps: RangeInclusive<i32>,
        technique: Technique,
        tick_rate: u32,
    ) -> Result<(), ClickerError> {
        let (low, high) = (*cps.start(), *cps.end());
        let invalid = || ClickerError::InvalidCps {
            message: format!("{low}..={high}").into(),
            context: None,
        };
        let low = u32::try_from(low).map_err(|_| invalid())?;
        let high = u32::try_from(high).map_err(|_| invalid())?;
        if low > high {
            return Err(invalid());
        }
        if tick_rate == 0 {
            return Err(ClickerError::InvalidTickRate {
                message: "tick rate must be greater than zero".into(),
                context: None,
            });
        }

        if tick_rate != self.tick_rate {
            self.reset();
        }
        self.cps = low..=high;
        self.technique = technique;
        self.tick_rate = tick_rate;
        Ok(())
    }

    /// Forgets the carried budget; the next tick starts a new second.
    pub fn reset(&mut self) {
        self.budget = 0;
        self.tick_in_second = 0;
        self.current_cps = 0;
    }

    /// The target rolled for the current second.
    pub const fn current_cps(&self) -> u32 {
        self.current_cps
    }

    /// Calls `click` once per click due in this tick; returns how many it accepted.
    pub fn clicks(&mut self, mut click: impl FnMut() -> bool) -> u32 {
        if self.tick_in_second == 0 {
            self.current_cps = self.roll();
        }
        self.tick_in_second = (self.tick_in_second + 1) % self.tick_rate;

        self.budget += self.current_cps;
        let due = self.budget / self.tick_rate;
        self.budget %= self.tick_rate;

        (0..due).map(|_| click()).filter(|accepted| *accepted).fold(0, |n, _| n + 1)
    }

    fn roll(&mut self) -> u32 {
        match self.technique {
            Technique::Normal => self.rng.random_range(self.cps.clone()),
            Technique::Stabilized => {
                let (low, high) = (*self.cps.start(), *self.cps.end());
                low + (high - low) / 2
            },
        }
    }
}
