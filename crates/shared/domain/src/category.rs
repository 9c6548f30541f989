use crate::constants::{COMBAT, EXPLOIT, FUN, MISC, MOVEMENT, PLAYER, RENDER, WORLD};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Grouping tag of a module, used for menus and persistence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Combat,
    Player,
    Movement,
    Render,
    World,
    Misc,
    Exploit,
    Fun,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Combat,
        Self::Player,
        Self::Movement,
        Self::Render,
        Self::World,
        Self::Misc,
        Self::Exploit,
        Self::Fun,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => COMBAT,
            Self::Player => PLAYER,
            Self::Movement => MOVEMENT,
            Self::Render => RENDER,
            Self::World => WORLD,
            Self::Misc => MISC,
            Self::Exploit => EXPLOIT,
            Self::Fun => FUN,
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }

    /// The single-bit set for this category.
    #[must_use]
    pub const fn flag(self) -> CategorySet {
        match self {
            Self::Combat => CategorySet::COMBAT,
            Self::Player => CategorySet::PLAYER,
            Self::Movement => CategorySet::MOVEMENT,
            Self::Render => CategorySet::RENDER,
            Self::World => CategorySet::WORLD,
            Self::Misc => CategorySet::MISC,
            Self::Exploit => CategorySet::EXPLOIT,
            Self::Fun => CategorySet::FUN,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of categories, used for filtering and for persistence policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CategorySet: u16 {
        const COMBAT = 1 << 0;
        const PLAYER = 1 << 1;
        const MOVEMENT = 1 << 2;
        const RENDER = 1 << 3;
        const WORLD = 1 << 4;
        const MISC = 1 << 5;
        const EXPLOIT = 1 << 6;
        const FUN = 1 << 7;

        const ALL = Self::COMBAT.bits()
            | Self::PLAYER.bits()
            | Self::MOVEMENT.bits()
            | Self::RENDER.bits()
            | Self::WORLD.bits()
            | Self::MISC.bits()
            | Self::EXPLOIT.bits()
            | Self::FUN.bits();

        /// Categories whose enabled flag is written to snapshots by default.
        /// Cosmetic and utility modules start from their default state every run.
        const PERSISTED = Self::ALL.bits()
            & !Self::MISC.bits()
            & !Self::FUN.bits()
            & !Self::RENDER.bits();
    }
}

impl CategorySet {
    #[must_use]
    pub const fn includes(self, category: Category) -> bool {
        self.contains(category.flag())
    }
}

impl Default for CategorySet {
    fn default() -> Self {
        Self::PERSISTED
    }
}

impl From<&str> for CategorySet {
    fn from(s: &str) -> Self {
        match s {
            "all" | "*" => Self::ALL,
            other => Category::parse(other).map_or_else(Self::empty, Category::flag),
        }
    }
}

impl From<u16> for CategorySet {
    fn from(bits: u16) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for CategorySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let names: Vec<&str> =
            Category::ALL.into_iter().filter(|c| self.includes(*c)).map(Category::as_str).collect();
        names.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Self::empty(), |set, name| {
            let parsed = Self::from(name.as_str());
            if parsed.is_empty() {
                Err(serde::de::Error::custom(format!("unknown category '{name}'")))
            } else {
                Ok(set | parsed)
            }
        })
    }
}
