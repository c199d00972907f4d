use crate::color::{HexColor, EMERALD_ACCENT, NEUTRAL_GRAY, RUBY_ACCENT};
use serde::{Deserialize, Serialize};

/// One of the two fixed color-candidate positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Emerald,
    Ruby,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Emerald, Slot::Ruby];

    pub fn name(self) -> &'static str {
        match self {
            Slot::Emerald => "emerald",
            Slot::Ruby => "ruby",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Emerald => "EMERALD",
            Slot::Ruby => "RUBY",
        }
    }

    /// Border color of gallery swatches committed from this slot.
    pub fn accent(self) -> HexColor {
        match self {
            Slot::Emerald => EMERALD_ACCENT,
            Slot::Ruby => RUBY_ACCENT,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::Emerald => Slot::Ruby,
            Slot::Ruby => Slot::Emerald,
        }
    }
}

/// Named pair of initial candidate colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    /// Emerald and ruby shades.
    #[default]
    Brand,
    /// Neutral gray for both slots.
    Neutral,
}

impl Preset {
    pub fn color(self, slot: Slot) -> HexColor {
        match self {
            Preset::Brand => slot.accent(),
            Preset::Neutral => NEUTRAL_GRAY,
        }
    }
}

/// Current, not yet committed, color of each slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    emerald: HexColor,
    ruby: HexColor,
}

impl SelectionState {
    pub fn new(preset: Preset) -> Self {
        Self {
            emerald: preset.color(Slot::Emerald),
            ruby: preset.color(Slot::Ruby),
        }
    }

    pub fn get(&self, slot: Slot) -> HexColor {
        match slot {
            Slot::Emerald => self.emerald,
            Slot::Ruby => self.ruby,
        }
    }

    pub fn set(&mut self, slot: Slot, color: HexColor) {
        match slot {
            Slot::Emerald => self.emerald = color,
            Slot::Ruby => self.ruby = color,
        }
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(Preset::default())
    }
}
