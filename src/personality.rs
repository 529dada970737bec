//! Personality modes the widget can present

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityMode {
    Serious,
    Goofy,
    Creative,
    #[default]
    Adaptive,
    Professional,
    Casual,
}

impl PersonalityMode {
    /// Cycling order used by swipes and Alt+1..6
    pub const ALL: [PersonalityMode; 6] = [
        PersonalityMode::Serious,
        PersonalityMode::Goofy,
        PersonalityMode::Creative,
        PersonalityMode::Adaptive,
        PersonalityMode::Professional,
        PersonalityMode::Casual,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }

    /// Mode bound to digit `n` (1-based) of the Alt shortcuts
    pub fn from_digit(n: u32) -> Option<Self> {
        let n = usize::try_from(n).ok()?;
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            PersonalityMode::Serious => "Serious",
            PersonalityMode::Goofy => "Goofy",
            PersonalityMode::Creative => "Creative",
            PersonalityMode::Adaptive => "Adaptive",
            PersonalityMode::Professional => "Professional",
            PersonalityMode::Casual => "Casual",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            PersonalityMode::Serious => "\u{1F3AF}",
            PersonalityMode::Goofy => "\u{1F3AA}",
            PersonalityMode::Creative => "\u{2728}",
            PersonalityMode::Adaptive => "\u{1F31F}",
            PersonalityMode::Professional => "\u{1F4BC}",
            PersonalityMode::Casual => "\u{1F60A}",
        }
    }
}
