//! Game calendar: day counter, phase of day, and ambient color magic.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Phase of a game day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// Planning phase at the start of the day.
    #[default]
    Birdsong,
    /// Characters act.
    Daylight,
    /// Combat resolution begins.
    Sunset,
    /// End of day cleanup.
    Evening,
}

impl GamePhase {
    /// All phases in day order.
    pub const ALL: [GamePhase; 4] = [
        GamePhase::Birdsong,
        GamePhase::Daylight,
        GamePhase::Sunset,
        GamePhase::Evening,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Birdsong => "Birdsong",
            GamePhase::Daylight => "Daylight",
            GamePhase::Sunset => "Sunset",
            GamePhase::Evening => "Evening",
        }
    }

    /// Parse a phase name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

/// Colors of magic that can be present in a clearing or on a day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MagicColor {
    White,
    Grey,
    Gold,
    Purple,
    Black,
}

impl MagicColor {
    pub const ALL: [MagicColor; 5] = [
        MagicColor::White,
        MagicColor::Grey,
        MagicColor::Gold,
        MagicColor::Purple,
        MagicColor::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MagicColor::White => "White",
            MagicColor::Grey => "Grey",
            MagicColor::Gold => "Gold",
            MagicColor::Purple => "Purple",
            MagicColor::Black => "Black",
        }
    }

    /// Parse a color name, ignoring case. "Gray" is accepted for Grey.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("gray") {
            return Some(MagicColor::Grey);
        }
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

/// The game calendar as seen by quest requirements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Current day, starting at 1.
    pub day: u32,
    /// Current phase within the day.
    pub phase: GamePhase,
    /// Color magic present everywhere today (e.g. seventh-day color).
    #[serde(default)]
    pub day_colors: SmallVec<[MagicColor; 2]>,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            day: 1,
            phase: GamePhase::default(),
            day_colors: SmallVec::new(),
        }
    }
}

impl GameClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by whole days, returning to Birdsong.
    pub fn advance_days(&mut self, days: u32) {
        if days == 0 {
            return;
        }
        self.day = self.day.saturating_add(days);
        self.phase = GamePhase::Birdsong;
        self.day_colors.clear();
    }

    /// Days elapsed since `since` (zero if `since` is in the future).
    #[must_use]
    pub fn days_since(&self, since: u32) -> u32 {
        self.day.saturating_sub(since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_parse() {
        assert_eq!(GamePhase::parse("daylight"), Some(GamePhase::Daylight));
        assert_eq!(GamePhase::parse(" Evening "), Some(GamePhase::Evening));
        assert_eq!(GamePhase::parse("midnight"), None);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!(MagicColor::parse("gray"), Some(MagicColor::Grey));
        assert_eq!(MagicColor::parse("PURPLE"), Some(MagicColor::Purple));
        assert_eq!(MagicColor::parse("green"), None);
    }

    #[test]
    fn test_advance_days() {
        let mut clock = GameClock::new();
        clock.phase = GamePhase::Sunset;
        clock.day_colors.push(MagicColor::Gold);

        clock.advance_days(3);
        assert_eq!(clock.day, 4);
        assert_eq!(clock.phase, GamePhase::Birdsong);
        assert!(clock.day_colors.is_empty());
        assert_eq!(clock.days_since(2), 2);
        assert_eq!(clock.days_since(9), 0);
    }
}
