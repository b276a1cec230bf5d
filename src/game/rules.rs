use serde::{Deserialize, Serialize};

/// The compensation in points White gets for going second under area scoring.
pub const CHINESE_KOMI: f64 = 7.5;

/// The compensation in points White gets for going second under territory scoring.
pub const JAPANESE_KOMI: f64 = 6.5;

/// Which board repetitions are forbidden.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum KoRule {
    /// Only the immediate recreation of the previous position is forbidden.
    #[default]
    Simple,
    /// No earlier board position of the variation may be recreated.
    SuperkoPositional,
    /// No earlier board position with the same side to move may be recreated.
    SuperkoSituational,
}

impl KoRule {
    /// Returns true for either of the superko variants.
    #[must_use]
    pub fn is_superko(self) -> bool {
        self != KoRule::Simple
    }
}

/// How the finished game is counted.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ScoringSystem {
    /// Stones on the board plus surrounded empty points.
    #[default]
    Area,
    /// Surrounded empty points plus prisoners.
    Territory,
}

/// How many consecutive passes move the game into life-and-death settling.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum LifeAndDeathSettlingRule {
    /// Two consecutive passes end the game.
    #[default]
    TwoPasses,
    /// Three consecutive passes end the game.
    ThreePasses,
}

/// Whether four consecutive passes end the game outright.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum FourPassesRule {
    /// Four passes have no special effect.
    #[default]
    NoEffect,
    /// Four consecutive passes end the game.
    FourPassesEndTheGame,
}

/// Who may play during a life-and-death dispute.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum DisputeResolutionRule {
    /// Players alternate as in normal play.
    #[default]
    AlternatingPlay,
    /// Either player may play consecutive moves.
    FreePlay,
}

/// The rule selections of a game. The axes are independent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    /// The repetition rule.
    pub ko_rule: KoRule,
    /// The counting method.
    pub scoring_system: ScoringSystem,
    /// The pass count that starts life-and-death settling.
    pub life_and_death_settling_rule: LifeAndDeathSettlingRule,
    /// Whether four passes end the game.
    pub four_passes_rule: FourPassesRule,
    /// Who may move during disputes.
    pub dispute_resolution_rule: DisputeResolutionRule,
}

impl Rules {
    /// The default komi for the selected scoring system.
    #[must_use]
    pub fn default_komi(&self) -> f64 {
        match self.scoring_system {
            ScoringSystem::Area => CHINESE_KOMI,
            ScoringSystem::Territory => JAPANESE_KOMI,
        }
    }
}
