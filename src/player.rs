use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub canonical_name: String,
    pub provider_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: u64,
    pub display_name: String,
    pub team_city: String,
    pub team_name: String,
    pub position: String,
}

/// Season averages for one player, as reported per game by the provider.
/// Percentages are fractions in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlayerGameTotals {
    pub player_id: u64,
    pub player_name: String,
    pub games_played: u32,
    pub minutes: f64,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub field_goals_made: f64,
    pub field_goals_attempted: f64,
    pub field_goal_pct: f64,
    pub three_point_pct: f64,
    pub free_throw_pct: f64,
    pub free_throws_attempted: f64,
}

/// Every league player's totals for one season. Reference data only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LeagueTotals {
    pub season: String,
    pub players: Vec<PlayerGameTotals>,
}

impl LeagueTotals {
    pub fn find(&self, player_id: u64) -> Option<&PlayerGameTotals> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub identity: PlayerIdentity,
    pub profile: PlayerProfile,
    pub totals: PlayerGameTotals,
}

/// A resolved player together with the distribution they are ranked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub record: PlayerRecord,
    pub league: LeagueTotals,
}

/// Lowercase, trim, and collapse inner whitespace. Used for cache keys and
/// name matching.
pub fn normalize_player_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
