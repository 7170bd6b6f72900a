use serde::{Deserialize, Serialize};

use crate::player::{LeagueTotals, PlayerGameTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Per,
    TrueShootingPct,
    AssistRate,
    ReboundRate,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Per,
        MetricKind::TrueShootingPct,
        MetricKind::AssistRate,
        MetricKind::ReboundRate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Per => "PER",
            MetricKind::TrueShootingPct => "TS%",
            MetricKind::AssistRate => "AST",
            MetricKind::ReboundRate => "REB",
        }
    }

    /// Raw metric value. NaN when the formula needs games played and there
    /// are none.
    pub fn derive(self, t: &PlayerGameTotals) -> f64 {
        let per_game = |v: f64| {
            if t.games_played == 0 {
                f64::NAN
            } else {
                v / t.games_played as f64
            }
        };
        match self {
            MetricKind::Per => per_game(t.points + t.rebounds + t.assists),
            MetricKind::TrueShootingPct => true_shooting(t),
            MetricKind::AssistRate => per_game(t.assists),
            MetricKind::ReboundRate => per_game(t.rebounds),
        }
    }
}

fn true_shooting(t: &PlayerGameTotals) -> f64 {
    let denom = 2.0 * (t.field_goals_attempted + 0.44 * t.free_throws_attempted);
    if denom == 0.0 { 0.0 } else { t.points / denom }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    pub kind: MetricKind,
    pub value: f64,
    pub percentile: u8,
}

/// Share of `distribution` at or below `value`, as a rounded 0–100 rank.
/// `None` for an empty distribution.
pub fn calculate_percentile(value: f64, distribution: &[f64]) -> Option<u8> {
    if distribution.is_empty() {
        return None;
    }
    let at_or_below = distribution.iter().filter(|x| **x <= value).count();
    let pct = (100.0 * at_or_below as f64 / distribution.len() as f64).round();
    Some(pct.clamp(0.0, 100.0) as u8)
}

pub fn league_distribution(kind: MetricKind, league: &LeagueTotals) -> Vec<f64> {
    league
        .players
        .iter()
        .filter(|p| p.games_played > 0)
        .map(|p| kind.derive(p))
        .filter(|v| v.is_finite())
        .collect()
}

pub fn compute_metrics(player: &PlayerGameTotals, league: &LeagueTotals) -> Vec<DerivedMetric> {
    MetricKind::ALL
        .iter()
        .filter_map(|&kind| {
            let value = kind.derive(player);
            if !value.is_finite() {
                return None;
            }
            let percentile = calculate_percentile(value, &league_distribution(kind, league))?;
            Some(DerivedMetric {
                kind,
                value,
                percentile,
            })
        })
        .collect()
}
