use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::{DerivedMetric, MetricKind};
use crate::player::PlayerRecord;

pub const DATA_CREDIT: &str = "Data via stats.nba.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear blend, truncating toward zero.
    pub fn lerp(self, other: Rgb, ratio: f64) -> Rgb {
        let ratio = ratio.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - ratio) + b as f64 * ratio) as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTheme {
    pub background: Rgb,
    pub text: Rgb,
    pub poor: Rgb,
    pub neutral: Rgb,
    pub excellent: Rgb,
}

impl Default for CardTheme {
    fn default() -> Self {
        Self {
            background: Rgb::new(0x1E, 0x1E, 0x1E),
            text: Rgb::new(0xFF, 0xFF, 0xFF),
            poor: Rgb::new(0xFF, 0x4B, 0x4B),
            neutral: Rgb::new(0x80, 0x80, 0x80),
            excellent: Rgb::new(0x4B, 0x9E, 0xFF),
        }
    }
}

impl CardTheme {
    /// Poor at 0, neutral at 50, excellent at 100.
    pub fn percentile_color(&self, percentile: u8) -> Rgb {
        let p = f64::from(percentile.min(100));
        if p < 50.0 {
            self.poor.lerp(self.neutral, p / 50.0)
        } else {
            self.neutral.lerp(self.excellent, (p - 50.0) / 50.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardSection {
    Basic,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRow {
    pub section: CardSection,
    pub label: String,
    pub value: String,
    pub percentile: Option<u8>,
    pub color: Option<Rgb>,
}

impl CardRow {
    fn basic(label: &str, value: String) -> Self {
        Self {
            section: CardSection::Basic,
            label: label.to_string(),
            value,
            percentile: None,
            color: None,
        }
    }

    pub fn text(&self) -> String {
        match self.percentile {
            Some(p) => format!("{}: {} ({} percentile)", self.label, self.value, ordinal(p)),
            None => format!("{}: {}", self.label, self.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardContent {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<CardRow>,
    pub footer: Vec<String>,
    pub theme: CardTheme,
}

impl CardContent {
    pub fn rows_in(&self, section: CardSection) -> impl Iterator<Item = &CardRow> {
        self.rows.iter().filter(move |r| r.section == section)
    }
}

/// Suggested image file name for a card, derived from the name the user
/// searched for.
pub fn card_file_name(player_name: &str) -> String {
    let stem = player_name.trim().replace(' ', "_").to_lowercase();
    format!("{stem}_stats_card.png")
}

pub fn build_content(
    record: &PlayerRecord,
    metrics: &[DerivedMetric],
    generated_at: DateTime<Utc>,
) -> CardContent {
    let theme = CardTheme::default();
    let totals = &record.totals;
    let profile = &record.profile;

    let mut rows = vec![
        CardRow::basic("Games Played", totals.games_played.to_string()),
        CardRow::basic("Points", format!("{:.1}", totals.points)),
        CardRow::basic("Rebounds", format!("{:.1}", totals.rebounds)),
        CardRow::basic("Assists", format!("{:.1}", totals.assists)),
        CardRow::basic("FG%", pct(totals.field_goal_pct)),
        CardRow::basic("3P%", pct(totals.three_point_pct)),
        CardRow::basic("FT%", pct(totals.free_throw_pct)),
    ];

    for m in metrics {
        let value = match m.kind {
            MetricKind::TrueShootingPct => pct(m.value),
            _ => format!("{:.1}", m.value),
        };
        rows.push(CardRow {
            section: CardSection::Advanced,
            label: m.kind.label().to_string(),
            value,
            percentile: Some(m.percentile),
            color: Some(theme.percentile_color(m.percentile)),
        });
    }

    let title = if profile.display_name.is_empty() {
        record.identity.canonical_name.clone()
    } else {
        profile.display_name.clone()
    };
    let team = format!("{} {}", profile.team_city, profile.team_name);
    let subtitle = match (team.trim(), profile.position.trim()) {
        ("", "") => String::new(),
        (team, "") => team.to_string(),
        ("", pos) => pos.to_string(),
        (team, pos) => format!("{team} | {pos}"),
    };

    CardContent {
        title,
        subtitle,
        rows,
        footer: vec![
            format!("Generated on {}", generated_at.format("%Y-%m-%d %H:%M")),
            DATA_CREDIT.to_string(),
        ],
        theme,
    }
}

fn pct(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn ordinal(n: u8) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
