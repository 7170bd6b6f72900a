use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::CardConfig;
use crate::error::FetchError;
use crate::http_client::build_http_client;
use crate::player::{
    LeagueTotals, PlayerGameTotals, PlayerIdentity, PlayerProfile, normalize_player_name,
};

const LEAGUE_ID: &str = "00";

/// Single-shot queries against the stats provider. Implementations must not
/// retry; callers own the retry policy.
pub trait StatsProvider {
    fn find_player(&self, name: &str) -> Result<Option<PlayerIdentity>, FetchError>;
    fn fetch_profile(&self, provider_id: u64) -> Result<PlayerProfile, FetchError>;
    fn fetch_league_totals(&self, season: &str) -> Result<LeagueTotals, FetchError>;
}

pub struct NbaStatsClient {
    client: Client,
    base_url: String,
    season: String,
}

impl NbaStatsClient {
    pub fn new(cfg: &CardConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(cfg.request_timeout)?,
            base_url: cfg.base_url.clone(),
            season: cfg.season.clone(),
        })
    }

    fn get_json(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, "stats request");
        let resp = self.client.get(&url).query(query).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(FetchError::Provider(format!("http {status} from {endpoint}")));
        }
        Ok(body)
    }
}

impl StatsProvider for NbaStatsClient {
    fn find_player(&self, name: &str) -> Result<Option<PlayerIdentity>, FetchError> {
        let body = self.get_json(
            "commonallplayers",
            &[
                ("LeagueID", LEAGUE_ID),
                ("Season", self.season.as_str()),
                ("IsOnlyCurrentSeason", "1"),
            ],
        )?;
        let index = parse_player_index_json(&body).map_err(provider_err)?;
        debug!(players = index.len(), "player index loaded");
        Ok(match_player_name(&index, name))
    }

    fn fetch_profile(&self, provider_id: u64) -> Result<PlayerProfile, FetchError> {
        let id = provider_id.to_string();
        let body = self.get_json(
            "commonplayerinfo",
            &[("PlayerID", id.as_str()), ("LeagueID", LEAGUE_ID)],
        )?;
        parse_player_profile_json(&body)
            .map_err(provider_err)?
            .ok_or_else(|| FetchError::NotFound(format!("player {provider_id}")))
    }

    fn fetch_league_totals(&self, season: &str) -> Result<LeagueTotals, FetchError> {
        let body = self.get_json(
            "leaguedashplayerstats",
            &[
                ("LeagueID", LEAGUE_ID),
                ("Season", season),
                ("SeasonType", "Regular Season"),
                ("PerMode", "PerGame"),
                ("MeasureType", "Base"),
                ("PaceAdjust", "N"),
                ("PlusMinus", "N"),
                ("Rank", "N"),
                ("LastNGames", "0"),
                ("Month", "0"),
                ("OpponentTeamID", "0"),
                ("PORound", "0"),
                ("Period", "0"),
                ("TeamID", "0"),
                ("TwoWay", "0"),
                ("College", ""),
                ("Conference", ""),
                ("Country", ""),
                ("DateFrom", ""),
                ("DateTo", ""),
                ("Division", ""),
                ("DraftPick", ""),
                ("DraftYear", ""),
                ("GameScope", ""),
                ("GameSegment", ""),
                ("Height", ""),
                ("Location", ""),
                ("Outcome", ""),
                ("PlayerExperience", ""),
                ("PlayerPosition", ""),
                ("SeasonSegment", ""),
                ("ShotClockRange", ""),
                ("StarterBench", ""),
                ("VsConference", ""),
                ("VsDivision", ""),
                ("Weight", ""),
            ],
        )?;
        let players = parse_league_totals_json(&body).map_err(provider_err)?;
        info!(season, players = players.len(), "league totals fetched");
        Ok(LeagueTotals {
            season: season.to_string(),
            players,
        })
    }
}

fn provider_err(err: anyhow::Error) -> FetchError {
    FetchError::Provider(format!("{err:#}"))
}

/// One row of the provider's player index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPlayer {
    pub identity: PlayerIdentity,
    pub active: bool,
}

/// Exact normalized full-name match first, then names containing the query.
/// Within each tier, players on a current roster win over retired ones.
pub fn match_player_name(index: &[IndexedPlayer], query: &str) -> Option<PlayerIdentity> {
    let needle = normalize_player_name(query);
    if needle.is_empty() {
        return None;
    }
    let names: Vec<String> = index
        .iter()
        .map(|p| normalize_player_name(&p.identity.canonical_name))
        .collect();
    best_hit(index, &names, |name| name == needle)
        .or_else(|| best_hit(index, &names, |name| name.contains(needle.as_str())))
        .map(|p| p.identity.clone())
}

fn best_hit<'a>(
    index: &'a [IndexedPlayer],
    names: &[String],
    matches: impl Fn(&str) -> bool,
) -> Option<&'a IndexedPlayer> {
    let mut hits = index
        .iter()
        .zip(names)
        .filter(|(_, name)| matches(name.as_str()))
        .map(|(player, _)| player);
    let first = hits.next()?;
    if first.active {
        return Some(first);
    }
    Some(hits.find(|p| p.active).unwrap_or(first))
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(rename = "resultSets", default)]
    result_sets: Option<ResultSets>,
    #[serde(rename = "resultSet", default)]
    result_set: Option<ResultSet>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResultSets {
    Many(Vec<ResultSet>),
    One(ResultSet),
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    #[serde(default)]
    name: String,
    #[serde(default)]
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    fn column(&self, header: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(header))
            .ok_or_else(|| anyhow!("result set {} has no {header} column", self.name))
    }
}

fn parse_result_set(raw: &str, name: &str) -> Result<Option<ResultSet>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let resp: StatsResponse = serde_json::from_str(trimmed).context("invalid stats json")?;
    let mut sets = match resp.result_sets {
        Some(ResultSets::Many(sets)) => sets,
        Some(ResultSets::One(set)) => vec![set],
        None => Vec::new(),
    };
    sets.extend(resp.result_set);
    if sets.len() == 1 && sets[0].name.is_empty() {
        return Ok(sets.pop());
    }
    Ok(sets.into_iter().find(|s| s.name.eq_ignore_ascii_case(name)))
}

pub fn parse_player_index_json(raw: &str) -> Result<Vec<IndexedPlayer>> {
    let Some(set) = parse_result_set(raw, "CommonAllPlayers")? else {
        return Ok(Vec::new());
    };
    let id_col = set.column("PERSON_ID")?;
    let name_col = set.column("DISPLAY_FIRST_LAST")?;
    // Absent on some index variants; treat everyone as active then.
    let status_col = set.column("ROSTERSTATUS").ok();
    Ok(set
        .row_set
        .iter()
        .filter_map(|row| {
            let provider_id = cell_u64(row.get(id_col))?;
            let canonical_name = cell_str(row.get(name_col))?;
            let active = status_col.is_none_or(|col| roster_active(row.get(col)));
            Some(IndexedPlayer {
                identity: PlayerIdentity {
                    canonical_name,
                    provider_id,
                },
                active,
            })
        })
        .collect())
}

fn roster_active(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f > 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("active")
        }
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}

pub fn parse_player_profile_json(raw: &str) -> Result<Option<PlayerProfile>> {
    let Some(set) = parse_result_set(raw, "CommonPlayerInfo")? else {
        return Ok(None);
    };
    let Some(row) = set.row_set.first() else {
        return Ok(None);
    };
    let player_id = cell_u64(row.get(set.column("PERSON_ID")?))
        .context("profile row missing PERSON_ID")?;
    let text = |header: &str| -> Result<String> {
        Ok(cell_str(row.get(set.column(header)?)).unwrap_or_default())
    };
    Ok(Some(PlayerProfile {
        player_id,
        display_name: text("DISPLAY_FIRST_LAST")?,
        team_city: text("TEAM_CITY")?,
        team_name: text("TEAM_NAME")?,
        position: text("POSITION")?,
    }))
}

pub fn parse_league_totals_json(raw: &str) -> Result<Vec<PlayerGameTotals>> {
    let Some(set) = parse_result_set(raw, "LeagueDashPlayerStats")? else {
        return Ok(Vec::new());
    };
    let id = set.column("PLAYER_ID")?;
    let name = set.column("PLAYER_NAME")?;
    let gp = set.column("GP")?;
    let min = set.column("MIN")?;
    let pts = set.column("PTS")?;
    let reb = set.column("REB")?;
    let ast = set.column("AST")?;
    let fgm = set.column("FGM")?;
    let fga = set.column("FGA")?;
    let fg_pct = set.column("FG_PCT")?;
    let fg3_pct = set.column("FG3_PCT")?;
    let ft_pct = set.column("FT_PCT")?;
    let fta = set.column("FTA")?;

    let mut out = Vec::with_capacity(set.row_set.len());
    for row in &set.row_set {
        let Some(player_id) = cell_u64(row.get(id)) else {
            continue;
        };
        out.push(PlayerGameTotals {
            player_id,
            player_name: cell_str(row.get(name)).unwrap_or_default(),
            games_played: cell_u64(row.get(gp))
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(0),
            minutes: cell_f64(row.get(min)),
            points: cell_f64(row.get(pts)),
            rebounds: cell_f64(row.get(reb)),
            assists: cell_f64(row.get(ast)),
            field_goals_made: cell_f64(row.get(fgm)),
            field_goals_attempted: cell_f64(row.get(fga)),
            field_goal_pct: cell_f64(row.get(fg_pct)).clamp(0.0, 1.0),
            three_point_pct: cell_f64(row.get(fg3_pct)).clamp(0.0, 1.0),
            free_throw_pct: cell_f64(row.get(ft_pct)).clamp(0.0, 1.0),
            free_throws_attempted: cell_f64(row.get(fta)),
        });
    }
    Ok(out)
}

fn cell_u64(v: Option<&Value>) -> Option<u64> {
    match v? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn cell_f64(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn cell_str(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, id: u64, active: bool) -> IndexedPlayer {
        IndexedPlayer {
            identity: PlayerIdentity {
                canonical_name: name.to_string(),
                provider_id: id,
            },
            active,
        }
    }

    #[test]
    fn exact_match_beats_substring() {
        let index = vec![
            ident("Bronny James", 1641733, true),
            ident("LeBron James", 2544, true),
            ident("James Harden", 201935, true),
        ];
        assert_eq!(match_player_name(&index, "lebron  JAMES").unwrap().provider_id, 2544);
        assert_eq!(match_player_name(&index, "harden").unwrap().provider_id, 201935);
        assert!(match_player_name(&index, "Zzzznonexistent").is_none());
        assert!(match_player_name(&index, "   ").is_none());
    }

    #[test]
    fn active_players_win_within_a_tier() {
        let index = vec![
            ident("Dell Curry", 209, false),
            ident("Stephen Curry", 201939, true),
            ident("Seth Curry", 203552, true),
        ];
        assert_eq!(match_player_name(&index, "curry").unwrap().provider_id, 201939);
        // An exact name still beats an active substring hit.
        assert_eq!(match_player_name(&index, "Dell Curry").unwrap().provider_id, 209);

        let retired_only = vec![ident("Dell Curry", 209, false)];
        assert_eq!(match_player_name(&retired_only, "curry").unwrap().provider_id, 209);
    }

    #[test]
    fn roster_status_accepts_flags_and_words() {
        assert!(roster_active(Some(&Value::from(1))));
        assert!(!roster_active(Some(&Value::from(0))));
        assert!(roster_active(Some(&Value::from("Active"))));
        assert!(!roster_active(Some(&Value::Null)));
    }

    #[test]
    fn cells_accept_numbers_and_strings() {
        assert_eq!(cell_u64(Some(&Value::from("42"))), Some(42));
        assert_eq!(cell_u64(Some(&Value::from(7.0))), Some(7));
        assert_eq!(cell_f64(Some(&Value::Null)), 0.0);
        assert_eq!(cell_str(Some(&Value::from("  "))), None);
    }
}
