use tracing::{debug, info, warn};

use crate::error::{CardError, FetchError};
use crate::nba_client::StatsProvider;
use crate::player::{PlayerRecord, StatsSnapshot, normalize_player_name};
use crate::player_cache::PlayerCache;
use crate::retry::{RetryError, RetryPolicy, Sleeper, ThreadSleeper};

/// Resolves a player name into a ranked-ready snapshot: cache first, then the
/// provider under the retry policy.
pub struct StatsRetriever<P, C> {
    provider: P,
    cache: C,
    season: String,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl<P: StatsProvider, C: PlayerCache> StatsRetriever<P, C> {
    pub fn new(provider: P, cache: C, season: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            provider,
            cache,
            season: season.into(),
            policy,
            sleeper: Box::new(ThreadSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: impl Sleeper + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn get_player_stats(&self, player_name: &str) -> Result<StatsSnapshot, CardError> {
        let key = normalize_player_name(player_name);
        let not_found = || CardError::PlayerNotFound {
            name: player_name.trim().to_string(),
        };
        if key.is_empty() {
            return Err(not_found());
        }

        if let Some(snapshot) = self.cache.get(&key) {
            debug!(%key, "player cache hit");
            return Ok(snapshot);
        }
        debug!(%key, "player cache miss");

        let identity = self
            .retry("player lookup", || self.provider.find_player(player_name))
            .map_err(|err| self.escalate(err, player_name))?
            .ok_or_else(not_found)?;

        let profile = self
            .retry("player profile", || self.provider.fetch_profile(identity.provider_id))
            .map_err(|err| self.escalate(err, player_name))?;

        let league = self
            .retry("league totals", || self.provider.fetch_league_totals(&self.season))
            .map_err(|err| self.escalate(err, player_name))?;

        let totals = league
            .find(identity.provider_id)
            .cloned()
            .ok_or(CardError::StatsNotFound {
                player_id: identity.provider_id,
            })?;

        info!(
            player = %identity.canonical_name,
            provider_id = identity.provider_id,
            league_size = league.len(),
            "player stats resolved"
        );

        let snapshot = StatsSnapshot {
            record: PlayerRecord {
                identity,
                profile,
                totals,
            },
            league,
        };

        if let Err(err) = self.cache.put(&key, &snapshot) {
            warn!(%key, error = %err, "player cache write failed");
        }

        Ok(snapshot)
    }

    fn retry<T>(
        &self,
        what: &str,
        op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, RetryError> {
        self.policy.run(what, self.sleeper.as_ref(), op)
    }

    fn escalate(&self, err: RetryError, player_name: &str) -> CardError {
        match err {
            RetryError::Exhausted { attempts, .. } => CardError::ProviderUnavailable { attempts },
            RetryError::Aborted(FetchError::NotFound(_)) => CardError::PlayerNotFound {
                name: player_name.trim().to_string(),
            },
            RetryError::Aborted(other) => CardError::ProviderError(other.to_string()),
        }
    }
}
