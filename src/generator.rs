use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::card::{CardContent, build_content};
use crate::config::CardConfig;
use crate::error::CardError;
use crate::metrics::compute_metrics;
use crate::nba_client::{NbaStatsClient, StatsProvider};
use crate::player_cache::{FileCache, MemoryCache, PlayerCache};
use crate::retrieval::StatsRetriever;
use crate::retry::RetryPolicy;

pub struct CardGenerator<P, C> {
    retriever: StatsRetriever<P, C>,
}

impl CardGenerator<NbaStatsClient, Box<dyn PlayerCache>> {
    /// Wires the stats.nba.com client and the configured cache.
    pub fn from_config(cfg: &CardConfig) -> Result<Self> {
        let provider = NbaStatsClient::new(cfg)?;
        let cache: Box<dyn PlayerCache> = match (cfg.cache_enabled, cfg.cache_dir.as_ref()) {
            (true, Some(dir)) => Box::new(FileCache::new(dir.clone(), cfg.cache_ttl)),
            _ => Box::new(MemoryCache::new(cfg.cache_ttl)),
        };
        let policy = RetryPolicy::new(cfg.max_attempts, cfg.base_delay);
        Ok(Self::new(StatsRetriever::new(
            provider,
            cache,
            cfg.season.clone(),
            policy,
        )))
    }
}

impl<P: StatsProvider, C: PlayerCache> CardGenerator<P, C> {
    pub fn new(retriever: StatsRetriever<P, C>) -> Self {
        Self { retriever }
    }

    pub fn generate_card(&self, player_name: &str) -> Result<CardContent, CardError> {
        let snapshot = self.retriever.get_player_stats(player_name)?;
        let metrics = compute_metrics(&snapshot.record.totals, &snapshot.league);
        info!(
            player = %snapshot.record.identity.canonical_name,
            metrics = metrics.len(),
            "card content built"
        );
        Ok(build_content(&snapshot.record, &metrics, Utc::now()))
    }
}
