use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hoopcard::player::{
    LeagueTotals, PlayerGameTotals, PlayerIdentity, PlayerProfile, PlayerRecord, StatsSnapshot,
};
use hoopcard::player_cache::{Clock, FileCache, MemoryCache, PlayerCache};

struct ManualClock(Mutex<DateTime<Utc>>);

impl ManualClock {
    fn new() -> Arc<Self> {
        Arc::new(Self(Mutex::new(Utc::now())))
    }

    fn advance(&self, by: TimeDelta) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

fn snapshot(points: f64) -> StatsSnapshot {
    let totals = PlayerGameTotals {
        player_id: 2544,
        player_name: "LeBron James".to_string(),
        games_played: 71,
        points,
        ..Default::default()
    };
    StatsSnapshot {
        record: PlayerRecord {
            identity: PlayerIdentity {
                canonical_name: "LeBron James".to_string(),
                provider_id: 2544,
            },
            profile: PlayerProfile {
                player_id: 2544,
                display_name: "LeBron James".to_string(),
                team_city: "Los Angeles".to_string(),
                team_name: "Lakers".to_string(),
                position: "Forward".to_string(),
            },
            totals: totals.clone(),
        },
        league: LeagueTotals {
            season: "2023-24".to_string(),
            players: vec![totals],
        },
    }
}

const DAY: Duration = Duration::from_secs(24 * 3600);

#[test]
fn memory_cache_round_trips_within_ttl() {
    let clock = ManualClock::new();
    let cache = MemoryCache::with_clock(DAY, clock.clone());
    let snap = snapshot(25.7);
    cache.put("lebron james", &snap).expect("memory put");
    assert_eq!(cache.get("lebron james"), Some(snap.clone()));

    clock.advance(TimeDelta::hours(23));
    assert_eq!(cache.get("lebron james"), Some(snap));
    assert!(cache.get("stephen curry").is_none());
}

#[test]
fn memory_cache_expires_lazily() {
    let clock = ManualClock::new();
    let cache = MemoryCache::with_clock(DAY, clock.clone());
    cache.put("lebron james", &snapshot(25.7)).expect("memory put");
    clock.advance(TimeDelta::hours(24));
    assert!(cache.get("lebron james").is_none());
}

#[test]
fn put_overwrites_and_restamps() {
    let clock = ManualClock::new();
    let cache = MemoryCache::with_clock(DAY, clock.clone());
    cache.put("k", &snapshot(1.0)).unwrap();
    clock.advance(TimeDelta::hours(20));
    cache.put("k", &snapshot(2.0)).unwrap();
    clock.advance(TimeDelta::hours(20));
    let got = cache.get("k").expect("second write is still fresh");
    assert_eq!(got.record.totals.points, 2.0);
}

#[test]
fn file_cache_round_trips_and_expires() {
    let dir = tempfile::tempdir().expect("tempdir");
    let clock = ManualClock::new();
    let cache = FileCache::with_clock(dir.path().join("cards"), DAY, clock.clone());
    let snap = snapshot(25.7);
    cache.put("lebron james", &snap).expect("file put");
    assert!(dir.path().join("cards").join("lebron_james.json").is_file());
    assert_eq!(cache.get("lebron james"), Some(snap));

    clock.advance(TimeDelta::hours(25));
    assert!(cache.get("lebron james").is_none());
}

#[test]
fn file_cache_ignores_sanitized_name_collisions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = FileCache::new(dir.path(), DAY);
    cache.put("o'neal", &snapshot(1.0)).unwrap();
    assert!(cache.get("o neal").is_none());
    assert!(cache.get("o'neal").is_some());
}

#[test]
fn file_cache_treats_garbage_as_absent() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("lebron_james.json"), "{not json").unwrap();
    let cache = FileCache::new(dir.path(), DAY);
    assert!(cache.get("lebron james").is_none());
}

#[test]
fn file_cache_write_failure_is_an_error_not_a_panic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a dir").unwrap();
    let cache = FileCache::new(blocker.join("cache"), DAY);
    assert!(cache.put("lebron james", &snapshot(1.0)).is_err());
    assert!(cache.get("lebron james").is_none());
}

#[test]
fn concurrent_file_writes_leave_one_readable_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache = Arc::new(FileCache::new(dir.path(), DAY));
    let writers: Vec<_> = (0..8)
        .map(|n| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for _ in 0..20 {
                    cache.put("lebron james", &snapshot(f64::from(n))).expect("put");
                }
            })
        })
        .collect();
    for w in writers {
        w.join().expect("writer thread");
    }

    assert!(cache.get("lebron james").is_some());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
