//! Read-through cache of the animals derived from the album.
//!
//! [AnimalFeed] holds a single cache slot for the one configured album. A request is answered
//! from the slot while it is younger than the TTL, otherwise the album is fetched again, every
//! photo is turned into an [AnimalRecord] and the slot is replaced wholesale. The slot lock is
//! held for the whole check-fetch-replace sequence, so concurrent callers hitting an empty or
//! stale slot wait for a single upstream fetch instead of each issuing their own. Callers that
//! queued behind a fetch take its outcome, failures included; only a caller arriving after it
//! completed goes upstream again.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use log::{debug, info, warn};
use time::OffsetDateTime;
use tokio::{sync::Mutex, time::Instant};

use crate::{
    api_types::AnimalRecord,
    error::FetchError,
    graph::{AlbumCredentials, PhotoSource},
};

pub type SourceHandle = Arc<dyn PhotoSource + Send + Sync>;

/// Freshness of the cache slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// No fetch has succeeded yet.
    Empty,
    /// Populated less than one TTL ago.
    Fresh,
    /// Populated, but the TTL has elapsed. The next request refetches.
    Stale,
}

#[derive(Debug)]
struct CacheEntry {
    records: Vec<AnimalRecord>,
    fetched_at: Instant,
    populated_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct Slot {
    entry: Option<CacheEntry>,
    /// Error of the most recent completed fetch, if it failed.
    last_failure: Option<FetchError>,
}

pub struct AnimalFeed {
    source: SourceHandle,
    credentials: Option<AlbumCredentials>,
    ttl: Duration,
    slot: Mutex<Slot>,
    /// Number of completed upstream fetches. Only bumped with `slot` held.
    fetches: AtomicU64,
}

impl AnimalFeed {
    /// Create an empty feed. Missing `credentials` are only reported when the feed is read.
    pub fn new(source: SourceHandle, credentials: Option<AlbumCredentials>, ttl: Duration) -> Self {
        Self {
            source,
            credentials,
            ttl,
            slot: Mutex::new(Slot::default()),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn credentials(&self) -> Result<&AlbumCredentials, FetchError> {
        self.credentials.as_ref().ok_or(FetchError::Configuration)
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        entry.fetched_at.elapsed() < self.ttl
    }

    fn state_of(&self, entry: Option<&CacheEntry>) -> CacheState {
        match entry {
            None => CacheState::Empty,
            Some(entry) if self.is_fresh(entry) => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// Current freshness of the slot. Waits for an in-flight refresh to finish.
    pub async fn state(&self) -> CacheState {
        let slot = self.slot.lock().await;
        self.state_of(slot.entry.as_ref())
    }

    /// The current animals, served from cache while fresh and fetched from the album otherwise.
    ///
    /// A failed fetch is returned to the caller, and to every caller that was waiting on it, and
    /// leaves the previous entry in place. Calls made after it completed try the album again.
    pub async fn get(&self) -> Result<Vec<AnimalRecord>, FetchError> {
        let credentials = self.credentials()?;
        let seen = self.fetches.load(Ordering::SeqCst);
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.entry.as_ref().filter(|entry| self.is_fresh(entry)) {
            debug!(
                "Serving {} cached animals populated at {}",
                entry.records.len(),
                entry.populated_at
            );
            return Ok(entry.records.clone());
        }

        // A fetch finished while this call was queued on the lock.
        if self.fetches.load(Ordering::SeqCst) != seen {
            if let Some(err) = &slot.last_failure {
                debug!("Sharing failed refresh with a queued caller: {}", err);
                return Err(err.clone());
            }
            if let Some(entry) = &slot.entry {
                return Ok(entry.records.clone());
            }
        }

        self.refresh_slot(credentials, &mut slot).await
    }

    /// Fetch from the album regardless of freshness. Serialized with [AnimalFeed::get].
    pub async fn refresh(&self) -> Result<Vec<AnimalRecord>, FetchError> {
        let credentials = self.credentials()?;
        let mut slot = self.slot.lock().await;
        self.refresh_slot(credentials, &mut slot).await
    }

    async fn refresh_slot(
        &self,
        credentials: &AlbumCredentials,
        slot: &mut Slot,
    ) -> Result<Vec<AnimalRecord>, FetchError> {
        info!("Refreshing animals from album {}", &credentials.album_id);

        let fetched = self.source.fetch_photos(credentials).await;
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let photos = match fetched {
            Ok(photos) => photos,
            Err(err) => {
                warn!(
                    "Album refresh failed, cache left {:?}: {}",
                    self.state_of(slot.entry.as_ref()),
                    &err
                );
                slot.last_failure = Some(err.clone());
                return Err(err);
            }
        };

        let records: Vec<AnimalRecord> = photos.iter().map(AnimalRecord::from).collect();
        info!("Cached {} animals", records.len());

        slot.entry = Some(CacheEntry {
            records: records.clone(),
            fetched_at: Instant::now(),
            populated_at: OffsetDateTime::now_utc(),
        });
        slot.last_failure = None;

        Ok(records)
    }
}
