//! In-memory source and store for engine and driver tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use super::store::{ActivityStore, StoreError};
use super::types::TrackedCharacter;
use super::watermark::SyncWatermark;
use crate::entity::guardian::CharacterClass;
use crate::platform::{self, ActivityDetail, ActivitySource, ActivitySummary, PlatformError};

/// Midnight UTC, `n` days after 2024-03-01.
pub fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

pub fn character(character_id: &str, date_last_played: DateTime<Utc>) -> TrackedCharacter {
    TrackedCharacter {
        character_id: character_id.to_string(),
        membership_id: format!("m-{character_id}"),
        class: CharacterClass::Hunter,
        date_last_played,
    }
}

fn summary(n: i64) -> ActivitySummary {
    ActivitySummary {
        instance_id: format!("A{n}"),
        period: day(n),
        mode: 4,
        director_activity_hash: 0,
    }
}

/// Activity `A{n}` happened on `day(n)`. Histories are listed in the order
/// given, `page_size` per page.
#[derive(Default)]
pub struct FakeSource {
    inner: Mutex<SourceInner>,
}

#[derive(Default)]
struct SourceInner {
    default_history: Vec<i64>,
    histories: HashMap<String, Vec<i64>>,
    page_size: usize,
    pages_requested: Vec<u32>,
    characters_listed: Vec<String>,
    detail_fetches: usize,
    failing_details: HashSet<String>,
}

impl FakeSource {
    /// Every character sees the same history.
    pub fn with_history(history: &[i64], page_size: usize) -> Self {
        let source = Self::default();
        {
            let mut inner = source.inner.lock().unwrap();
            inner.default_history = history.to_vec();
            inner.page_size = page_size;
        }
        source
    }

    pub fn set_history(&self, character_id: &str, history: &[i64]) {
        self.inner
            .lock()
            .unwrap()
            .histories
            .insert(character_id.to_string(), history.to_vec());
    }

    pub fn fail_detail(&self, instance_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_details
            .insert(instance_id.to_string());
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.inner.lock().unwrap().pages_requested.clone()
    }

    /// Characters whose history was listed, deduplicated, in first-seen order.
    pub fn characters_listed(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut seen = Vec::new();
        for id in &inner.characters_listed {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }

    pub fn detail_fetches(&self) -> usize {
        self.inner.lock().unwrap().detail_fetches
    }
}

#[async_trait]
impl ActivitySource for FakeSource {
    async fn list_activity_summaries(
        &self,
        _membership_id: &str,
        character_id: &str,
        page: u32,
    ) -> platform::Result<Vec<ActivitySummary>> {
        let mut inner = self.inner.lock().unwrap();
        inner.pages_requested.push(page);
        inner.characters_listed.push(character_id.to_string());

        let history = inner
            .histories
            .get(character_id)
            .unwrap_or(&inner.default_history);
        let page_size = if inner.page_size == 0 { 10 } else { inner.page_size };
        Ok(history
            .chunks(page_size)
            .nth(page as usize)
            .map(|chunk| chunk.iter().copied().map(summary).collect())
            .unwrap_or_default())
    }

    async fn fetch_activity_detail(&self, instance_id: &str) -> platform::Result<ActivityDetail> {
        let mut inner = self.inner.lock().unwrap();
        inner.detail_fetches += 1;
        if inner.failing_details.contains(instance_id) {
            return Err(PlatformError::remote(
                5,
                "SystemDisabled",
                "This system is temporarily disabled for maintenance.",
            ));
        }

        let n: i64 = instance_id.trim_start_matches('A').parse().unwrap();
        Ok(ActivityDetail {
            instance_id: instance_id.to_string(),
            period: day(n),
            reference_id: 0,
            director_activity_hash: 0,
            mode: 4,
            modes: vec![4],
            is_private: false,
            entries: Vec::new(),
        })
    }
}

/// Records every call; can be told to fail specific operations.
#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    stored: Vec<String>,
    insert_calls: usize,
    save_calls: usize,
    fail_on_insert: Option<usize>,
    watermarks: HashMap<String, SyncWatermark>,
    characters: Vec<TrackedCharacter>,
    failing_saves: HashSet<String>,
    failing_loads: HashSet<String>,
}

impl FakeStore {
    /// Mark activities as already stored without counting inserts.
    pub fn preload(&self, instance_ids: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .stored
            .extend(instance_ids.iter().map(|id| id.to_string()));
    }

    /// Make the `n`th insert call (1-based) fail with a persistence error.
    pub fn fail_on_insert(&self, n: usize) {
        self.inner.lock().unwrap().fail_on_insert = Some(n);
    }

    pub fn fail_save(&self, character_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_saves
            .insert(character_id.to_string());
    }

    pub fn fail_load(&self, character_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_loads
            .insert(character_id.to_string());
    }

    pub fn set_watermark(&self, character_id: &str, watermark: SyncWatermark) {
        self.inner
            .lock()
            .unwrap()
            .watermarks
            .insert(character_id.to_string(), watermark);
    }

    pub fn set_characters(&self, characters: Vec<TrackedCharacter>) {
        self.inner.lock().unwrap().characters = characters;
    }

    pub fn watermark(&self, character_id: &str) -> Option<SyncWatermark> {
        self.inner
            .lock()
            .unwrap()
            .watermarks
            .get(character_id)
            .cloned()
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().stored.clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.inner.lock().unwrap().insert_calls
    }

    pub fn save_calls(&self) -> usize {
        self.inner.lock().unwrap().save_calls
    }
}

#[async_trait]
impl ActivityStore for FakeStore {
    async fn list_tracked_characters(&self) -> Result<Vec<TrackedCharacter>, StoreError> {
        Ok(self.inner.lock().unwrap().characters.clone())
    }

    async fn load_watermark(&self, character_id: &str) -> Result<SyncWatermark, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.failing_loads.contains(character_id) {
            return Err(StoreError::Persistence("database is locked".to_string()));
        }
        Ok(inner
            .watermarks
            .get(character_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_watermark(
        &self,
        character_id: &str,
        watermark: &SyncWatermark,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.save_calls += 1;
        if inner.failing_saves.contains(character_id) {
            return Err(StoreError::Persistence("database is locked".to_string()));
        }
        inner
            .watermarks
            .insert(character_id.to_string(), watermark.clone());
        Ok(())
    }

    async fn insert_activity_if_absent(&self, detail: &ActivityDetail) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.insert_calls += 1;
        if inner.fail_on_insert == Some(inner.insert_calls) {
            return Err(StoreError::Persistence("disk I/O error".to_string()));
        }
        if inner.stored.contains(&detail.instance_id) {
            return Err(StoreError::DuplicateKey {
                instance_id: detail.instance_id.clone(),
            });
        }
        inner.stored.push(detail.instance_id.clone());
        Ok(())
    }
}
