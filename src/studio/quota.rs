//! Day-keyed usage counter persisted in a local key-value store.
//!
//! Each calendar day gets its own `"{prefix}_{YYYY-MM-DD}"` entry holding a
//! decimal count. Entries for past days are left in the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::StudioError;
use crate::config::QuotaConfig;

/// Minimal string key-value store the counter persists into.
pub trait KeyValueStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: String);
}

impl<'a> KeyValueStore for dyn eframe::Storage + 'a {
    fn get_string(&self, key: &str) -> Option<String> {
        eframe::Storage::get_string(self, key)
    }

    fn set_string(&mut self, key: &str, value: String) {
        eframe::Storage::set_string(self, key, value);
    }
}

#[derive(Debug, Clone)]
pub struct UsageCounter {
    key_prefix: String,
    daily_limit: u32,
    day: NaiveDate,
    used: u32,
    unsaved: BTreeMap<String, u32>,
}

impl UsageCounter {
    /// Read today's count from `store`; a missing store or entry counts as zero.
    pub fn load<S: KeyValueStore + ?Sized>(
        store: Option<&S>,
        cfg: &QuotaConfig,
        today: NaiveDate,
    ) -> Self {
        let key = day_key(&cfg.key_prefix, today);
        let used = store.map_or(0, |s| read_count(s, &key));
        tracing::debug!(%key, used, limit = cfg.daily_limit, "usage counter loaded");
        Self {
            key_prefix: cfg.key_prefix.clone(),
            daily_limit: cfg.daily_limit,
            day: today,
            used,
            unsaved: BTreeMap::new(),
        }
    }

    pub const fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub const fn used(&self) -> u32 {
        self.used
    }

    pub const fn remaining(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used)
    }

    pub fn current_key(&self) -> String {
        day_key(&self.key_prefix, self.day)
    }

    /// Switch to a new calendar day, picking up any count already stored for it.
    pub fn roll_to<S: KeyValueStore + ?Sized>(&mut self, today: NaiveDate, store: Option<&S>) {
        if today == self.day {
            return;
        }
        let key = day_key(&self.key_prefix, today);
        let stored = store.map_or(0, |s| read_count(s, &key));
        let pending = self.unsaved.get(&key).copied().unwrap_or(0);
        self.day = today;
        self.used = stored.max(pending);
        tracing::info!(%key, used = self.used, "usage counter rolled over");
    }

    pub fn check_available(&self) -> Result<(), StudioError> {
        if self.remaining() == 0 {
            tracing::info!(used = self.used, limit = self.daily_limit, "daily quota exhausted");
            return Err(StudioError::QuotaExhausted {
                limit: self.daily_limit,
            });
        }
        Ok(())
    }

    pub fn record_use(&mut self) {
        self.used = self.used.saturating_add(1);
        self.unsaved.insert(self.current_key(), self.used);
    }

    pub fn has_unsaved(&self) -> bool {
        !self.unsaved.is_empty()
    }

    /// Write every count changed since the last persist. A higher count already
    /// in the store is kept and adopted for the current day.
    pub fn persist<S: KeyValueStore + ?Sized>(&mut self, store: &mut S) {
        let current = self.current_key();
        for (key, count) in std::mem::take(&mut self.unsaved) {
            let count = count.max(read_count(store, &key));
            store.set_string(&key, count.to_string());
            if key == current {
                self.used = self.used.max(count);
            }
        }
    }
}

pub fn day_key(prefix: &str, day: NaiveDate) -> String {
    format!("{prefix}_{}", day.format("%Y-%m-%d"))
}

fn read_count<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> u32 {
    store
        .get_string(key)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}
