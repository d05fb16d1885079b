//! インメモリの広告イベント履歴

use crate::domain::{AdEvent, AdType};
use crate::ports::outbound::AdEventStore;
use chrono::{DateTime, Duration, Utc};
use common::error::Error;
use std::sync::Mutex;

/// 保持期間つきのインメモリ履歴（保持期間を過ぎたイベントは問い合わせから除外する）
pub struct InMemoryAdEventStore {
    retention: Duration,
    events: Mutex<Vec<AdEvent>>,
}

impl InMemoryAdEventStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            events: Mutex::new(Vec::new()),
        }
    }

    /// 保持期間に関係なく全件（テスト・診断用）
    pub fn all(&self) -> Vec<AdEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn unexpired_where(&self, now: DateTime<Utc>, pred: impl Fn(&AdEvent) -> bool) -> Result<Vec<AdEvent>, Error> {
        let events = self
            .events
            .lock()
            .map_err(|_| Error::storage("ad event store lock poisoned"))?;
        let since = now - self.retention;
        let mut out: Vec<AdEvent> = events
            .iter()
            .filter(|e| e.created_at > since && pred(e))
            .cloned()
            .collect();
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }
}

impl AdEventStore for InMemoryAdEventStore {
    fn append(&self, ad_event: &AdEvent) -> Result<(), Error> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| Error::storage("ad event store lock poisoned"))?;
        events.push(ad_event.clone());
        Ok(())
    }

    fn get_unexpired(&self, ad_type: AdType, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error> {
        self.unexpired_where(now, |e| e.ad_type == ad_type)
    }

    fn get_all_unexpired(&self, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error> {
        self.unexpired_where(now, |_| true)
    }
}
