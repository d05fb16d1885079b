//! インメモリのコンバージョンルールストア

use crate::domain::CreativeSetConversionRule;
use crate::ports::outbound::CreativeSetConversionStore;
use chrono::{DateTime, Utc};
use common::error::Error;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryCreativeSetConversionStore {
    rules: Mutex<Vec<CreativeSetConversionRule>>,
}

impl InMemoryCreativeSetConversionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CreativeSetConversionStore for InMemoryCreativeSetConversionStore {
    fn get_unexpired(&self, now: DateTime<Utc>) -> Result<Vec<CreativeSetConversionRule>, Error> {
        let rules = self
            .rules
            .lock()
            .map_err(|_| Error::storage("creative set conversion store lock poisoned"))?;
        Ok(rules.iter().filter(|r| !r.is_expired(now)).cloned().collect())
    }

    /// 同一内容のルールは置き換える（再保存で失効時刻が延びる）
    fn save(&self, rule: &CreativeSetConversionRule) -> Result<(), Error> {
        let mut rules = self
            .rules
            .lock()
            .map_err(|_| Error::storage("creative set conversion store lock poisoned"))?;
        rules.retain(|r| !(r.creative_set_id == rule.creative_set_id && r.url_pattern == rule.url_pattern));
        rules.push(rule.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CreativeSetConversionInfo;
    use chrono::{Duration, TimeZone};

    fn info(url_pattern: &str) -> CreativeSetConversionInfo {
        CreativeSetConversionInfo {
            url_pattern: url_pattern.to_string(),
            observation_window: Duration::days(3),
            verifiable_advertiser_public_key: None,
            resource_id_pattern: None,
        }
    }

    #[test]
    fn test_get_unexpired_excludes_expired_rules() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let store = InMemoryCreativeSetConversionStore::new();
        store
            .save(&CreativeSetConversionRule::build("set", &info("https://foo.com/*"), t0))
            .unwrap();

        assert_eq!(store.get_unexpired(t0 + Duration::days(3) - Duration::milliseconds(1)).unwrap().len(), 1);
        assert!(store.get_unexpired(t0 + Duration::days(3)).unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_same_rule() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let store = InMemoryCreativeSetConversionStore::new();
        store
            .save(&CreativeSetConversionRule::build("set", &info("https://foo.com/*"), t0))
            .unwrap();
        store
            .save(&CreativeSetConversionRule::build("set", &info("https://foo.com/*"), t0 + Duration::days(2)))
            .unwrap();
        store
            .save(&CreativeSetConversionRule::build("set", &info("https://bar.com/*"), t0))
            .unwrap();

        let rules = store.get_unexpired(t0 + Duration::days(4)).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].url_pattern, "https://foo.com/*");
    }
}
