//! テスト用の部品: 広告の組み立て、記録用 observer / ログ、失敗するストア、エンジン一式

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::adapter::ManualClock;
use common::error::Error;
use common::ports::outbound::{Log, LogRecord};
use url::Url;

use crate::adapter::{
    InMemoryAdEventStore, InMemoryCreativeSetConversionStore, InMemoryDepositStore,
    StaticRewardsStatus,
};
use crate::domain::{
    Ad, AdEvent, AdEventType, AdType, AdsConfig, ConfirmationType, Conversion,
    CreativeSetConversionInfo, Deposit, FireEventFailure, FireEventResult,
};
use crate::ports::outbound::{
    AdEventObserver, AdEventStore, ConversionsObserver, CreativeSetConversionStore, DepositStore,
};
use crate::usecase::{AdEventHandler, AdEventHandlerDeps, Conversions, ConversionsDeps};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn conversion_info(url_pattern: &str) -> CreativeSetConversionInfo {
    CreativeSetConversionInfo {
        url_pattern: url_pattern.to_string(),
        observation_window: Duration::days(3),
        verifiable_advertiser_public_key: None,
        resource_id_pattern: None,
    }
}

/// placement_id ごとに別インスタンスの広告（同じクリエイティブセット）
pub fn build_ad(ad_type: AdType, placement_id: &str) -> Ad {
    Ad {
        ad_type,
        placement_id: placement_id.to_string(),
        creative_instance_id: format!("instance-{}", placement_id),
        creative_set_id: "creative-set".to_string(),
        campaign_id: "campaign".to_string(),
        advertiser_id: "advertiser".to_string(),
        segment: "untargeted".to_string(),
        target_url: "https://brave.com".to_string(),
        value: 1.0,
        creative_set_conversion: Some(conversion_info("https://foo.com/*")),
    }
}

pub fn config(json: &str) -> AdsConfig {
    AdsConfig::parse(json).unwrap()
}

/// 通知を "served:p1" / "failed:viewed_impression:p1" の形で記録する
#[derive(Default)]
pub struct RecordingAdEventObserver {
    pub calls: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<FireEventFailure>>,
}

impl RecordingAdEventObserver {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AdEventObserver for RecordingAdEventObserver {
    fn on_did_fire_served_event(&self, ad: &Ad) {
        self.push(format!("served:{}", ad.placement_id));
    }

    fn on_did_fire_viewed_event(&self, ad: &Ad) {
        self.push(format!("viewed:{}", ad.placement_id));
    }

    fn on_did_fire_clicked_event(&self, ad: &Ad) {
        self.push(format!("clicked:{}", ad.placement_id));
    }

    fn on_failed_to_fire_event(&self, ad: &Ad, event_type: AdEventType, failure: &FireEventFailure) {
        self.push(format!("failed:{}:{}", event_type, ad.placement_id));
        self.failures.lock().unwrap().push(failure.clone());
    }
}

#[derive(Default)]
pub struct RecordingConversionsObserver {
    pub conversions: Mutex<Vec<Conversion>>,
    pub failed: Mutex<Vec<String>>,
}

impl RecordingConversionsObserver {
    pub fn conversions(&self) -> Vec<Conversion> {
        self.conversions.lock().unwrap().clone()
    }
}

impl ConversionsObserver for RecordingConversionsObserver {
    fn on_did_convert_ad(&self, conversion: &Conversion) {
        self.conversions.lock().unwrap().push(conversion.clone());
    }

    fn on_failed_to_convert_ad(&self, creative_instance_id: &str) {
        self.failed.lock().unwrap().push(creative_instance_id.to_string());
    }
}

#[derive(Default)]
pub struct RecordingLog {
    pub records: Mutex<Vec<LogRecord>>,
}

impl RecordingLog {
    pub fn kinds(&self) -> Vec<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.kind.clone())
            .collect()
    }
}

impl Log for RecordingLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct FailingDepositStore;

impl DepositStore for FailingDepositStore {
    fn save(&self, _deposit: &Deposit) -> Result<(), Error> {
        Err(Error::storage("deposit database is unavailable"))
    }
}

/// `fail_appends` を立てると追記だけ失敗する
pub struct FlakyAdEventStore {
    pub inner: InMemoryAdEventStore,
    pub fail_appends: AtomicBool,
}

impl FlakyAdEventStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryAdEventStore::new(Duration::days(90)),
            fail_appends: AtomicBool::new(false),
        }
    }
}

impl AdEventStore for FlakyAdEventStore {
    fn append(&self, ad_event: &AdEvent) -> Result<(), Error> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(Error::storage("ad event database is unavailable"));
        }
        self.inner.append(ad_event)
    }

    fn get_unexpired(&self, ad_type: AdType, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error> {
        self.inner.get_unexpired(ad_type, now)
    }

    fn get_all_unexpired(&self, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error> {
        self.inner.get_all_unexpired(now)
    }
}

/// ハンドラー・マッチャー・ストア・observer 一式
pub struct Engine {
    pub clock: Arc<ManualClock>,
    pub ad_event_store: Arc<FlakyAdEventStore>,
    pub deposit_store: Arc<InMemoryDepositStore>,
    pub creative_set_conversion_store: Arc<InMemoryCreativeSetConversionStore>,
    pub rewards_status: Arc<StaticRewardsStatus>,
    pub log: Arc<RecordingLog>,
    pub handler: Arc<AdEventHandler>,
    pub conversions: Conversions,
    pub ad_event_observer: Arc<RecordingAdEventObserver>,
    pub conversions_observer: Arc<RecordingConversionsObserver>,
}

impl Engine {
    pub fn new(config: &AdsConfig) -> Self {
        Self::with_deposit_store(config, None)
    }

    pub fn with_deposit_store(config: &AdsConfig, deposit_store: Option<Arc<dyn DepositStore>>) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let ad_event_store = Arc::new(FlakyAdEventStore::new());
        let in_memory_deposit_store = Arc::new(InMemoryDepositStore::new());
        let creative_set_conversion_store = Arc::new(InMemoryCreativeSetConversionStore::new());
        let rewards_status = Arc::new(StaticRewardsStatus::new(true));
        let log = Arc::new(RecordingLog::default());

        let handler = Arc::new(AdEventHandler::new(
            config,
            AdEventHandlerDeps {
                ad_event_store: ad_event_store.clone(),
                deposit_store: deposit_store.unwrap_or_else(|| in_memory_deposit_store.clone() as Arc<dyn DepositStore>),
                creative_set_conversion_store: creative_set_conversion_store.clone(),
                rewards_status: rewards_status.clone(),
                clock: clock.clone(),
                log: log.clone(),
            },
        ));
        let conversions = Conversions::new(
            config,
            ConversionsDeps {
                ad_event_store: ad_event_store.clone(),
                creative_set_conversion_store: creative_set_conversion_store.clone(),
                rewards_status: rewards_status.clone(),
                clock: clock.clone(),
                log: log.clone(),
            },
        );

        let ad_event_observer = Arc::new(RecordingAdEventObserver::default());
        let observer: Arc<dyn AdEventObserver> = ad_event_observer.clone();
        handler.add_observer(&observer);
        let conversions_observer = Arc::new(RecordingConversionsObserver::default());
        let observer: Arc<dyn ConversionsObserver> = conversions_observer.clone();
        conversions.add_observer(&observer);

        Self {
            clock,
            ad_event_store,
            deposit_store: in_memory_deposit_store,
            creative_set_conversion_store,
            rewards_status,
            log,
            handler,
            conversions,
            ad_event_observer,
            conversions_observer,
        }
    }

    /// 同期的に発火して結果を返す
    pub fn fire(&self, ad: &Ad, event_type: AdEventType) -> FireEventResult {
        let slot = Arc::new(Mutex::new(None));
        let out = slot.clone();
        self.handler.fire_event(ad, event_type, move |result| {
            *out.lock().unwrap() = Some(result);
        });
        let result = slot.lock().unwrap().take();
        result.expect("callback was not invoked")
    }

    /// served → viewed（→ clicked）を成功させる
    pub fn serve_and_view(&self, ad: &Ad) {
        assert!(self.fire(ad, AdEventType::ServedImpression).success);
        assert!(self.fire(ad, AdEventType::ViewedImpression).success);
    }

    pub fn serve_view_and_click(&self, ad: &Ad) {
        self.serve_and_view(ad);
        assert!(self.fire(ad, AdEventType::Clicked).success);
    }

    pub fn events(&self) -> Vec<AdEvent> {
        self.ad_event_store.inner.all()
    }

    pub fn events_of(&self, confirmation_type: ConfirmationType) -> Vec<AdEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.confirmation_type == confirmation_type)
            .collect()
    }

    pub fn navigate(&self, chain: &[&str], html: Option<&str>) -> Vec<Conversion> {
        let chain: Vec<Url> = chain.iter().map(|s| url(s)).collect();
        self.conversions.maybe_convert(&chain, html)
    }

    pub fn saved_rules_at(&self, now: DateTime<Utc>) -> usize {
        self.creative_set_conversion_store.get_unexpired(now).unwrap().len()
    }
}
