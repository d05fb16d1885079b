//! 配線: インメモリストアと ManualClock でエンジンを組み立てる

use std::path::Path;
use std::sync::Arc;

use ads::adapter::{
    InMemoryAdEventStore, InMemoryCreativeSetConversionStore, InMemoryDepositStore,
    StaticRewardsStatus,
};
use ads::domain::AdsConfig;
use ads::usecase::{AdEventHandler, AdEventHandlerDeps, Conversions, ConversionsDeps};
use chrono::{DateTime, Utc};
use common::adapter::{FileJsonLog, ManualClock, NoopLog, StderrLog};
use common::ports::outbound::{Log, LogLevel};

use crate::adapter::MultiLog;

/// replay 1 回分のエンジン
pub struct Engine {
    pub clock: Arc<ManualClock>,
    pub rewards_status: Arc<StaticRewardsStatus>,
    pub handler: AdEventHandler,
    pub conversions: Conversions,
}

pub fn wire_engine(config: &AdsConfig, start: DateTime<Utc>, member: bool, log: Arc<dyn Log>) -> Engine {
    let clock = Arc::new(ManualClock::new(start));
    let rewards_status = Arc::new(StaticRewardsStatus::new(member));
    let ad_event_store = Arc::new(InMemoryAdEventStore::new(config.ad_event_retention));
    let creative_set_conversion_store = Arc::new(InMemoryCreativeSetConversionStore::new());

    let handler = AdEventHandler::new(
        config,
        AdEventHandlerDeps {
            ad_event_store: ad_event_store.clone(),
            deposit_store: Arc::new(InMemoryDepositStore::new()),
            creative_set_conversion_store: creative_set_conversion_store.clone(),
            rewards_status: rewards_status.clone(),
            clock: clock.clone(),
            log: Arc::clone(&log),
        },
    );
    let conversions = Conversions::new(
        config,
        ConversionsDeps {
            ad_event_store,
            creative_set_conversion_store,
            rewards_status: rewards_status.clone(),
            clock: clock.clone(),
            log,
        },
    );

    Engine {
        clock,
        rewards_status,
        handler,
        conversions,
    }
}

/// --log-file → FileJsonLog、-v → StderrLog、両方なら両方、どちらもなければ NoopLog
pub fn wire_log(log_file: Option<&Path>, verbose: bool) -> Arc<dyn Log> {
    let mut logs: Vec<Arc<dyn Log>> = Vec::new();
    if let Some(path) = log_file {
        logs.push(Arc::new(FileJsonLog::new(path)));
    }
    if verbose {
        logs.push(Arc::new(StderrLog::new(LogLevel::Debug)));
    }
    match logs.len() {
        0 => Arc::new(NoopLog),
        1 => logs.remove(0),
        _ => Arc::new(MultiLog::new(logs)),
    }
}
