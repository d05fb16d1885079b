//! ReplayUseCase: シナリオの各ステップを時刻どおりにエンジンへ流す
//!
//! ステップごとに ManualClock を `at` へ合わせる。observer 通知と発火結果は同じ JSON lines 出力に並ぶ。

use std::sync::{Arc, Mutex};

use ads::domain::{AdsConfig, FireEventResult};
use ads::ports::outbound::{AdEventObserver, ConversionsObserver};
use common::error::Error;
use common::ports::outbound::{Clock, Log, LogLevel, LogRecord};
use serde_json::json;

use crate::adapter::JsonLinesObserver;
use crate::domain::{Scenario, StepAction};
use crate::wiring::wire_engine;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub fired: usize,
    pub failed: usize,
    pub conversions: usize,
}

pub struct ReplayUseCase {
    config: AdsConfig,
    sink: Arc<JsonLinesObserver>,
    log: Arc<dyn Log>,
}

impl ReplayUseCase {
    pub fn new(config: AdsConfig, sink: Arc<JsonLinesObserver>, log: Arc<dyn Log>) -> Self {
        Self { config, sink, log }
    }

    pub fn run(&self, scenario: &Scenario) -> Result<ReplaySummary, Error> {
        let start = match scenario.steps.first() {
            Some(step) => step.at,
            None => return self.finish(ReplaySummary::default()),
        };
        let engine = wire_engine(&self.config, start, scenario.member, Arc::clone(&self.log));
        let ad_event_observer: Arc<dyn AdEventObserver> = self.sink.clone();
        engine.handler.add_observer(&ad_event_observer);
        let conversions_observer: Arc<dyn ConversionsObserver> = self.sink.clone();
        engine.conversions.add_observer(&conversions_observer);

        let mut summary = ReplaySummary::default();
        for step in &scenario.steps {
            if step.at < engine.clock.now() {
                let _ = self.log.log(
                    &LogRecord::new(LogLevel::Warn, "scenario step goes back in time")
                        .layer("usecase")
                        .kind("replay")
                        .field("at", step.at.to_rfc3339()),
                );
            }
            engine.clock.set(step.at);

            match &step.action {
                StepAction::Fire { ad, event_type } => {
                    let results: Arc<Mutex<Vec<FireEventResult>>> = Arc::new(Mutex::new(Vec::new()));
                    let out = Arc::clone(&results);
                    engine.handler.fire_event(ad, *event_type, move |result| {
                        if let Ok(mut out) = out.lock() {
                            out.push(result);
                        }
                    });
                    let results = results
                        .lock()
                        .map_err(|_| Error::system("fire result lock poisoned"))?
                        .clone();
                    for result in results {
                        if result.success {
                            summary.fired += 1;
                        } else {
                            summary.failed += 1;
                        }
                        self.sink.emit(&json!({
                            "event": "fire_result",
                            "at": step.at.to_rfc3339(),
                            "success": result.success,
                            "placement_id": result.placement_id,
                            "event_type": result.event_type,
                            "reason": result.failure.as_ref().map(|f| f.to_string()),
                        }))?;
                    }
                }
                StepAction::Navigate { redirect_chain, html } => {
                    let conversions = engine.conversions.maybe_convert(redirect_chain, html.as_deref());
                    summary.conversions += conversions.len();
                }
                StepAction::SetMember(member) => engine.rewards_status.set_joined(*member),
            }
        }

        self.finish(summary)
    }

    fn finish(&self, summary: ReplaySummary) -> Result<ReplaySummary, Error> {
        self.sink.emit(&json!({
            "event": "summary",
            "fired": summary.fired,
            "failed": summary.failed,
            "conversions": summary.conversions,
        }))?;
        Ok(summary)
    }
}
