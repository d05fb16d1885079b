//! observer 通知を 1 行 1 JSON で書き出す

use ads::domain::{Ad, AdEventType, Conversion, FireEventFailure};
use ads::ports::outbound::{AdEventObserver, ConversionsObserver};
use common::error::Error;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Mutex;

pub struct JsonLinesObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesObserver {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn emit(&self, value: &Value) -> Result<(), Error> {
        let line = serde_json::to_string(value)?;
        let mut out = self
            .out
            .lock()
            .map_err(|_| Error::system("output lock poisoned"))?;
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }

    fn emit_ad(&self, event: &str, ad: &Ad) {
        let _ = self.emit(&json!({
            "event": event,
            "ad_type": ad.ad_type,
            "placement_id": ad.placement_id,
            "creative_instance_id": ad.creative_instance_id,
        }));
    }
}

impl AdEventObserver for JsonLinesObserver {
    fn on_did_fire_served_event(&self, ad: &Ad) {
        self.emit_ad("did_fire_served_event", ad);
    }

    fn on_did_fire_viewed_event(&self, ad: &Ad) {
        self.emit_ad("did_fire_viewed_event", ad);
    }

    fn on_did_fire_clicked_event(&self, ad: &Ad) {
        self.emit_ad("did_fire_clicked_event", ad);
    }

    fn on_failed_to_fire_event(&self, ad: &Ad, event_type: AdEventType, failure: &FireEventFailure) {
        let _ = self.emit(&json!({
            "event": "failed_to_fire_event",
            "ad_type": ad.ad_type,
            "event_type": event_type,
            "placement_id": ad.placement_id,
            "reason": failure.to_string(),
        }));
    }
}

impl ConversionsObserver for JsonLinesObserver {
    fn on_did_convert_ad(&self, conversion: &Conversion) {
        let _ = self.emit(&json!({
            "event": "did_convert_ad",
            "conversion": conversion,
        }));
    }

    fn on_failed_to_convert_ad(&self, creative_instance_id: &str) {
        let _ = self.emit(&json!({
            "event": "failed_to_convert_ad",
            "creative_instance_id": creative_instance_id,
        }));
    }
}
