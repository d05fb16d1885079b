//! コンバージョンの observer
//!
//! 近接した 2 つのナビゲーションで同じコンバージョンが二重に届くことがある（at-least-once）。

use crate::domain::Conversion;

pub trait ConversionsObserver: Send + Sync {
    fn on_did_convert_ad(&self, _conversion: &Conversion) {}

    fn on_failed_to_convert_ad(&self, _creative_instance_id: &str) {}
}
