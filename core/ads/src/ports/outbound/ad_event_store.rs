//! 広告イベント履歴ストアのポート
//!
//! 追記のみ。永続化エンジンは外部の責務で、ここでは問い合わせの契約だけを定める。

use crate::domain::{AdEvent, AdType};
use chrono::{DateTime, Utc};
use common::error::Error;

pub trait AdEventStore: Send + Sync {
    /// 1 件追記する（ストア側で原子的）
    fn append(&self, ad_event: &AdEvent) -> Result<(), Error>;

    /// 保持期間内の指定種別の履歴（created_at 昇順）
    fn get_unexpired(&self, ad_type: AdType, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error>;

    /// 保持期間内の全種別の履歴（created_at 昇順）
    fn get_all_unexpired(&self, now: DateTime<Utc>) -> Result<Vec<AdEvent>, Error>;
}
