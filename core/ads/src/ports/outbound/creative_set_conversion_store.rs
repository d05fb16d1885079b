//! コンバージョンルールストアのポート

use crate::domain::CreativeSetConversionRule;
use chrono::{DateTime, Utc};
use common::error::Error;

pub trait CreativeSetConversionStore: Send + Sync {
    /// `now` 時点で失効していないルール
    fn get_unexpired(&self, now: DateTime<Utc>) -> Result<Vec<CreativeSetConversionRule>, Error>;

    fn save(&self, rule: &CreativeSetConversionRule) -> Result<(), Error>;
}
