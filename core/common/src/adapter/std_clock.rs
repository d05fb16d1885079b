//! 標準時刻実装（chrono::Utc::now を委譲）

use crate::ports::outbound::Clock;
use chrono::{DateTime, Utc};

/// システム時刻を使う Clock 実装
#[derive(Debug, Clone, Default)]
pub struct StdClock;

impl Clock for StdClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
