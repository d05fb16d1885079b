//! 時刻取得のポート
//!
//! usecase はこの trait 経由で「現在時刻」を取得する。時間窓の判定はすべてここで得た時刻を基準にする。

use chrono::{DateTime, Utc};

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の `ManualClock` など。
pub trait Clock: Send + Sync {
    /// 現在時刻（UTC）
    fn now(&self) -> DateTime<Utc>;
}
