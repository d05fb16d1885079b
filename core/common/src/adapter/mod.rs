//! アダプター（ポートの標準実装）
//!
//! usecase はポートの trait 経由でのみ時刻・ログに触れる。
//! 実装は標準実装（Std*）やテスト用の実装（ManualClock / NoopLog）を注入する。

pub mod file_json_log;
pub mod manual_clock;
pub mod std_clock;
pub mod stderr_log;

pub use file_json_log::{FileJsonLog, NoopLog};
pub use manual_clock::ManualClock;
pub use std_clock::StdClock;
pub use stderr_log::StderrLog;
