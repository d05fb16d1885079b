//! Outbound ポート: アプリが外界（時刻・ログ）を使うための trait

pub mod clock;
pub mod log;

pub use clock::Clock;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
