//! ユースケース層
//!
//! 広告イベントの発火（AdEventHandler）とナビゲーションからのコンバージョン判定（Conversions）。
//! 外界とはポート経由でのみやり取りする。

pub mod ad_event_handler;
pub mod conversions;

pub use ad_event_handler::{AdEventHandler, AdEventHandlerDeps};
pub use conversions::{Conversions, ConversionsDeps};
