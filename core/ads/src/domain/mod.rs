//! ドメイン型（広告・イベント・コンバージョン）と、それに対する純粋関数
//!
//! I/O を持たない。時刻は常に引数で受け取る。

pub mod ad;
pub mod ad_event;
pub mod ad_type;
pub mod config;
pub mod conversion;
pub mod creative_set_conversion;
pub mod duration_serde;
pub mod failure;
pub mod permission_rules;
pub mod time_window;
pub mod url_pattern;
pub mod verifiable_conversion;

pub use ad::{Ad, Deposit};
pub use ad_event::AdEvent;
pub use ad_type::{AdEventType, AdType, ConfirmationType};
pub use config::{AdsConfig, ConversionSettings, PermissionRuleOverrides, PermissionRuleSettings};
pub use conversion::{Conversion, ConversionActionType, VerifiableConversion};
pub use creative_set_conversion::{CreativeSetConversionInfo, CreativeSetConversionRule};
pub use failure::{FireEventFailure, FireEventResult};
pub use permission_rules::{PermissionDecision, PermissionRuleId, PermissionRules};
