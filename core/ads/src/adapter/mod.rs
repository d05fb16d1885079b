//! アダプター（ポートの標準実装）
//!
//! 永続ストアは外部の責務のため、ここではインメモリ実装と設定ファイルの読み込みのみを持つ。

pub mod config;
pub mod in_memory_ad_event_store;
pub mod in_memory_creative_set_conversion_store;
pub mod in_memory_deposit_store;
pub mod rewards_status;

pub use config::{load_config, resolve_config_path, ADS_CONFIG_ENV};
pub use in_memory_ad_event_store::InMemoryAdEventStore;
pub use in_memory_creative_set_conversion_store::InMemoryCreativeSetConversionStore;
pub use in_memory_deposit_store::InMemoryDepositStore;
pub use rewards_status::StaticRewardsStatus;
