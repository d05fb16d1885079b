//! Outbound ポート: エンジンが外部ストア・会員状態・observer を使うための trait

pub mod ad_event_observer;
pub mod ad_event_store;
pub mod conversions_observer;
pub mod creative_set_conversion_store;
pub mod deposit_store;
pub mod rewards_status;

pub use ad_event_observer::AdEventObserver;
pub use ad_event_store::AdEventStore;
pub use conversions_observer::ConversionsObserver;
pub use creative_set_conversion_store::CreativeSetConversionStore;
pub use deposit_store::DepositStore;
pub use rewards_status::RewardsStatus;
