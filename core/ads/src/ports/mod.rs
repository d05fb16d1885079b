//! Ports & Adapters のポート定義
//!
//! - inbound: なし（ユースケース型を直接呼ぶ）
//! - outbound: エンジンが外界（ストア・会員状態・observer）に依頼するための trait

pub mod outbound;
