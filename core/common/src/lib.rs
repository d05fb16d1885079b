//! 広告アトリビューション共通ライブラリ
//!
//! `ads` エンジンと `adsctl` コマンドで共有される機能を提供します。

/// エラーハンドリング
pub mod error;

/// Outbound ポート（ログ・時刻）
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// 複数 observer への配信
pub mod observer;
