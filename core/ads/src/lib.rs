//! 広告イベントのアトリビューションエンジン
//!
//! 広告ライフサイクルイベント（served / viewed / clicked）の発火と、
//! ブラウザのナビゲーションをコンバージョンとして帰属させる判定を提供します。

/// ドメイン型と純粋関数（時間窓・許可ルール・URL パターン・ID 抽出）
pub mod domain;

/// Ports & Adapters のポート定義
pub mod ports;

/// ポートの標準実装（インメモリストア・設定ファイル）
pub mod adapter;

/// ユースケース（イベント発火・コンバージョン判定）
pub mod usecase;

#[cfg(test)]
mod tests;
