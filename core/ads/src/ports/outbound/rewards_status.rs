//! 会員状態のポート

/// ユーザーが Rewards に参加しているか（発火ごとに問い合わせる）
pub trait RewardsStatus: Send + Sync {
    fn has_joined_rewards(&self) -> bool;
}
