//! 固定値（実行中に切り替え可能）の会員状態

use crate::ports::outbound::RewardsStatus;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct StaticRewardsStatus {
    joined: AtomicBool,
}

impl StaticRewardsStatus {
    pub fn new(joined: bool) -> Self {
        Self {
            joined: AtomicBool::new(joined),
        }
    }

    pub fn set_joined(&self, joined: bool) {
        self.joined.store(joined, Ordering::SeqCst);
    }
}

impl RewardsStatus for StaticRewardsStatus {
    fn has_joined_rewards(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }
}
