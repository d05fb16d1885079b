//! デポジットストアのポート（viewed impression の前に保存する）

use crate::domain::Deposit;
use common::error::Error;

pub trait DepositStore: Send + Sync {
    fn save(&self, deposit: &Deposit) -> Result<(), Error>;
}
