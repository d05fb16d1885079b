//! インメモリのデポジットストア

use crate::domain::Deposit;
use crate::ports::outbound::DepositStore;
use common::error::Error;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryDepositStore {
    deposits: Mutex<Vec<Deposit>>,
}

impl InMemoryDepositStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposits(&self) -> Vec<Deposit> {
        self.deposits.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl DepositStore for InMemoryDepositStore {
    fn save(&self, deposit: &Deposit) -> Result<(), Error> {
        let mut deposits = self
            .deposits
            .lock()
            .map_err(|_| Error::storage("deposit store lock poisoned"))?;
        deposits.push(deposit.clone());
        Ok(())
    }
}
