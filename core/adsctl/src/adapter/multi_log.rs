//! 複数の Log へ同じレコードを書く（--log-file と -v の併用）

use common::error::Error;
use common::ports::outbound::{Log, LogRecord};
use std::sync::Arc;

pub struct MultiLog {
    logs: Vec<Arc<dyn Log>>,
}

impl MultiLog {
    pub fn new(logs: Vec<Arc<dyn Log>>) -> Self {
        Self { logs }
    }
}

impl Log for MultiLog {
    /// 全件に書き、最初の失敗を返す
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for log in &self.logs {
            if let Err(e) = log.log(record) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
