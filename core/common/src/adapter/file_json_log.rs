//! ファイルへ JSONL で追記する Log 実装
//!
//! ログの出力先はファイルのみ。observer への通知（stdout）とは別。

use crate::error::Error;
use crate::ports::outbound::{Log, LogRecord};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    path: PathBuf,
    // 複数スレッドからの追記で行が混ざらないようにする
    write_lock: Mutex<()>,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let line = serde_json::to_string(record)?;
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| Error::system("log lock poisoned"))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| Error::io_msg(format!("create_dir_all {}: {}", parent.display(), e)))?;
            }
        }
        let mut w = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::io_msg(format!("open {}: {}", self.path.display(), e)))?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::LogLevel;
    use tempfile::tempdir;

    #[test]
    fn test_noop_log() {
        let log = NoopLog;
        let rec = LogRecord::new(LogLevel::Info, "test");
        assert!(log.log(&rec).is_ok());
    }

    #[test]
    fn test_file_json_log_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("ads.jsonl");
        let log = FileJsonLog::new(&path);

        log.log(&LogRecord::new(LogLevel::Info, "first").kind("lifecycle"))
            .unwrap();
        log.log(&LogRecord::new(LogLevel::Warn, "second").field("placement_id", "p1"))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["message"], "first");
        assert_eq!(first["kind"], "lifecycle");
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "warn");
        assert_eq!(second["fields"]["placement_id"], "p1");
    }
}
