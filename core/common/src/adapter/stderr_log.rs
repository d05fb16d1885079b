//! 人間向けログ（LogRecord → stderr へ要点のみ出力）
//!
//! `--verbose` 指定時に使う。fields は 1 行に収まるよう JSON で短く出す。

use crate::error::Error;
use crate::ports::outbound::{Log, LogLevel, LogRecord};

const FIELDS_SUMMARY_MAX: usize = 400;

/// 指定レベル以上を stderr に出す Log 実装
pub struct StderrLog {
    min_level: LogLevel,
}

impl StderrLog {
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl Default for StderrLog {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

fn severity(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 0,
        LogLevel::Warn => 1,
        LogLevel::Info => 2,
        LogLevel::Debug => 3,
    }
}

/// 1 行に整形する（fields が長すぎる場合は切り詰める）
pub(crate) fn format_line(record: &LogRecord) -> String {
    let mut line = format!("[{}] {}", record.level.as_str(), record.message);
    if let Some(kind) = &record.kind {
        line = format!("{} ({})", line, kind);
    }
    if let Some(fields) = &record.fields {
        let s = serde_json::to_string(fields).unwrap_or_default();
        if s.len() <= FIELDS_SUMMARY_MAX {
            line = format!("{} {}", line, s);
        } else {
            let truncated = s.chars().take(FIELDS_SUMMARY_MAX).collect::<String>();
            line = format!("{} {}... (len={})", line, truncated, s.len());
        }
    }
    line
}

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if severity(record.level) <= severity(self.min_level) {
            eprintln!("{}", format_line(record));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_with_kind_and_fields() {
        let rec = LogRecord::new(LogLevel::Warn, "denied")
            .kind("permission")
            .field("rule", "per_day");
        let line = format_line(&rec);
        assert_eq!(line, r#"[warn] denied (permission) {"rule":"per_day"}"#);
    }

    #[test]
    fn test_format_line_truncates_large_fields() {
        let rec = LogRecord::new(LogLevel::Info, "big").field("html", "x".repeat(1000));
        let line = format_line(&rec);
        assert!(line.contains("... (len="));
        assert!(line.len() < 600);
    }
}
