//! 設定ファイルの読み込み（adapter 層）

use crate::domain::AdsConfig;
use common::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// 設定ファイルのパスを指定する環境変数
pub const ADS_CONFIG_ENV: &str = "ADS_CONFIG";

/// `--config` > `$ADS_CONFIG` の順で設定ファイルを決める。どちらも無ければ既定値で動く
pub fn resolve_config_path(cli_path: Option<&Path>, env_value: Option<String>) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(p.to_path_buf());
    }
    env_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// JSON 設定を読み込む。パスが None なら既定値
pub fn load_config(path: Option<&Path>) -> Result<AdsConfig, Error> {
    let Some(path) = path else {
        return Ok(AdsConfig::default());
    };
    let content = fs::read_to_string(path)
        .map_err(|e| Error::io_msg(format!("failed to read config {}: {}", path.display(), e)))?;
    AdsConfig::parse(&content).map_err(|e| {
        Error::invalid_argument(format!("invalid config {}: {}", path.display(), e))
    })
}
