use std::path::PathBuf;

/// main でディスパッチするコマンド
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdsctlCommand {
    Help,
    Replay { scenario: PathBuf },
    ShowConfig,
}

impl AdsctlCommand {
    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Replay { .. } => "replay",
            Self::ShowConfig => "config",
        }
    }
}
