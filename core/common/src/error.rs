//! エラーハンドリング
//!
//! 全レイヤーで共通のエラー型。終了コードは sysexits 準拠。

/// 共通エラー型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// I/O エラー
    #[error("I/O error: {0}")]
    Io(String),
    /// JSON のパース・シリアライズ失敗
    #[error("JSON error: {0}")]
    Json(String),
    /// 引数不正（使い方の誤り）
    #[error("{0}")]
    InvalidArgument(String),
    /// 外部ストアの失敗
    #[error("storage error: {0}")]
    Storage(String),
    /// 内部エラー
    #[error("{0}")]
    System(String),
}

impl Error {
    pub fn io_msg(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// 使い方の誤りか（main で usage を表示するかの判定に使う）
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// プロセス終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Json(_) => 65,
            Self::Storage(_) | Self::System(_) => 70,
            Self::Io(_) => 74,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
