use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ホームディレクトリが見つかりません")]
    HomeDirNotFound,

    #[error("プロファイルが見つかりません: {0}")]
    ProfileNotFound(String),

    #[error("プロファイル {name} の設定ファイルが壊れています: {reason}")]
    ProfileCorrupt { name: String, reason: String },

    #[error("プロファイルは既に存在します: {0}")]
    ProfileAlreadyExists(String),

    #[error("不正なプロファイル名です: {0:?}")]
    InvalidProfileName(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
