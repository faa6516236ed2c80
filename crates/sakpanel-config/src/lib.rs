//! usacloud 互換のプロファイルストア
//!
//! `~/.usacloud/<name>/config.json` に保存された認証情報と、
//! `~/.usacloud/current` のカレントプロファイル指定を読み書きする。

pub mod error;
pub mod profile;
pub mod store;

pub use error::*;
pub use profile::{Profile, ProfileCredentials};
pub use store::{DEFAULT_ZONE, FALLBACK_PROFILE, PROFILE_DIR_ENV, ProfileStore};
