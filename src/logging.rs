//! 日誌初始化。
//!
//! 終端機畫面由 TUI 佔用，因此日誌一律寫入檔案。
//! 若工作區有 `config/log4rs.yaml` 就照它設定，否則以 `console.toml`
//! 的等級與路徑建立單一檔案輸出。

use std::path::Path;

use anyhow::{Context, Result};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::ConsoleSettings;

const LOG4RS_FILE: &str = "config/log4rs.yaml";
const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

pub fn init(workspace_root: &Path, settings: &ConsoleSettings) -> Result<()> {
    let yaml = workspace_root.join(LOG4RS_FILE);
    if yaml.exists() {
        return log4rs::init_file(&yaml, Default::default())
            .with_context(|| format!("載入日誌設定失敗: {}", yaml.display()));
    }

    let config = file_config(&settings.log_file(workspace_root), settings.log_level())?;
    log4rs::init_config(config).context("初始化日誌失敗")?;
    Ok(())
}

fn file_config(path: &Path, level: log::LevelFilter) -> Result<Config> {
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(path)
        .with_context(|| format!("無法開啟日誌檔: {}", path.display()))?;

    Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level))
        .context("日誌設定無效")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_creates_the_log_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/amy-console.log");
        let config = file_config(&path, log::LevelFilter::Debug).unwrap();
        assert_eq!(config.root().level(), log::LevelFilter::Debug);
        assert!(path.parent().unwrap().is_dir());
    }
}
