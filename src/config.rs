use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::phrase_matcher::PhraseEntry;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 启动时显示的状态文本
    #[serde(default = "default_initial_message")]
    pub initial_message: String,
    pub azure: AzureConfig,
    /// 短语表，按顺序匹配
    #[serde(default)]
    pub phrases: Vec<PhraseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub subscription_key: String,
    pub region: String,
    /// 识别语言，默认 "en-US"
    #[serde(default = "default_language")]
    pub language: String,
    /// 请求超时（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 自定义服务地址，覆盖按 region 拼出的地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

fn default_initial_message() -> String {
    "Click the button to recognize speech".to_string()
}
fn default_language() -> String {
    "en-US".to_string()
}
fn default_timeout() -> u64 {
    15
}

/// 获取配置文件路径
pub fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voice-anim-trigger");
    config_dir.join("config.toml")
}

/// 加载配置，文件不存在则创建默认配置
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    } else {
        let config = default_config();
        save_config_to(&config, path)?;
        log::info!("已创建默认配置: {}", path.display());
        Ok(config)
    }
}

/// 保存配置到文件
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let write_err = |source| Error::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(write_err)?;
    Ok(())
}

/// 默认配置
fn default_config() -> AppConfig {
    let phrases = vec![
        PhraseEntry::new("hello there", "wave", 0.8),
        PhraseEntry::new("jump", "jump", 0.75),
        PhraseEntry::new("dance for me", "dance", 0.8),
        PhraseEntry::new("sit down", "sit", 0.8),
        PhraseEntry::new("good bye", "bow", 0.8),
    ];

    AppConfig {
        initial_message: default_initial_message(),
        azure: AzureConfig {
            subscription_key: "your-subscription-key".to_string(),
            region: "westus".to_string(),
            language: default_language(),
            timeout_secs: default_timeout(),
            endpoint: None,
        },
        phrases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [azure]
            subscription_key = "abc"
            region = "eastus"

            [[phrases]]
            phrase = "hello there"
            action = "wave"

            [[phrases]]
            phrase = "jump"
            action = "jump"
            threshold = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.initial_message, "Click the button to recognize speech");
        assert_eq!(config.azure.language, "en-US");
        assert_eq!(config.azure.timeout_secs, 15);
        assert_eq!(config.azure.endpoint, None);
        assert_eq!(
            config.phrases,
            vec![
                PhraseEntry::new("hello there", "wave", 0.8),
                PhraseEntry::new("jump", "jump", 0.6),
            ]
        );
    }

    #[test]
    fn test_missing_file_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = load_config_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.phrases.len(), 5);

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.phrases, created.phrases);
        assert_eq!(reloaded.azure.region, "westus");
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "phrases = 3").unwrap();

        assert!(matches!(load_config_from(&path), Err(Error::ConfigParse(_))));
    }
}
