//
// Copyright (C) Lenovo ThinkBook Gen4 Project.
//
// This program is protected under international and China copyright laws as
// an unpublished work. This program is confidential and proprietary to the
// copyright owners. Reproduction or disclosure, in whole or in part, or the
// production of derivative works therefrom without the express permission of
// the copyright owners is prohibited.
//
// All rights reserved.
//

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use log::trace;
use serde_derive::Deserialize;

pub const DEFAULT_DESKTOP_NAME: &str = "HeadlessDesktop";
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 2000;

/// 环境变量前缀，例如 DESKTOP_UTILS_STARTUP_DELAY_MS
const ENV_PREFIX: &str = "DESKTOP_UTILS";

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// 未指定 --desktop 时使用的桌面名称
    pub desktop_name: String,
    /// 在新桌面中先启动的 shell
    pub shell: String,
    /// 启动 explorer (或 --no-explorer 时启动命令) 后的等待时间
    pub startup_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            desktop_name: DEFAULT_DESKTOP_NAME.to_string(),
            shell: default_shell(),
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
        }
    }
}

/// %SystemRoot%\explorer.exe
pub fn default_shell() -> String {
    let system_root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
    format!("{}\\explorer.exe", system_root.trim_end_matches('\\'))
}

impl Settings {
    /// 读取配置
    ///
    /// 优先级: 环境变量 > %localappdata%\DesktopUtils\settings.toml > 默认值
    pub fn load() -> Result<Self> {
        Self::load_from(&hdesk_common::get_settings_file())
    }

    /// 配置文件不存在时只使用默认值和环境变量
    pub fn load_from(file_path: &Path) -> Result<Self> {
        Self::load_with_prefix(file_path, ENV_PREFIX)
    }

    /// 未知的键 (例如 DESKTOP_UTILS_LOG) 直接忽略
    fn load_with_prefix(file_path: &Path, env_prefix: &str) -> Result<Self> {
        trace!("Load settings from {:?}, env prefix: {}", file_path, env_prefix);

        let settings = Self::builder()?
            .add_source(File::from(file_path).required(false))
            .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    #[cfg(test)]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>> {
        let defaults = Settings::default();

        let builder = Config::builder()
            .set_default("desktop_name", defaults.desktop_name)?
            .set_default("shell", defaults.shell)?
            .set_default("startup_delay_ms", defaults.startup_delay_ms as i64)?;

        Ok(builder)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.desktop_name, "HeadlessDesktop");
        assert!(settings.shell.ends_with("\\explorer.exe"));
        assert_eq!(settings.startup_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let file_path = std::env::temp_dir().join("hdesk-no-such-dir/settings.toml");
        let settings = Settings::load_from(&file_path).unwrap();
        assert_eq!(settings.startup_delay_ms, DEFAULT_STARTUP_DELAY_MS);
    }

    #[test]
    fn test_toml_overrides_some_keys() {
        let settings = Settings::from_toml_str(
            r#"
            desktop_name = "Selenium"
            startup_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(settings.desktop_name, "Selenium");
        assert_eq!(settings.startup_delay(), Duration::from_millis(500));
        assert_eq!(settings.shell, default_shell());
    }

    #[test]
    fn test_toml_bad_value_is_error() {
        assert!(Settings::from_toml_str("startup_delay_ms = \"soon\"").is_err());
    }

    fn write_settings_file(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("{name}-{}", std::process::id()));
        hdesk_common::create_dir_if_not_exists(&dir).unwrap();
        let file_path = dir.join("settings.toml");
        std::fs::write(&file_path, content).unwrap();
        file_path
    }

    // 每个测试使用独立的环境变量前缀，互不干扰

    #[test]
    fn test_env_overrides_file() {
        let file_path = write_settings_file(
            "hdesk-settings-env",
            r#"
            desktop_name = "FromFile"
            shell = "C:\\Tools\\shell.exe"
            startup_delay_ms = 100
            "#,
        );

        std::env::set_var("HDESK_TEST_OVERRIDE_DESKTOP_NAME", "FromEnv");
        std::env::set_var("HDESK_TEST_OVERRIDE_STARTUP_DELAY_MS", "750");
        // 日志相关的变量与配置共用前缀
        std::env::set_var("HDESK_TEST_OVERRIDE_LOG", "debug");
        std::env::set_var("HDESK_TEST_OVERRIDE_LOG_DIR", "C:\\logs");

        let settings = Settings::load_with_prefix(&file_path, "HDESK_TEST_OVERRIDE").unwrap();

        assert_eq!(settings.desktop_name, "FromEnv");
        assert_eq!(settings.shell, "C:\\Tools\\shell.exe");
        assert_eq!(settings.startup_delay(), Duration::from_millis(750));

        std::fs::remove_dir_all(file_path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_env_without_file() {
        let file_path = std::env::temp_dir().join("hdesk-no-such-dir/settings.toml");
        std::env::set_var("HDESK_TEST_NOFILE_SHELL", "D:\\shell.exe");

        let settings = Settings::load_with_prefix(&file_path, "HDESK_TEST_NOFILE").unwrap();

        assert_eq!(settings.shell, "D:\\shell.exe");
        assert_eq!(settings.desktop_name, DEFAULT_DESKTOP_NAME);
        assert_eq!(settings.startup_delay_ms, DEFAULT_STARTUP_DELAY_MS);
    }

    #[test]
    fn test_env_bad_value_is_error() {
        let file_path = std::env::temp_dir().join("hdesk-no-such-dir/settings.toml");
        std::env::set_var("HDESK_TEST_BADENV_STARTUP_DELAY_MS", "soon");

        let err = Settings::load_with_prefix(&file_path, "HDESK_TEST_BADENV").unwrap_err();
        assert!(err.to_string().contains("startup_delay_ms"), "{err}");
    }
}
