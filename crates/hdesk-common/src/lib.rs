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

use std::{
    io,
    path::{Path, PathBuf},
};

/// 应用数据目录名，位于 %localappdata% 之下
pub const APP_DIR_NAME: &str = "DesktopUtils";

/// 获得应用数据目录
///
/// %localappdata%\DesktopUtils
///
/// 取不到 %localappdata% 时退回到当前目录下的 DesktopUtils
pub fn get_app_data_dir() -> PathBuf {
    let mut local_dir = dirs::data_local_dir().unwrap_or_default();
    local_dir.push(APP_DIR_NAME);
    local_dir
}

/// 获得配置文件路径
///
/// %localappdata%\DesktopUtils\settings.toml
pub fn get_settings_file() -> PathBuf {
    let mut file_path = get_app_data_dir();
    file_path.push("settings.toml");
    file_path
}

/// 如果目录不存在则创建
pub fn create_dir_if_not_exists<P>(dir_path: P) -> io::Result<()>
where
    P: AsRef<Path>,
{
    if !dir_path.as_ref().exists() {
        std::fs::create_dir_all(dir_path.as_ref())?;
    }
    Ok(())
}

#[test]
fn test_get_settings_file() {
    let file_path = get_settings_file();
    assert_eq!(file_path.file_name().unwrap(), "settings.toml");
    assert!(file_path.parent().unwrap().ends_with(APP_DIR_NAME));
}

#[test]
fn test_create_dir_if_not_exists() {
    let dir = std::env::temp_dir().join(format!("hdesk-common-{}", std::process::id()));
    let nested = dir.join("a").join("b");

    create_dir_if_not_exists(&nested).expect("create_dir_if_not_exists");
    assert!(nested.is_dir());

    // 已存在时不报错
    create_dir_if_not_exists(&nested).expect("create_dir_if_not_exists twice");

    std::fs::remove_dir_all(&dir).unwrap();
}
