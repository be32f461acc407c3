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

pub mod desktop;
pub mod process;

pub use desktop::{validate_desktop_name, DesktopManager, WindowStation, DEFAULT_DESKTOP};
pub use process::{create_process, LaunchSpec};

/// 非 Windows 平台上所有桌面操作都直接失败
#[cfg(not(windows))]
pub(crate) fn unsupported<T>(op: &str) -> anyhow::Result<T> {
    anyhow::bail!("{op} is only available on Windows")
}
