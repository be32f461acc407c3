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

//! 当前 Window Station 上的桌面操作
//!
//! 每个操作都是一次阻塞的系统调用，失败时直接返回错误，不做重试。

use anyhow::{bail, Result};

use crate::process::LaunchSpec;

/// 用户可见的默认桌面
pub const DEFAULT_DESKTOP: &str = "Default";

// From WinUser.h
pub const DESKTOP_READOBJECTS: u32 = 0x0001;
pub const DESKTOP_CREATEWINDOW: u32 = 0x0002;
pub const DESKTOP_CREATEMENU: u32 = 0x0004;
pub const DESKTOP_HOOKCONTROL: u32 = 0x0008;
pub const DESKTOP_JOURNALRECORD: u32 = 0x0010;
pub const DESKTOP_JOURNALPLAYBACK: u32 = 0x0020;
pub const DESKTOP_ENUMERATE: u32 = 0x0040;
pub const DESKTOP_WRITEOBJECTS: u32 = 0x0080;
pub const DESKTOP_SWITCHDESKTOP: u32 = 0x0100;
pub const STANDARD_RIGHTS_REQUIRED: u32 = 0x000F_0000;

/// 桌面对象的全部访问权限
pub const DESKTOP_GENERIC_ALL: u32 = DESKTOP_CREATEMENU
    | DESKTOP_CREATEWINDOW
    | DESKTOP_ENUMERATE
    | DESKTOP_HOOKCONTROL
    | DESKTOP_JOURNALPLAYBACK
    | DESKTOP_JOURNALRECORD
    | DESKTOP_READOBJECTS
    | DESKTOP_SWITCHDESKTOP
    | DESKTOP_WRITEOBJECTS
    | STANDARD_RIGHTS_REQUIRED;

/// 检查桌面名称
///
/// 桌面名称不能为空，也不能包含 `\`
pub fn validate_desktop_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Desktop name must not be empty");
    }
    if name.contains('\\') {
        bail!("Desktop name '{}' must not contain '\\'", name);
    }
    Ok(())
}

/// 桌面管理接口
///
/// [`WindowStation`] 是基于 Win32 的实现
pub trait DesktopManager {
    /// 列出当前 Window Station 上的所有桌面名称
    fn desktops(&self) -> Result<Vec<String>>;

    /// 切换到指定桌面
    fn switch_to(&self, name: &str) -> Result<()>;

    /// 切换到默认桌面
    fn switch_to_default(&self) -> Result<()> {
        self.switch_to(DEFAULT_DESKTOP)
    }

    /// 创建桌面，句柄由实现方持有
    fn create(&mut self, name: &str) -> Result<()>;

    /// 在指定桌面中启动进程，返回 PID
    fn create_process(&mut self, desktop: &str, spec: &LaunchSpec) -> Result<u32>;
}

#[cfg(windows)]
pub use win32::Desktop;

#[cfg(windows)]
mod win32 {
    use anyhow::{Context, Result};
    use log::{debug, info};
    use widestring::{U16CStr, U16CString};
    use windows::core::{PCWSTR, PWSTR};
    use windows::Win32::Foundation::{BOOL, LPARAM};
    use windows::Win32::System::StationsAndDesktops::{
        CloseDesktop, CreateDesktopW, EnumDesktopsW, GetProcessWindowStation, OpenDesktopW,
        SwitchDesktop, DESKTOP_CONTROL_FLAGS, HDESK,
    };

    use super::DESKTOP_GENERIC_ALL;

    /// Wrapper around a HDESK handle that closes the handle on drop
    ///
    /// 关闭句柄不会销毁桌面，桌面上仍有进程时桌面继续存在
    #[derive(Debug)]
    pub struct Desktop {
        name: String,
        hdesk: HDESK,
    }

    impl Desktop {
        /// 在当前 Window Station 上创建桌面，已存在时打开该桌面
        pub fn create(name: &str) -> Result<Self> {
            let name16 = U16CString::from_str(name)?;

            let hdesk = unsafe {
                CreateDesktopW(
                    PCWSTR::from_raw(name16.as_ptr()),
                    PCWSTR::null(),
                    None,
                    DESKTOP_CONTROL_FLAGS(0),
                    DESKTOP_GENERIC_ALL,
                    None,
                )
            }
            .with_context(|| format!("CreateDesktopW failed, desktop: {name}"))?;

            info!("CreateDesktopW: {name}, hdesk: {hdesk:?}");

            Ok(Self {
                name: name.to_string(),
                hdesk,
            })
        }

        pub fn open(name: &str, desired_access: u32) -> Result<Self> {
            let name16 = U16CString::from_str(name)?;

            let hdesk = unsafe {
                OpenDesktopW(
                    PCWSTR::from_raw(name16.as_ptr()),
                    DESKTOP_CONTROL_FLAGS(0),
                    false,
                    desired_access,
                )
            }
            .with_context(|| format!("OpenDesktopW failed, desktop: {name}"))?;

            debug!("OpenDesktopW: {name}, hdesk: {hdesk:?}");

            Ok(Self {
                name: name.to_string(),
                hdesk,
            })
        }

        /// 激活桌面，使其接收用户输入
        pub fn switch(&self) -> Result<()> {
            unsafe { SwitchDesktop(self.hdesk) }
                .with_context(|| format!("SwitchDesktop failed, desktop: {}", self.name))?;
            info!("SwitchDesktop: {}", self.name);
            Ok(())
        }
    }

    impl Drop for Desktop {
        fn drop(&mut self) {
            let _ = unsafe { CloseDesktop(self.hdesk) };
        }
    }

    /// 枚举当前进程所属 Window Station 上的桌面
    pub fn enum_desktops() -> Result<Vec<String>> {
        unsafe extern "system" fn enum_desktop(name: PWSTR, lparam: LPARAM) -> BOOL {
            let names = &mut *(lparam.0 as *mut Vec<String>);
            if !name.is_null() {
                names.push(U16CStr::from_ptr_str(name.0).to_string_lossy());
            }
            BOOL(1)
        }

        let mut names: Vec<String> = Vec::new();

        unsafe {
            let winsta = GetProcessWindowStation().context("GetProcessWindowStation failed")?;
            EnumDesktopsW(
                winsta,
                Some(enum_desktop),
                LPARAM(&mut names as *mut Vec<String> as isize),
            )
            .context("EnumDesktopsW failed")?;
        }

        debug!("EnumDesktopsW: {:?}", names);
        Ok(names)
    }
}

/// 当前进程所属的 Window Station
///
/// 创建出的桌面句柄保存在这里，直到本对象销毁
#[derive(Debug, Default)]
pub struct WindowStation {
    #[cfg(windows)]
    created: Vec<Desktop>,
}

impl WindowStation {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(windows)]
impl DesktopManager for WindowStation {
    fn desktops(&self) -> Result<Vec<String>> {
        win32::enum_desktops()
    }

    fn switch_to(&self, name: &str) -> Result<()> {
        validate_desktop_name(name)?;
        Desktop::open(name, DESKTOP_SWITCHDESKTOP)?.switch()
    }

    fn create(&mut self, name: &str) -> Result<()> {
        validate_desktop_name(name)?;
        let desktop = Desktop::create(name)?;
        self.created.push(desktop);
        Ok(())
    }

    fn create_process(&mut self, desktop: &str, spec: &LaunchSpec) -> Result<u32> {
        crate::process::create_process(desktop, spec)
    }
}

#[cfg(not(windows))]
impl DesktopManager for WindowStation {
    fn desktops(&self) -> Result<Vec<String>> {
        crate::unsupported("EnumDesktops")
    }

    fn switch_to(&self, name: &str) -> Result<()> {
        validate_desktop_name(name)?;
        crate::unsupported("SwitchDesktop")
    }

    fn create(&mut self, name: &str) -> Result<()> {
        validate_desktop_name(name)?;
        crate::unsupported("CreateDesktop")
    }

    fn create_process(&mut self, desktop: &str, spec: &LaunchSpec) -> Result<u32> {
        crate::process::create_process(desktop, spec)
    }
}
