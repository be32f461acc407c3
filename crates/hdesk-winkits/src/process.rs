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

use anyhow::{bail, Result};

/// 一次 CreateProcessW 调用的参数
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    /// lpApplicationName, None 时由命令行第一个参数决定
    pub application: Option<String>,
    /// lpCommandLine
    pub command_line: String,
}

impl LaunchSpec {
    /// 只有命令行，例如 `cmd /c start chrome.exe`
    pub fn command<S: Into<String>>(command_line: S) -> Self {
        Self {
            application: None,
            command_line: command_line.into(),
        }
    }

    /// 直接启动某个可执行文件，命令行只包含该文件路径
    pub fn application<S: Into<String>>(path: S) -> Self {
        let path = path.into();
        Self {
            command_line: quote_argument(&path),
            application: Some(path),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.command_line.trim().is_empty() {
            bail!("Command line must not be empty");
        }
        if let Some(application) = &self.application {
            if application.trim().is_empty() {
                bail!("Application path must not be empty");
            }
        }
        Ok(())
    }
}

/// 含空白字符的参数加上双引号
pub fn quote_argument(arg: &str) -> String {
    let already_quoted = arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"');
    if !already_quoted && (arg.is_empty() || arg.contains(char::is_whitespace)) {
        format!("\"{arg}\"")
    } else {
        arg.to_string()
    }
}

/// 在指定桌面中启动进程，不等待其结束
///
/// 返回新进程的 PID
#[cfg(windows)]
pub fn create_process(desktop: &str, spec: &LaunchSpec) -> Result<u32> {
    use std::mem::size_of;

    use anyhow::Context;
    use log::info;
    use widestring::U16CString;
    use windows::core::{PCWSTR, PWSTR};
    use windows::Win32::Foundation::CloseHandle;
    use windows::Win32::System::Threading::{
        CreateProcessW, CREATE_NEW_CONSOLE, NORMAL_PRIORITY_CLASS, PROCESS_INFORMATION,
        STARTUPINFOW,
    };

    spec.validate()?;

    let mut desktop16 = U16CString::from_str(desktop)?;
    let application16 = match &spec.application {
        Some(application) => Some(U16CString::from_str(application)?),
        None => None,
    };
    let mut cmdline16 = U16CString::from_str(&spec.command_line)?;

    let si = STARTUPINFOW {
        cb: size_of::<STARTUPINFOW>() as u32,
        lpDesktop: PWSTR::from_raw(desktop16.as_mut_ptr()),
        ..Default::default()
    };
    let mut pi = PROCESS_INFORMATION::default();

    unsafe {
        CreateProcessW(
            application16
                .as_ref()
                .map_or(PCWSTR::null(), |app| PCWSTR::from_raw(app.as_ptr())),
            PWSTR::from_raw(cmdline16.as_mut_ptr()),
            None,
            None,
            false,
            NORMAL_PRIORITY_CLASS | CREATE_NEW_CONSOLE,
            None,
            PCWSTR::null(),
            &si,
            &mut pi,
        )
        .with_context(|| {
            format!(
                "CreateProcessW failed, desktop: {desktop}, command: {}",
                spec.command_line
            )
        })?;

        // 不监管子进程
        let _ = CloseHandle(pi.hThread);
        let _ = CloseHandle(pi.hProcess);
    }

    info!(
        "CreateProcessW: desktop: {desktop}, command: {}, pid: {}",
        spec.command_line, pi.dwProcessId
    );

    Ok(pi.dwProcessId)
}

#[cfg(not(windows))]
pub fn create_process(desktop: &str, spec: &LaunchSpec) -> Result<u32> {
    spec.validate()?;
    let _ = desktop;
    crate::unsupported("CreateProcess")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_spec_quotes_path() {
        let spec = LaunchSpec::application("C:\\Program Files\\Shell\\shell.exe");
        assert_eq!(
            spec.application.as_deref(),
            Some("C:\\Program Files\\Shell\\shell.exe")
        );
        assert_eq!(spec.command_line, "\"C:\\Program Files\\Shell\\shell.exe\"");

        let spec = LaunchSpec::application("C:\\Windows\\explorer.exe");
        assert_eq!(spec.command_line, "C:\\Windows\\explorer.exe");
    }

    #[test]
    fn test_command_spec_has_no_application() {
        let spec = LaunchSpec::command("cmd /c start chrome.exe");
        assert_eq!(spec.application, None);
        assert_eq!(spec.command_line, "cmd /c start chrome.exe");
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        assert!(LaunchSpec::command("").validate().is_err());
        assert!(LaunchSpec::command(" \t").validate().is_err());
    }

    #[test]
    fn test_quote_argument() {
        assert_eq!(quote_argument("a.exe"), "a.exe");
        assert_eq!(quote_argument("a b.exe"), "\"a b.exe\"");
        assert_eq!(quote_argument("\"a b.exe\""), "\"a b.exe\"");
        assert_eq!(quote_argument(""), "\"\"");
    }

    #[test]
    fn test_create_process_rejects_empty_before_os_call() {
        let err = create_process("HeadlessDesktop", &LaunchSpec::command("  ")).unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "{err}");
    }
}
