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

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use flexi_logger::writers::LogWriter;
use flexi_logger::{
    Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming, Record,
};

/// 日志级别环境变量，取值为 flexi_logger 的 log spec，例如 `debug`
pub const LOG_SPEC_ENV: &str = "DESKTOP_UTILS_LOG";

/// 日志目录环境变量，设置后额外写入滚动日志文件
pub const LOG_DIR_ENV: &str = "DESKTOP_UTILS_LOG_DIR";

const LOG_BASENAME: &str = "desktop_utils";

/// Calls the `OutputDebugString` API to log a string.
///
/// On non-Windows platforms, this function does nothing.
///
/// See [`OutputDebugStringW`](https://docs.microsoft.com/en-us/windows/win32/api/debugapi/nf-debugapi-outputdebugstringw).
pub fn output_debug_string(s: &str) {
    #[cfg(windows)]
    {
        use windows::core::PCWSTR;
        use windows::Win32::System::Diagnostics::Debug::OutputDebugStringW;

        if let Ok(s_utf16) = widestring::U16CString::from_str(s) {
            unsafe {
                OutputDebugStringW(PCWSTR::from_raw(s_utf16.as_ptr()));
            }
        }
    }
    #[cfg(not(windows))]
    {
        let _ = s;
    }
}

/// 转发到 DebugView
struct DebugViewLogWriter;

impl LogWriter for DebugViewLogWriter {
    fn write(&self, _now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
        output_debug_string(&format!("[{}] {}", record.level(), &record.args()));
        Ok(())
    }

    fn flush(&self) -> std::io::Result<()> {
        // ignore
        Ok(())
    }
}

/// 控制台只输出消息本身
pub fn message_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(w, "{}", &record.args())
}

/// 日志文件格式: `2022-10-01 12:00:00 [INFO] message`
pub fn file_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    write!(
        w,
        "{} [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        &record.args()
    )
}

/// Debug 构建输出全部日志，Release 构建只输出 info 及以上
pub fn default_log_spec() -> &'static str {
    if cfg!(debug_assertions) {
        "trace"
    } else {
        "info"
    }
}

fn log_spec_from(value: Option<String>) -> String {
    match value {
        Some(spec) if !spec.trim().is_empty() => spec.trim().to_string(),
        _ => default_log_spec().to_string(),
    }
}

fn log_dir_from(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|dir| !dir.is_empty()).map(PathBuf::from)
}

/// Initialise the logger from the environment.
///
/// * `DESKTOP_UTILS_LOG` selects the log spec, see [`default_log_spec`] for the fallback.
/// * `DESKTOP_UTILS_LOG_DIR` additionally enables a rotating log file in that directory.
///
/// The returned handle must be kept alive until the program exits.
pub fn init_with_env() -> anyhow::Result<LoggerHandle> {
    let spec = log_spec_from(std::env::var(LOG_SPEC_ENV).ok());
    let log_dir = log_dir_from(std::env::var_os(LOG_DIR_ENV));
    init_with_spec(&spec, log_dir)
}

/// Initialise the logger with an explicit log spec.
///
/// Messages always go to stderr (message only) and to `OutputDebugString`.
/// stdout is left to the program's own output.
pub fn init_with_spec(spec: &str, log_dir: Option<PathBuf>) -> anyhow::Result<LoggerHandle> {
    let logger = Logger::try_with_str(spec)?;

    let logger = match log_dir {
        Some(dir) => {
            hdesk_common::create_dir_if_not_exists(&dir)?;

            logger
                .log_to_file_and_writer(
                    FileSpec::default().directory(dir).basename(LOG_BASENAME),
                    Box::new(DebugViewLogWriter),
                )
                // do not truncate the log file when the program is restarted
                .append()
                .rotate(
                    Criterion::Size(1024 * 1024 * 2),
                    Naming::Timestamps,
                    Cleanup::KeepLogFiles(16),
                )
                .format_for_files(file_format)
        }
        None => logger.log_to_writer(Box::new(DebugViewLogWriter)),
    };

    let handle = logger
        .duplicate_to_stderr(Duplicate::All)
        .format_for_stderr(message_format)
        .start()?;

    Ok(handle)
}
