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

///////////////////////////////////////////////////////////////////////////////
/// Mods
///
mod app;
mod cli;
mod settings;

use std::process::ExitCode;

///////////////////////////////////////////////////////////////////////////////
/// Package Imports
///
use hdesk_winkits::WindowStation;

use crate::settings::Settings;

///////////////////////////////////////////////////////////////////////////////
/// Functions
///

/// 初始化 Panic 的输出为日志
fn init_panic_output() {
    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("PANIC: {:?}, BACKTRACE: {:?}", info, backtrace);
    }));
}

fn main() -> ExitCode {
    // 初始化日志系统
    let _logger = match hdesk_logger::init_with_env() {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialise logger: {e:#}");
            return ExitCode::from(app::EXIT_FAILURE);
        }
    };

    // 设置 PANIC 错误输出
    init_panic_output();

    let mut station = WindowStation::new();
    let mut stdout = std::io::stdout();

    // 配置在解析命令行之后读取，--help 不受配置影响
    ExitCode::from(app::run_with(
        std::env::args_os(),
        &mut station,
        Settings::load,
        &mut stdout,
    ))
}
