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
use std::time::Duration;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};

use hdesk_winkits::{DesktopManager, LaunchSpec};

use crate::cli::{Action, Args, RunOptions, HEADER};
use crate::settings::Settings;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// 解析命令行并执行，返回进程退出码
///
/// `--help` / `--version` 在读取配置之前处理，配置损坏时仍然可以查看用法。
/// 所有错误都在这里记录日志并转换为退出码 1
pub fn run_with<I, T, M, L, W>(argv: I, manager: &mut M, load_settings: L, out: &mut W) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    M: DesktopManager,
    L: FnOnce() -> Result<Settings>,
    W: Write,
{
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = write!(out, "{e}");
                    EXIT_SUCCESS
                }
                _ => {
                    error!("{}", e.to_string().trim_end());
                    EXIT_FAILURE
                }
            };
        }
    };

    let settings = match load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load settings: {:#}", e);
            return EXIT_FAILURE;
        }
    };

    match dispatch(&args, manager, &settings, out) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

pub fn dispatch<M, W>(args: &Args, manager: &mut M, settings: &Settings, out: &mut W) -> Result<()>
where
    M: DesktopManager,
    W: Write,
{
    match Action::from_args(args, settings)? {
        Action::SwitchToDefault => manager.switch_to_default(),
        Action::SwitchTo(name) => manager.switch_to(&name),
        Action::List => list_desktops(manager, out),
        Action::Run(options) => run_headless(manager, settings, &options),
    }
}

fn list_desktops<M, W>(manager: &M, out: &mut W) -> Result<()>
where
    M: DesktopManager,
    W: Write,
{
    let desktops = manager.desktops()?;

    writeln!(out, "{HEADER}")?;
    writeln!(out)?;
    writeln!(out, "* Available desktops:")?;
    for desktop in desktops {
        writeln!(out, "{desktop}")?;
    }
    out.flush()?;

    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Step {
    Launch(LaunchSpec),
    Wait(Duration),
}

/// 启动顺序
///
/// 有 shell 时: shell -> 等待 -> 命令
/// 无 shell 时: 命令 -> 等待
fn launch_plan(settings: &Settings, options: &RunOptions) -> Vec<Step> {
    let command = Step::Launch(LaunchSpec::command(&options.command));
    let wait = Step::Wait(settings.startup_delay());

    if options.explorer {
        vec![
            Step::Launch(LaunchSpec::application(&settings.shell)),
            wait,
            command,
        ]
    } else {
        vec![command, wait]
    }
}

/// 创建桌面，先启动 shell（可选），再启动目标命令
fn run_headless<M>(manager: &mut M, settings: &Settings, options: &RunOptions) -> Result<()>
where
    M: DesktopManager,
{
    manager.create(&options.desktop)?;

    for step in launch_plan(settings, options) {
        match step {
            Step::Launch(spec) => {
                info!("Running `{}` in desktop {}", spec.command_line, options.desktop);
                manager.create_process(&options.desktop, &spec)?;
            }
            Step::Wait(delay) => wait_for_startup(delay),
        }
    }

    Ok(())
}

/// 给新进程留出初始化时间
fn wait_for_startup(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}
