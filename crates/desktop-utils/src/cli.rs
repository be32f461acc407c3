use anyhow::{bail, Result};
use clap::Parser;

use crate::settings::Settings;

pub const HEADER: &str = concat!(
    "Desktop utils v",
    env!("CARGO_PKG_VERSION_MAJOR"),
    ".",
    env!("CARGO_PKG_VERSION_MINOR")
);

#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "desktop_utils", version, about = HEADER, long_about = None)]
pub struct Args {
    /// Command to run headlessly.
    #[arg(short, long, value_name = "CMD")]
    pub run: Option<String>,

    /// Set the headless desktop name. Used with '--run'. Optional, default = HeadlessDesktop
    #[arg(short = 'n', long, value_name = "NAME")]
    pub desktop: Option<String>,

    /// List available desktops of current Window station.
    #[arg(short, long)]
    pub list: bool,

    /// Switch to a desktop. Takes a desktop name from the list of desktops.
    #[arg(short, long, value_name = "NAME")]
    pub switch_to: Option<String>,

    /// Switch to the default desktop. Can be used if you are being stranded.
    #[arg(short = 't', long)]
    pub switch_to_default: bool,

    /// Don't run explorer in the created desktop
    #[arg(short = 'x', long)]
    pub no_explorer: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub command: String,
    pub desktop: String,
    pub explorer: bool,
}

/// 每次运行只执行一个动作
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    SwitchToDefault,
    SwitchTo(String),
    List,
    Run(RunOptions),
}

impl Action {
    /// 多个参数同时出现时按以下顺序取第一个:
    /// --switch-to-default, --switch-to, --list, --run
    pub fn from_args(args: &Args, settings: &Settings) -> Result<Self> {
        if args.switch_to_default {
            Ok(Action::SwitchToDefault)
        } else if let Some(name) = &args.switch_to {
            Ok(Action::SwitchTo(name.clone()))
        } else if args.list {
            Ok(Action::List)
        } else if let Some(command) = &args.run {
            Ok(Action::Run(RunOptions {
                command: command.clone(),
                desktop: args
                    .desktop
                    .clone()
                    .unwrap_or_else(|| settings.desktop_name.clone()),
                explorer: !args.no_explorer,
            }))
        } else {
            bail!("--run option must be specified!")
        }
    }
}
