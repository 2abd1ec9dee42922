// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, command, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// 章节第一页没有任何视频时的处理方式
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ChapterFailurePolicy {
    /// 中止整个运行
    #[default]
    Abort,
    /// 记录为失败章节并继续处理其它章节
    Skip,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true,
)]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 只抓取并打印课程目录，不下载任何视频
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub list: bool,
    /// 显示如何准备账户信息文件的指南并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub credentials_help: bool,

    // --- 下载选项 (Options) ---
    /// 账户信息文件 (一行: 邮箱 密码 网站地址)，优先于环境变量 [未指定时: 环境变量或 user.info]
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub credentials: Option<PathBuf>,
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// 保存视频时使用的文件扩展名
    #[arg(long, default_value_t = constants::DEFAULT_EXTENSION.to_string(), help_heading = "Options")]
    pub ext: String,
    /// 强制重新下载已存在的文件 (覆盖)
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub force_redownload: bool,
    /// 章节第一页没有视频时: 'abort' 中止运行, 'skip' 跳过该章节
    #[arg(long, value_enum, default_value_t = ChapterFailurePolicy::Abort, help_heading = "Options")]
    pub chapter_failure: ChapterFailurePolicy,
    /// 将抓取到的课程目录写入 JSON 文件
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub catalog_json: Option<PathBuf>,
    /// 以无界面模式启动浏览器
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub headless: bool,
    /// 等待页面标记元素出现的最长时间 (秒)
    #[arg(long, value_name = "SECS", help_heading = "Options")]
    pub wait_timeout: Option<u64>,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// 设置日志文件的输出级别
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true, help_heading = "General")]
    pub log_level: LogLevel,
    /// 日志文件路径 (每次运行时覆盖)
    #[arg(long, value_name = "FILE", default_value_os_t = PathBuf::from(constants::DEFAULT_LOG_FILE), global = true, help_heading = "General")]
    pub log_file: PathBuf,
}
