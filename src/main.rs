// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use kajabi_dl::{
    cli::{Cli, LogLevel},
    error::AppError,
    run_from_cli, symbols,
};
use log::{error, info, warn};
use std::{
    fs::File,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// 日志只写入文件，每次运行时覆盖上一次的内容。
fn init_logger(level: LogLevel, log_file_path: &Path) {
    if level == LogLevel::Off {
        return;
    }

    if let Some(dir) = log_file_path.parent().filter(|d| !d.as_os_str().is_empty())
        && let Err(e) = std::fs::create_dir_all(dir)
    {
        eprintln!("警告: 无法创建日志目录 {:?}: {}", dir, e);
    }

    let file_appender = match File::create(log_file_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "警告: 无法创建日志文件 {:?}: {}。日志将不会被记录到文件。",
                log_file_path, e
            );
            return;
        }
    };

    let result = fern::Dispatch::new()
        .level(level.into())
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] [{:<5}] [{}:{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.line().unwrap_or(0),
                message
            ))
        })
        .chain(file_appender)
        .apply();

    if let Err(e) = result {
        eprintln!("警告: 日志系统初始化失败: {}", e);
    }
}

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let after_help = format!(
        "示例:\n  # 下载全部课程 (账户信息读取自 user.info)\n  {bin}\n\n  # 只查看课程目录并保存为 JSON\n  {bin} --list --catalog-json catalog.json\n\n  # 保存到指定目录并覆盖已有文件\n  {bin} -o ./videos -f\n\n  # 查看账户信息文件格式\n  {bin} --credentials-help",
        bin = clap::crate_name!()
    );
    let cmd = Cli::command().after_help(after_help);
    let args = match Cli::from_arg_matches(&cmd.get_matches()) {
        Ok(args) => Arc::new(args),
        Err(e) => e.exit(),
    };
    init_logger(args.log_level, &args.log_file);

    let cancellation_token = Arc::new(AtomicBool::new(false));
    let handler_token = cancellation_token.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("无法监听 Ctrl-C 信号: {}", e);
            return;
        }
        if handler_token.load(Ordering::Relaxed) {
            println!("\n第二次中断，强制退出...");
            warn!("用户第二次按下 Ctrl+C，强制退出。");
            std::process::exit(130);
        }
        println!(
            "\n{} 正在停止... 请等待当前文件完成。再按一次 {} 可强制退出。",
            *symbols::WARN,
            *symbols::CTRL_C
        );
        warn!("用户通过 Ctrl+C 请求中断程序。");
        handler_token.store(true, Ordering::Relaxed);
    });

    if let Err(e) = run_from_cli(args, cancellation_token).await {
        match e {
            AppError::UserInterrupt => {
                warn!("程序被用户中断。");
                std::process::exit(130);
            }
            AppError::Credentials(_) => {
                error!("程序因账户信息错误而退出: {}", e);
                eprintln!("\n{} {}", *symbols::ERROR, e.to_string().red());
                eprintln!("{} 请使用 --credentials-help 查看如何准备账户信息。", *symbols::INFO);
                std::process::exit(1);
            }
            _ => {
                error!("程序执行出错: {}", e);
                eprintln!("\n{} {}", *symbols::ERROR, format!("程序执行出错: {}", e).red());
                std::process::exit(1);
            }
        }
    }
    info!("程序正常退出。");
}
