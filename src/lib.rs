// src/lib.rs

pub mod browser;
pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod models;
pub mod symbols;
pub mod ui;
pub mod utils;
pub mod workflows;

use crate::{
    browser::ChromeDriver,
    cli::Cli,
    client::HttpTransport,
    config::AppConfig,
    downloader::DownloadManager,
    error::{AppError, AppResult},
};
use anyhow::anyhow;
use colored::*;
use log::{debug, info};
use std::sync::{Arc, atomic::AtomicBool};

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: Arc<AtomicBool>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    if args.credentials_help {
        ui::box_message(
            "准备账户信息指南",
            constants::HELP_CREDENTIALS_GUIDE
                .lines()
                .collect::<Vec<_>>()
                .as_slice(),
            |s| s.cyan(),
        );
        println!(
            "\n{} 安全提醒: 账户信息文件包含明文密码，请妥善保管。",
            *symbols::INFO
        );
        return Ok(());
    }

    let config = Arc::new(AppConfig::new(&args)?);
    debug!("加载的应用配置: {:?}", config);

    let (credentials, source) = config::credentials::resolve_credentials(args.credentials.as_deref())?;
    info!("从 {} 加载账户信息: {:?}", source, credentials);
    println!("\n{} 已从 {} 加载账户信息。", *symbols::INFO, source);

    ui::print_header("抓取课程目录");
    let driver = ChromeDriver::launch(&config).await?;
    let catalog = workflows::crawl_catalog(driver, config.clone(), &credentials).await?;

    if let Some(path) = &args.catalog_json {
        workflows::write_catalog_json(&catalog, path)?;
    }
    if args.list {
        workflows::print_catalog(&catalog);
        return Ok(());
    }

    let transport = HttpTransport::new(&config)?;
    let manager = DownloadManager::new();
    let all_succeeded =
        workflows::download_catalog(transport, config, &catalog, manager.clone(), cancellation_token).await?;
    if !all_succeeded {
        let failed = manager.get_stats().failed;
        return Err(AppError::Other(anyhow!("{} 个课时下载失败，详情见日志文件。", failed)));
    }
    Ok(())
}
