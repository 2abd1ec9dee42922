// src/downloader/mod.rs

mod job;
mod task_processor;
mod task_runner;

pub use job::{CatalogDownloader, DownloadPlan, plan_downloads};
pub use task_processor::{TaskProcessor, fetch};
pub use task_runner::execute_tasks;

// DownloadManager 是整个批次共享的统计与报告状态
use crate::{models::DownloadStatus, symbols, ui};
use colored::*;
use log::info;
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct DownloadStats {
    pub total: usize,
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Clone, Default)]
pub struct DownloadManager {
    stats: Arc<Mutex<DownloadStats>>,
    failed_downloads: Arc<Mutex<Vec<(String, String)>>>,
    skipped_downloads: Arc<Mutex<Vec<(String, String)>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl DownloadManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_batch(&self, total_tasks: usize) {
        info!("开始新一批下载任务，总数: {}", total_tasks);
        *lock(&self.stats) = DownloadStats {
            total: total_tasks,
            ..Default::default()
        };
        lock(&self.failed_downloads).clear();
        lock(&self.skipped_downloads).clear();
    }

    pub fn record_success(&self) {
        lock(&self.stats).success += 1;
    }

    pub fn record_skip(&self, filename: &str, reason: &str) {
        info!("跳过文件 '{}'，原因: {}", filename, reason);
        lock(&self.stats).skipped += 1;
        lock(&self.skipped_downloads).push((filename.to_string(), reason.to_string()));
    }

    pub fn record_failure(&self, filename: &str, status: DownloadStatus) {
        log::error!("文件 '{}' 下载失败，状态: {:?}", filename, status);
        lock(&self.stats).failed += 1;
        let (_, _, msg) = status.get_display_info();
        lock(&self.failed_downloads).push((filename.to_string(), msg.to_string()));
    }

    pub fn get_stats(&self) -> DownloadStats {
        lock(&self.stats).clone()
    }

    pub fn did_all_succeed(&self) -> bool {
        lock(&self.stats).failed == 0
    }

    pub fn print_report(&self) {
        let stats = self.get_stats();
        let skipped = lock(&self.skipped_downloads);
        let failed = lock(&self.failed_downloads);
        info!(
            "下载报告: Total={}, Success={}, Skipped={}, Failed={}",
            stats.total, stats.success, stats.skipped, stats.failed
        );

        if !skipped.is_empty() || !failed.is_empty() {
            ui::print_sub_header("下载详情报告");
            if !skipped.is_empty() {
                println!("\n{} 跳过的文件 ({}个):", *symbols::INFO, stats.skipped);
                print_grouped_report(&skipped, |s| s.cyan());
            }
            if !failed.is_empty() {
                println!("\n{} 失败的文件 ({}个):", *symbols::ERROR, stats.failed);
                print_grouped_report(&failed, |s| s.red());
            }
        }
        ui::print_sub_header("任务总结");
        if stats.total > 0 && stats.success == stats.total - stats.skipped {
            println!(
                "{} 所有 {} 个任务均已完成 ({} 个已跳过)。",
                *symbols::OK,
                stats.total,
                stats.skipped
            );
        } else {
            let summary = format!(
                "{} | {} | {}",
                format!("成功: {}", stats.success).green(),
                format!("失败: {}", stats.failed).red(),
                format!("跳过: {}", stats.skipped).yellow()
            );
            println!("{}", summary);
        }
    }
}

fn print_grouped_report(items: &[(String, String)], color_fn: fn(ColoredString) -> ColoredString) {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (filename, reason) in items {
        grouped.entry(reason.as_str()).or_default().push(filename.as_str());
    }
    for (reason, mut filenames) in grouped {
        println!("  - {}", color_fn(format!("原因: {}", reason).into()));
        filenames.sort();
        for filename in filenames {
            println!("    - {}", filename);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_counts_skips_separately_from_failures() {
        let manager = DownloadManager::new();
        manager.start_batch(4);
        manager.record_success();
        manager.record_skip("000_a.m4v", "文件已存在，跳过");
        manager.record_skip("001_b.m4v", "页面上没有下载链接");
        assert!(manager.did_all_succeed());

        manager.record_failure("002_c.m4v", DownloadStatus::HttpError);
        assert!(!manager.did_all_succeed());
        assert_eq!(
            manager.get_stats(),
            DownloadStats { total: 4, success: 1, skipped: 2, failed: 1 }
        );

        manager.start_batch(1);
        assert!(manager.did_all_succeed());
        assert_eq!(manager.get_stats().skipped, 0);
    }
}
