// src/downloader/task_runner.rs

use super::{DownloadManager, task_processor::TaskProcessor};
use crate::{client::Transport, constants, error::*, models::*, ui, utils};
use indicatif::ProgressBar;
use log::warn;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// 依次执行一批下载任务，并把结果记录到 `manager`。
pub async fn execute_tasks<T: Transport>(
    processor: &TaskProcessor<T>,
    tasks: &[DownloadTask],
    manager: &DownloadManager,
    cancellation_token: &Arc<AtomicBool>,
) -> AppResult<()> {
    if tasks.is_empty() {
        return Ok(());
    }
    ui::plain("");
    ui::info(&format!("开始下载 {} 个课时...", tasks.len()));
    let pbar = ui::new_tasks_progress_bar(tasks.len() as u64, "下载");

    for task in tasks {
        if cancellation_token.load(Ordering::Relaxed) {
            warn!("下载被用户中断");
            pbar.finish_and_clear();
            return Err(AppError::UserInterrupt);
        }
        pbar.set_message(utils::truncate_text(&task.filename(), constants::FILENAME_TRUNCATE_LENGTH));
        let result = processor.process(task).await;
        record_result(manager, &pbar, result);
        pbar.inc(1);
    }

    pbar.finish_and_clear();
    Ok(())
}

fn record_result(manager: &DownloadManager, pbar: &ProgressBar, result: DownloadResult) {
    match result.status {
        DownloadStatus::Success => manager.record_success(),
        DownloadStatus::Skipped | DownloadStatus::NoLink => {
            let (_, _, default_msg) = result.status.get_display_info();
            manager.record_skip(&result.filename, default_msg)
        }
        _ => manager.record_failure(&result.filename, result.status),
    }

    // 已存在的文件只计入报告，不逐条打印
    if result.status == DownloadStatus::Skipped {
        return;
    }
    let (symbol, color_fn, default_msg) = result.status.get_display_info();
    let line = match (result.status.is_failure(), result.message) {
        (true, Some(detail)) => format!(
            "{} {} {}",
            symbol,
            result.filename,
            color_fn(format!("失败: {} (详情: {})", default_msg, detail).into())
        ),
        (false, Some(_)) => format!("{} {} {}", symbol, result.filename, color_fn(default_msg.to_string().into())),
        (_, None) => format!("{} {}", symbol, result.filename),
    };
    pbar.println(line);
}
