// src/downloader/job.rs

use super::{DownloadManager, task_processor::TaskProcessor, task_runner};
use crate::{client::Transport, config::AppConfig, error::*, models::*, symbols, utils};
use colored::*;
use log::{debug, error, info};
use std::{
    fs,
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

/// 展开后的下载计划: 可执行的任务与无法生成保存路径的课时
#[derive(Debug, Default)]
pub struct DownloadPlan {
    pub tasks: Vec<DownloadTask>,
    pub rejected: Vec<DownloadResult>,
}

impl DownloadPlan {
    pub fn len(&self) -> usize {
        self.tasks.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 按 课程 → 章节 → 课时 的顺序展开目录树，为每个课时计算保存路径。
///
/// 序号是课时在所属章节中的位置 (从 0 开始)。某个课时的路径不合法时
/// 只有它被拒绝，其余课时照常计划。
pub fn plan_downloads(catalog: &Catalog, root: &Path, ext: &str) -> DownloadPlan {
    let mut plan = DownloadPlan::default();
    for course in &catalog.courses {
        for chapter in &course.chapters {
            for (ordinal, lecture) in chapter.lectures.iter().enumerate() {
                let filepath = match utils::format_lecture_path(
                    root,
                    &course.title,
                    &chapter.title,
                    &lecture.title,
                    ordinal,
                    ext,
                ) {
                    Ok(path) => path,
                    Err(e) => {
                        error!(
                            "无法为课时 '{}' / '{}' / '{}' 生成保存路径: {}",
                            course.title, chapter.title, lecture.title, e
                        );
                        plan.rejected.push(DownloadResult {
                            filename: format!("{} / {} / {}", course.title, chapter.title, lecture.title),
                            status: DownloadStatus::from(&e),
                            message: Some(e.to_string()),
                        });
                        continue;
                    }
                };
                plan.tasks.push(DownloadTask {
                    course: course.title.clone(),
                    chapter: chapter.title.clone(),
                    lecture: lecture.title.clone(),
                    download_url: lecture.download_url.clone(),
                    filepath,
                });
            }
        }
    }
    debug!("共生成 {} 个下载任务，{} 个课时被拒绝", plan.tasks.len(), plan.rejected.len());
    plan
}

pub struct CatalogDownloader<T: Transport> {
    processor: TaskProcessor<T>,
    config: Arc<AppConfig>,
    manager: DownloadManager,
    cancellation_token: Arc<AtomicBool>,
}

impl<T: Transport> CatalogDownloader<T> {
    pub fn new(
        transport: T,
        config: Arc<AppConfig>,
        manager: DownloadManager,
        cancellation_token: Arc<AtomicBool>,
    ) -> Self {
        let processor = TaskProcessor::new(transport, config.overwrite);
        Self { processor, config, manager, cancellation_token }
    }

    /// 下载目录中的全部课时，返回是否没有任何失败。
    pub async fn run(&self, catalog: &Catalog) -> AppResult<bool> {
        let base_output_dir = &self.config.output_dir;
        fs::create_dir_all(base_output_dir)?;
        let absolute_path = dunce::canonicalize(base_output_dir)?;
        info!("文件将保存到目录: \"{}\"", absolute_path.display());
        println!(
            "\n{} 文件将保存到目录: \"{}\"",
            *symbols::INFO,
            absolute_path.display()
        );

        let plan = plan_downloads(catalog, base_output_dir, &self.config.extension);
        if plan.is_empty() {
            println!("\n{} 目录中没有任何课时。", *symbols::INFO);
            return Ok(true);
        }

        self.manager.start_batch(plan.len());
        for rejected in &plan.rejected {
            println!(
                "{} {} {}",
                *symbols::ERROR,
                rejected.filename,
                rejected.message.as_deref().unwrap_or_default().red()
            );
            self.manager.record_failure(&rejected.filename, rejected.status);
        }
        task_runner::execute_tasks(&self.processor, &plan.tasks, &self.manager, &self.cancellation_token)
            .await?;
        self.manager.print_report();
        Ok(self.manager.did_all_succeed())
    }
}
