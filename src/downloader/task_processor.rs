// src/downloader/task_processor.rs

use crate::{client::Transport, error::*, models::*};
use futures::StreamExt;
use log::{debug, error, info};
use std::{
    fs::{self, File},
    io::Write as IoWrite,
    path::{Path, PathBuf},
};

/// `TaskProcessor` 封装了处理单个课时下载的所有逻辑。
pub struct TaskProcessor<T: Transport> {
    transport: T,
    overwrite: bool,
}

impl<T: Transport> TaskProcessor<T> {
    pub fn new(transport: T, overwrite: bool) -> Self {
        Self { transport, overwrite }
    }

    /// 处理单个任务；任何错误都转换为状态，兄弟课时可以继续。
    pub async fn process(&self, task: &DownloadTask) -> DownloadResult {
        let filename = task.filename();
        let dir = task.filepath.parent().unwrap_or_else(|| Path::new("."));

        match fetch(
            &self.transport,
            task.download_url.as_deref(),
            dir,
            &filename,
            self.overwrite,
        )
        .await
        {
            Ok(_) => DownloadResult { filename, status: DownloadStatus::Success, message: None },
            Err(e) => {
                let status = DownloadStatus::from(&e);
                if status.is_failure() {
                    error!(
                        "课时 '{}' / '{}' / '{}' 下载失败: {}",
                        task.course, task.chapter, task.lecture, e
                    );
                }
                DownloadResult { filename, status, message: Some(e.to_string()) }
            }
        }
    }
}

/// 将一个下载地址的内容保存为 `dir/filename`。
///
/// 检查顺序: 没有地址 → 文件已存在 (未要求覆盖) → 创建目录 → 请求 → 写入。
/// 前两种情况不会发出任何网络请求。失败时可能留下不完整的文件。
pub async fn fetch<T: Transport + ?Sized>(
    transport: &T,
    download_url: Option<&str>,
    dir: &Path,
    filename: &str,
    overwrite: bool,
) -> AppResult<PathBuf> {
    let filepath = dir.join(filename);
    let Some(url) = download_url else {
        info!("'{}' 没有下载链接，跳过", filename);
        return Err(AppError::NoDownloadLink(filename.to_string()));
    };
    if !overwrite && filepath.exists() {
        info!("文件已存在，跳过: {:?}", filepath);
        return Err(AppError::FileAlreadyExists(filepath));
    }

    fs::create_dir_all(dir)?;

    let res = transport.get(url).await?;
    if !res.is_success() {
        return Err(AppError::TransferFailed { url: url.to_string(), status: res.status });
    }

    let mut file = File::create(&filepath)?;
    let mut body = res.body;
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        written += chunk.len() as u64;
    }
    file.flush()?;
    debug!("已写入 {} 字节到 {:?}", written, filepath);
    Ok(filepath)
}
