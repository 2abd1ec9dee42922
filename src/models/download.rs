// src/models/download.rs

use crate::error::AppError;
use crate::symbols;
use colored::{ColoredString, Colorize};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DownloadStatus {
    Success,
    Skipped,
    NoLink,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    IoError,
    UnexpectedError,
}

impl DownloadStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            DownloadStatus::Success => (&symbols::OK, |s| s.green(), "下载成功"),
            DownloadStatus::Skipped => (&symbols::SKIP, |s| s.cyan(), "文件已存在，跳过"),
            DownloadStatus::NoLink => (&symbols::WARN, |s| s.yellow(), "页面上没有下载链接"),
            DownloadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            DownloadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            DownloadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            DownloadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            DownloadStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            DownloadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }

    /// 跳过类状态 (文件已存在 / 无下载链接) 不算失败
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            DownloadStatus::Success | DownloadStatus::Skipped | DownloadStatus::NoLink
        )
    }
}

impl From<&AppError> for DownloadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::FileAlreadyExists(_) => DownloadStatus::Skipped,
            AppError::NoDownloadLink(_) => DownloadStatus::NoLink,
            AppError::TransferFailed { .. } => DownloadStatus::HttpError,
            AppError::Network(err) => {
                if err.is_timeout() {
                    DownloadStatus::TimeoutError
                } else if err.is_connect() {
                    DownloadStatus::ConnectionError
                } else if err.is_status() {
                    DownloadStatus::HttpError
                } else {
                    DownloadStatus::NetworkError
                }
            }
            AppError::Io(_) | AppError::Security(_) => DownloadStatus::IoError,
            _ => DownloadStatus::UnexpectedError,
        }
    }
}

/// 目录树展开后的单个下载任务
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub course: String,
    pub chapter: String,
    pub lecture: String,
    pub download_url: Option<String>,
    pub filepath: PathBuf,
}

impl DownloadTask {
    pub fn filename(&self) -> String {
        self.filepath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.lecture.clone())
    }
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filename: String,
    pub status: DownloadStatus,
    pub message: Option<String>,
}
