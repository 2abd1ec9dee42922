// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("页面 '{url}' 中未找到标记元素 '{marker}'，无法继续解析")]
    PageMarkerNotFound { marker: String, url: String },
    #[error("章节 '{chapter}' 的第一页没有任何视频 ({url})")]
    EmptyListing { chapter: String, url: String },
    #[error("该课时没有可用的下载链接: {0}")]
    NoDownloadLink(String),
    #[error("文件已存在: {}", .0.display())]
    FileAlreadyExists(PathBuf),
    #[error("下载 '{url}' 失败，服务器返回状态码 {status}")]
    TransferFailed { url: String, status: u16 },
    #[error("登录失败: {0}")]
    SignInFailed(String),
    #[error("浏览器驱动错误: {0}")]
    Browser(String),
    #[error("无效的选择器 '{selector}': {reason}")]
    Selector { selector: String, reason: String },
    #[error("网络请求失败: {0}")]
    Network(#[from] reqwest::Error),
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL 解析错误: {0}")]
    Url(#[from] url::ParseError),
    #[error("账户信息错误: {0}")]
    Credentials(String),
    #[error("安全错误: {0}")]
    Security(String),
    #[error("用户中断")]
    UserInterrupt,
    #[error("未知错误: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
