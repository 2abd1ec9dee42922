// src/config.rs

pub mod credentials;

use crate::{
    cli::{ChapterFailurePolicy, Cli},
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

/// 站点页面结构: 路径、选择器以及用于确认页面状态的标记元素。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteLayout {
    pub login_path: String,
    pub library_path: String,
    pub email_input: String,
    pub password_input: String,
    pub submit_button: String,
    pub library_marker: String,
    pub course_marker: String,
    pub pagination_container: String,
    pub next_page_text: String,
    pub download_link: String,
}

impl Default for SiteLayout {
    fn default() -> Self {
        use constants::site;
        Self {
            login_path: site::LOGIN_PATH.into(),
            library_path: site::LIBRARY_PATH.into(),
            email_input: site::EMAIL_INPUT.into(),
            password_input: site::PASSWORD_INPUT.into(),
            submit_button: site::SUBMIT_BUTTON.into(),
            library_marker: site::LIBRARY_MARKER.into(),
            course_marker: site::COURSE_MARKER.into(),
            pagination_container: site::PAGINATION_CONTAINER.into(),
            next_page_text: site::NEXT_PAGE_TEXT.into(),
            download_link: site::DOWNLOAD_LINK.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub wait_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExternalConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub site: SiteLayout,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            network: NetworkConfig {
                connect_timeout_secs: Some(10),
                // 视频文件较大，整体超时留得宽松一些
                timeout_secs: Some(3600),
                wait_timeout_secs: Some(constants::DEFAULT_WAIT_TIMEOUT_SECS),
            },
            site: SiteLayout::default(),
        }
    }
}

/// 启动时构建一次的运行配置，显式传入抓取器与下载器。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub wait_timeout: Duration,
    pub site: SiteLayout,
    pub output_dir: PathBuf,
    pub extension: String,
    pub overwrite: bool,
    pub chapter_failure: ChapterFailurePolicy,
    pub headless: bool,
}

impl AppConfig {
    pub fn new(args: &Cli) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;
        Ok(Self::from_parts(args, external_config))
    }

    pub fn from_parts(args: &Cli, external_config: ExternalConfig) -> Self {
        let network = external_config.network;
        let wait_secs = args
            .wait_timeout
            .or(network.wait_timeout_secs)
            .unwrap_or(constants::DEFAULT_WAIT_TIMEOUT_SECS);
        Self {
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(network.connect_timeout_secs.unwrap_or(10)),
            timeout: Duration::from_secs(network.timeout_secs.unwrap_or(3600)),
            wait_timeout: Duration::from_secs(wait_secs),
            site: external_config.site,
            output_dir: args.output.clone(),
            extension: args.ext.trim_start_matches('.').to_string(),
            overwrite: args.force_redownload,
            chapter_failure: args.chapter_failure,
            headless: args.headless,
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            wait_timeout: Duration::from_millis(200),
            site: SiteLayout::default(),
            output_dir: PathBuf::from(constants::DEFAULT_SAVE_DIR),
            extension: constants::DEFAULT_EXTENSION.to_string(),
            overwrite: false,
            chapter_failure: ChapterFailurePolicy::Abort,
            headless: true,
        }
    }
}

pub(crate) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    load_or_create_external_config_at(&get_config_path()?)
}

pub(crate) fn load_or_create_external_config_at(config_path: &Path) -> AppResult<ExternalConfig> {
    if config_path.is_file() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(config_path, json_content)?;

        Ok(config)
    }
}
