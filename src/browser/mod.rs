// src/browser/mod.rs

pub mod chrome;
#[cfg(feature = "testing")]
pub mod static_html;

pub use chrome::ChromeDriver;

use crate::error::AppResult;
use async_trait::async_trait;
use log::trace;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 当前加载页面的抽象。抓取器是唯一的持有者，页面跳转与元素查询都经由它完成。
///
/// 选择器统一使用 CSS 语法。节点句柄只在产生它的页面上有效，
/// 跳转之后需要重新查询。
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Node: Send + Sync;

    async fn navigate(&mut self, url: &str) -> AppResult<()>;

    async fn current_url(&self) -> AppResult<Option<String>>;

    async fn find_one(&self, selector: &str) -> AppResult<Option<Self::Node>>;

    async fn find_all(&self, selector: &str) -> AppResult<Vec<Self::Node>>;

    /// 在节点的后代中查找 (不包含节点本身)
    async fn find_within(&self, node: &Self::Node, selector: &str) -> AppResult<Option<Self::Node>>;

    async fn text(&self, node: &Self::Node) -> AppResult<String>;

    async fn attribute(&self, node: &Self::Node, name: &str) -> AppResult<Option<String>>;

    /// 点击节点，可能引起页面跳转
    async fn click(&mut self, node: &Self::Node) -> AppResult<()>;

    async fn type_text(&mut self, node: &Self::Node, text: &str) -> AppResult<()>;

    /// 结束会话 (关闭浏览器)
    async fn quit(&mut self) -> AppResult<()>;

    /// 在限定时间内轮询，直到选择器匹配到元素
    async fn wait_for(&self, selector: &str, timeout: Duration) -> AppResult<Option<Self::Node>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(node) = self.find_one(selector).await? {
                return Ok(Some(node));
            }
            if Instant::now() >= deadline {
                trace!("等待 '{}' 超时 ({:?})", selector, timeout);
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL.min(timeout)).await;
        }
    }
}
