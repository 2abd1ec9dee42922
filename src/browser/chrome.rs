// src/browser/chrome.rs

use super::PageDriver;
use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use tokio::task::JoinHandle;

/// 基于 chromiumoxide (Chrome DevTools Protocol) 的浏览器驱动。
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    pub async fn launch(config: &AppConfig) -> AppResult<Self> {
        let builder = BrowserConfig::builder().request_timeout(config.timeout);
        let builder = if config.headless { builder } else { builder.with_head() };
        let browser_config = builder.build().map_err(AppError::Browser)?;

        info!("启动浏览器 (headless = {})", config.headless);
        let (browser, mut handler) = Browser::launch(browser_config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("浏览器事件循环错误: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self { browser, page, handler })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    type Node = Element;

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        debug!("跳转到 {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> AppResult<Option<String>> {
        Ok(self.page.url().await?)
    }

    async fn find_one(&self, selector: &str) -> AppResult<Option<Element>> {
        Ok(self.page.find_elements(selector).await?.into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> AppResult<Vec<Element>> {
        Ok(self.page.find_elements(selector).await?)
    }

    async fn find_within(&self, node: &Element, selector: &str) -> AppResult<Option<Element>> {
        Ok(node.find_elements(selector).await?.into_iter().next())
    }

    async fn text(&self, node: &Element) -> AppResult<String> {
        Ok(node.inner_text().await?.unwrap_or_default().trim().to_string())
    }

    async fn attribute(&self, node: &Element, name: &str) -> AppResult<Option<String>> {
        Ok(node.attribute(name).await?)
    }

    async fn click(&mut self, node: &Element) -> AppResult<()> {
        node.click().await?;
        self.page.wait_for_navigation().await?;
        Ok(())
    }

    async fn type_text(&mut self, node: &Element, text: &str) -> AppResult<()> {
        node.click().await?.type_str(text).await?;
        Ok(())
    }

    async fn quit(&mut self) -> AppResult<()> {
        info!("关闭浏览器");
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
