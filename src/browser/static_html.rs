// src/browser/static_html.rs

use super::PageDriver;
use crate::{
    error::{AppError, AppResult},
    utils,
};
use async_trait::async_trait;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// 离线驱动: 以 URL → HTML 的映射模拟一个站点。
///
/// 点击带 href 的元素会跳转到链接地址，点击表单内的提交按钮会跳转到表单的
/// action 地址。记录点击次数与访问历史，便于在测试中断言。
#[derive(Debug, Default)]
pub struct StaticSite {
    pages: HashMap<String, String>,
    current: Option<String>,
    history: Vec<String>,
    clicks: usize,
    typed: Vec<(String, String)>,
    closed: bool,
}

#[derive(Debug, Clone)]
pub struct StaticNode {
    outer_html: String,
    attrs: HashMap<String, String>,
    text: String,
    form_action: Option<String>,
}

impl StaticNode {
    fn from_element(element: ElementRef<'_>) -> Self {
        let form_action = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "form")
            .and_then(|form| form.value().attr("action"))
            .map(str::to_string);
        Self {
            outer_html: element.html(),
            attrs: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            text: normalize_text(element),
            form_action,
        }
    }
}

fn normalize_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// 片段 (#...) 只在页面内定位，不对应新的文档
fn page_key(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

fn parse_selector(selector: &str) -> AppResult<Selector> {
    Selector::parse(selector).map_err(|e| AppError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.insert_page(url, html);
        self
    }

    pub fn insert_page(&mut self, url: &str, html: &str) {
        self.pages.insert(url.to_string(), html.to_string());
    }

    pub fn clicks(&self) -> usize {
        self.clicks
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// 通过 `type_text` 输入的内容: (元素 id 或 name, 文本)
    pub fn typed(&self) -> &[(String, String)] {
        &self.typed
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn document(&self) -> AppResult<Html> {
        let url = self
            .current
            .as_ref()
            .ok_or_else(|| AppError::Browser("尚未加载任何页面".to_string()))?;
        let html = self
            .pages
            .get(page_key(url))
            .ok_or_else(|| AppError::Browser(format!("页面不存在: {}", url)))?;
        Ok(Html::parse_document(html))
    }

    fn select_all(&self, selector: &str) -> AppResult<Vec<StaticNode>> {
        let selector = parse_selector(selector)?;
        let document = self.document()?;
        Ok(document.select(&selector).map(StaticNode::from_element).collect())
    }
}

#[async_trait]
impl PageDriver for StaticSite {
    type Node = StaticNode;

    async fn navigate(&mut self, url: &str) -> AppResult<()> {
        if !self.pages.contains_key(page_key(url)) {
            return Err(AppError::Browser(format!("页面不存在: {}", url)));
        }
        debug!("[static] 跳转到 {}", url);
        self.current = Some(url.to_string());
        self.history.push(url.to_string());
        Ok(())
    }

    async fn current_url(&self) -> AppResult<Option<String>> {
        Ok(self.current.clone())
    }

    async fn find_one(&self, selector: &str) -> AppResult<Option<StaticNode>> {
        Ok(self.select_all(selector)?.into_iter().next())
    }

    async fn find_all(&self, selector: &str) -> AppResult<Vec<StaticNode>> {
        self.select_all(selector)
    }

    async fn find_within(&self, node: &StaticNode, selector: &str) -> AppResult<Option<StaticNode>> {
        let selector = parse_selector(selector)?;
        let fragment = Html::parse_fragment(&node.outer_html);
        let found = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .next()
            .and_then(|me| me.select(&selector).next())
            .map(StaticNode::from_element);
        Ok(found)
    }

    async fn text(&self, node: &StaticNode) -> AppResult<String> {
        Ok(node.text.clone())
    }

    async fn attribute(&self, node: &StaticNode, name: &str) -> AppResult<Option<String>> {
        Ok(node.attrs.get(name).cloned())
    }

    async fn click(&mut self, node: &StaticNode) -> AppResult<()> {
        self.clicks += 1;
        let target = node.attrs.get("href").or(node.form_action.as_ref()).cloned();
        if let Some(target) = target {
            let url = utils::resolve_href(self.current.as_deref(), &target)?;
            self.navigate(&url).await?;
        }
        Ok(())
    }

    async fn type_text(&mut self, node: &StaticNode, text: &str) -> AppResult<()> {
        let key = node
            .attrs
            .get("id")
            .or_else(|| node.attrs.get("name"))
            .cloned()
            .unwrap_or_default();
        self.typed.push((key, text.to_string()));
        Ok(())
    }

    async fn quit(&mut self) -> AppResult<()> {
        self.closed = true;
        Ok(())
    }
}
