// src/extractor/mod.rs

pub mod catalog;
pub mod pagination;
pub mod session;

pub use catalog::CatalogCrawler;

use crate::{
    browser::PageDriver,
    error::AppResult,
    models::{EntityKind, ListingRow},
    utils,
};
use log::{debug, warn};

/// 目标地址的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    /// 行内嵌套的 `<a>` 的 href
    NestedAnchor,
    /// 行元素自身的 href
    OwnHref,
}

/// 一种实体在列表页中的提取规则
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRecipe {
    pub kind: EntityKind,
    pub id_prefix: &'static str,
    pub row_selector: &'static str,
    pub title_selector: &'static str,
    pub url_source: UrlSource,
}

static RECIPES: [ExtractionRecipe; 3] = [
    ExtractionRecipe {
        kind: EntityKind::Course,
        id_prefix: "product",
        row_selector: "div[id^='product-']",
        title_selector: ".title",
        url_source: UrlSource::NestedAnchor,
    },
    ExtractionRecipe {
        kind: EntityKind::Chapter,
        id_prefix: "category",
        row_selector: "a[id^='category-']",
        title_selector: ".title",
        url_source: UrlSource::OwnHref,
    },
    ExtractionRecipe {
        kind: EntityKind::Lecture,
        id_prefix: "post",
        row_selector: "a[id^='post-']",
        title_selector: "h4",
        url_source: UrlSource::OwnHref,
    },
];

pub fn recipe(kind: EntityKind) -> &'static ExtractionRecipe {
    match kind {
        EntityKind::Course => &RECIPES[0],
        EntityKind::Chapter => &RECIPES[1],
        EntityKind::Lecture => &RECIPES[2],
    }
}

/// 从当前页面提取某类实体的所有行。
///
/// 没有匹配的行时返回空列表，由调用者决定是否视为错误；
/// 只有驱动本身的故障才会返回 `Err`。
pub async fn extract_rows<D: PageDriver>(driver: &D, kind: EntityKind) -> AppResult<Vec<ListingRow>> {
    let recipe = recipe(kind);
    let base_url = driver.current_url().await?;
    let nodes = driver.find_all(recipe.row_selector).await?;
    debug!("当前页面匹配到 {} 个{}行", nodes.len(), kind.label());

    let mut rows = Vec::with_capacity(nodes.len());
    for node in &nodes {
        let id = driver.attribute(node, "id").await?.unwrap_or_default();

        let title = match driver.find_within(node, recipe.title_selector).await? {
            Some(title_node) => driver.text(&title_node).await?,
            None => String::new(),
        };
        let title = if title.is_empty() {
            warn!("{} '{}' 没有标题元素，使用编号作为标题", kind.label(), id);
            id.clone()
        } else {
            title
        };

        let href = match recipe.url_source {
            UrlSource::OwnHref => driver.attribute(node, "href").await?,
            UrlSource::NestedAnchor => match driver.find_within(node, "a").await? {
                Some(anchor) => driver.attribute(&anchor, "href").await?,
                None => None,
            },
        };
        let Some(href) = href.filter(|h| !h.trim().is_empty()) else {
            warn!("{} '{}' ({}) 没有链接，跳过", kind.label(), title, id);
            continue;
        };
        let url = match utils::resolve_href(base_url.as_deref(), &href) {
            Ok(url) => url,
            Err(e) => {
                warn!("{} '{}' 的链接 '{}' 无法解析: {}，跳过", kind.label(), title, href, e);
                continue;
            }
        };

        rows.push(ListingRow { title, id, url });
    }
    Ok(rows)
}
