// src/extractor/pagination.rs

use super::extract_rows;
use crate::{
    browser::PageDriver,
    config::SiteLayout,
    error::{AppError, AppResult},
    models::{EntityKind, ListingRow},
};
use log::{debug, info, warn};
use std::collections::HashSet;

/// 翻页控件的检查结果
pub enum PageStep<N> {
    /// 存在可点击的 "下一页" 链接
    Advance(N),
    /// 没有更多页面 (正常结束，不是错误)
    EndOfPagination,
}

/// 在分页容器中查找带有目标地址的 "下一页" 链接。
pub async fn next_page<D: PageDriver>(driver: &D, layout: &SiteLayout) -> AppResult<PageStep<D::Node>> {
    if driver.find_one(&layout.pagination_container).await?.is_none() {
        debug!("页面上没有分页容器");
        return Ok(PageStep::EndOfPagination);
    }
    let anchors = driver
        .find_all(&format!("{} a", layout.pagination_container))
        .await?;
    for anchor in anchors {
        if !driver.text(&anchor).await?.contains(&layout.next_page_text) {
            continue;
        }
        return Ok(match driver.attribute(&anchor, "href").await? {
            Some(_) => PageStep::Advance(anchor),
            None => {
                debug!("'下一页' 链接没有目标地址，已是最后一页");
                PageStep::EndOfPagination
            }
        });
    }
    Ok(PageStep::EndOfPagination)
}

// 片段 (#...) 不区分页面
fn page_key(url: &str) -> String {
    url.split('#').next().unwrap_or(url).to_string()
}

/// 从章节的当前页开始，逐页提取课时直到没有下一页。
///
/// 第一页没有任何课时返回 `EmptyListing`；之后的空页会被容忍。
/// "下一页" 指回已访问过的页面时停止翻页。
/// 结果按 页 → 行 的顺序排列，不做去重。
pub async fn walk_lectures<D: PageDriver>(
    driver: &mut D,
    layout: &SiteLayout,
    chapter_title: &str,
) -> AppResult<Vec<ListingRow>> {
    let mut lectures = Vec::new();
    let mut visited = HashSet::new();
    if let Some(url) = driver.current_url().await? {
        visited.insert(page_key(&url));
    }
    let mut page = 1usize;
    loop {
        let rows = extract_rows(driver, EntityKind::Lecture).await?;
        if rows.is_empty() {
            if page == 1 {
                let url = driver.current_url().await?.unwrap_or_default();
                return Err(AppError::EmptyListing {
                    chapter: chapter_title.to_string(),
                    url,
                });
            }
            debug!("章节 '{}' 第 {} 页没有课时", chapter_title, page);
        }
        debug!("章节 '{}' 第 {} 页: {} 个课时", chapter_title, page, rows.len());
        lectures.extend(rows);

        match next_page(driver, layout).await? {
            PageStep::Advance(next) => {
                driver.click(&next).await?;
                if let Some(url) = driver.current_url().await?
                    && !visited.insert(page_key(&url))
                {
                    warn!("章节 '{}' 的下一页 '{}' 已访问过，停止翻页", chapter_title, url);
                    break;
                }
                page += 1;
            }
            PageStep::EndOfPagination => break,
        }
    }
    info!("章节 '{}' 共 {} 页，{} 个课时", chapter_title, page, lectures.len());
    Ok(lectures)
}
