// src/extractor/catalog.rs

use super::{extract_rows, pagination::walk_lectures, session};
use crate::{
    browser::PageDriver,
    cli::ChapterFailurePolicy,
    config::{AppConfig, credentials::Credentials},
    error::{AppError, AppResult},
    models::{Catalog, Chapter, ChapterFailure, Course, EntityKind, Lecture, ListingRow},
    ui, utils,
};
use indicatif::ProgressBar;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// 按 课程 → 章节 → 课时 三个阶段遍历站点，构建完整目录树。
///
/// 每个阶段都在前一阶段对整棵树完成后才开始；页面句柄只由抓取器持有和跳转。
pub struct CatalogCrawler<D: PageDriver> {
    driver: D,
    config: Arc<AppConfig>,
}

impl<D: PageDriver> CatalogCrawler<D> {
    pub fn new(driver: D, config: Arc<AppConfig>) -> Self {
        Self { driver, config }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub async fn sign_in(&mut self, credentials: &Credentials) -> AppResult<()> {
        session::sign_in(
            &mut self.driver,
            credentials,
            &self.config.site,
            self.config.wait_timeout,
        )
        .await
    }

    pub async fn crawl(&mut self, library_url: &str) -> AppResult<Catalog> {
        let pbar = ui::new_spinner("目录");
        let result = self.crawl_with_progress(library_url, &pbar).await;
        pbar.finish_and_clear();
        result
    }

    async fn crawl_with_progress(&mut self, library_url: &str, pbar: &ProgressBar) -> AppResult<Catalog> {
        // 阶段 1: 课程
        pbar.set_message("正在获取所有课程...");
        let mut courses = self.fetch_courses(library_url).await?;
        pbar.println(format!("{} 找到 {} 门课程", *crate::symbols::INFO, courses.len()));

        // 阶段 2: 章节
        let total_courses = courses.len();
        for (i, course) in courses.iter_mut().enumerate() {
            pbar.set_message(format!("[{}/{}] 获取章节: {}", i + 1, total_courses, course.title));
            let chapters = self.fetch_chapters(course).await?;
            course.chapters = chapters;
        }
        let total_chapters: usize = courses.iter().map(|c| c.chapters.len()).sum();
        pbar.println(format!("{} 找到 {} 个章节", *crate::symbols::INFO, total_chapters));

        // 阶段 3: 课时与下载链接
        let mut failed_chapters = Vec::new();
        let mut done = 0usize;
        for course in courses.iter_mut() {
            for chapter in course.chapters.iter_mut() {
                done += 1;
                pbar.set_message(format!(
                    "[{}/{}] 获取课时: {} / {}",
                    done, total_chapters, course.title, chapter.title
                ));
                match self.fetch_lectures(chapter, pbar).await {
                    Ok(lectures) => chapter.lectures = lectures,
                    Err(e @ AppError::EmptyListing { .. })
                        if self.config.chapter_failure == ChapterFailurePolicy::Skip =>
                    {
                        warn!("跳过章节 '{}' / '{}': {}", course.title, chapter.title, e);
                        pbar.println(format!(
                            "{} 跳过章节 '{}': {}",
                            *crate::symbols::WARN,
                            chapter.title,
                            e
                        ));
                        failed_chapters.push(ChapterFailure {
                            course: course.title.clone(),
                            chapter: chapter.title.clone(),
                            reason: e.to_string(),
                        });
                    }
                    Err(e) => {
                        error!("获取章节 '{}' 的课时失败: {}", chapter.title, e);
                        return Err(e);
                    }
                }
            }
        }

        let catalog = Catalog { courses, failed_chapters };
        info!(
            "目录抓取完成: {} 门课程, {} 个章节, {} 个课时 ({} 个无下载链接)",
            catalog.courses.len(),
            catalog.chapter_count(),
            catalog.lecture_count(),
            catalog.missing_links().len()
        );
        Ok(catalog)
    }

    /// 在限定时间内等待标记元素，缺失时无法信任后续解析。
    async fn expect_marker(&self, marker: &str, url: &str) -> AppResult<()> {
        if self.driver.wait_for(marker, self.config.wait_timeout).await?.is_none() {
            error!("页面 '{}' 中未找到标记 '{}'", url, marker);
            return Err(AppError::PageMarkerNotFound {
                marker: marker.to_string(),
                url: url.to_string(),
            });
        }
        debug!("页面 '{}' 标记 '{}' 已确认", url, marker);
        Ok(())
    }

    async fn fetch_courses(&mut self, library_url: &str) -> AppResult<Vec<Course>> {
        self.driver.navigate(library_url).await?;
        self.expect_marker(&self.config.site.library_marker, library_url).await?;
        let rows = extract_rows(&self.driver, EntityKind::Course).await?;
        info!("课程库中共有 {} 门课程", rows.len());
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn fetch_chapters(&mut self, course: &Course) -> AppResult<Vec<Chapter>> {
        self.driver.navigate(&course.url).await?;
        self.expect_marker(&self.config.site.course_marker, &course.url).await?;
        let rows = extract_rows(&self.driver, EntityKind::Chapter).await?;
        info!("课程 '{}' 共有 {} 个章节", course.title, rows.len());
        Ok(rows.into_iter().map(Chapter::from).collect())
    }

    async fn fetch_lectures(&mut self, chapter: &Chapter, pbar: &ProgressBar) -> AppResult<Vec<Lecture>> {
        self.driver.navigate(&chapter.url).await?;
        let rows = walk_lectures(&mut self.driver, &self.config.site, &chapter.title).await?;
        if rows.is_empty() {
            return Err(AppError::EmptyListing {
                chapter: chapter.title.clone(),
                url: chapter.url.clone(),
            });
        }

        let mut lectures = Vec::with_capacity(rows.len());
        for row in rows {
            let download_url = self.resolve_download_link(&row).await?;
            if download_url.is_none() {
                pbar.println(format!(
                    "{} '{}' 没有下载链接",
                    *crate::symbols::WARN,
                    row.title
                ));
            }
            lectures.push(Lecture::resolved(row, download_url));
        }
        Ok(lectures)
    }

    /// 访问课时页面并读取下载按钮的地址；没有按钮时返回 `None`。
    async fn resolve_download_link(&mut self, row: &ListingRow) -> AppResult<Option<String>> {
        self.driver.navigate(&row.url).await?;
        let Some(link) = self.driver.find_one(&self.config.site.download_link).await? else {
            warn!("课时 '{}' ({}) 页面上没有下载链接", row.title, row.id);
            return Ok(None);
        };
        let Some(href) = self.driver.attribute(&link, "href").await?.filter(|h| !h.trim().is_empty()) else {
            warn!("课时 '{}' ({}) 的下载按钮没有地址", row.title, row.id);
            return Ok(None);
        };
        let base = self.driver.current_url().await?;
        match utils::resolve_href(base.as_deref(), &href) {
            Ok(url) => {
                debug!("课时 '{}' 下载地址: {}", row.title, url);
                Ok(Some(url))
            }
            Err(e) => {
                warn!("课时 '{}' ({}) 的下载地址 '{}' 无法解析: {}", row.title, row.id, href, e);
                Ok(None)
            }
        }
    }
}
