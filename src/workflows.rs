// src/workflows.rs

use crate::{
    browser::PageDriver,
    client::Transport,
    config::{AppConfig, credentials::Credentials},
    constants,
    downloader::{CatalogDownloader, DownloadManager},
    error::AppResult,
    extractor::CatalogCrawler,
    models::Catalog,
    symbols, ui, utils,
};
use anyhow::Context;
use colored::*;
use log::{error, info};
use std::{
    fs,
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};

/// 登录并抓取完整目录；无论成功与否都会关闭浏览器。
pub async fn crawl_catalog<D: PageDriver>(
    driver: D,
    config: Arc<AppConfig>,
    credentials: &Credentials,
) -> AppResult<Catalog> {
    let library_url = credentials.library_url(&config.site.library_path);
    let mut crawler = CatalogCrawler::new(driver, config);
    let result = async {
        ui::info(&format!("正在登录 {} ...", credentials.site_url));
        crawler.sign_in(credentials).await?;
        ui::info("登录成功，开始抓取课程目录。");
        crawler.crawl(&library_url).await
    }
    .await;

    let mut driver = crawler.into_driver();
    if let Err(e) = driver.quit().await {
        error!("关闭浏览器失败: {}", e);
    }
    result
}

/// 下载目录中的全部课时，返回是否没有任何失败。
pub async fn download_catalog<T: Transport>(
    transport: T,
    config: Arc<AppConfig>,
    catalog: &Catalog,
    manager: DownloadManager,
    cancellation_token: Arc<AtomicBool>,
) -> AppResult<bool> {
    ui::print_header("下载课时视频");
    CatalogDownloader::new(transport, config, manager, cancellation_token)
        .run(catalog)
        .await
}

/// 以树状结构打印目录 (--list)
pub fn print_catalog(catalog: &Catalog) {
    ui::print_header(&format!(
        "课程目录: {} 门课程 / {} 个章节 / {} 个课时",
        catalog.courses.len(),
        catalog.chapter_count(),
        catalog.lecture_count()
    ));
    for course in &catalog.courses {
        ui::plain(&format!("\n{}", course.title.bold()));
        for chapter in &course.chapters {
            ui::plain(&format!("  {} ({} 个课时)", chapter.title.cyan(), chapter.lectures.len()));
            for (ordinal, lecture) in chapter.lectures.iter().enumerate() {
                let title = utils::truncate_text(&lecture.title, constants::FILENAME_TRUNCATE_LENGTH);
                let marker = if lecture.download_url.is_some() {
                    symbols::OK.clone()
                } else {
                    symbols::WARN.clone()
                };
                ui::plain(&format!(
                    "    {} {:0width$} {}",
                    marker,
                    ordinal,
                    title,
                    width = constants::ORDINAL_WIDTH
                ));
            }
        }
    }

    let missing = catalog.missing_links();
    if !missing.is_empty() {
        ui::plain("");
        ui::warn(&format!("{} 个课时的页面上没有下载链接。", missing.len()));
    }
    if !catalog.failed_chapters.is_empty() {
        ui::plain("");
        ui::warn(&format!("{} 个章节因没有任何课时被跳过:", catalog.failed_chapters.len()));
        for failure in &catalog.failed_chapters {
            ui::plain(&format!("    - {} / {}", failure.course, failure.chapter));
        }
    }
}

/// 将目录写入 JSON 文件 (--catalog-json)
pub fn write_catalog_json(catalog: &Catalog, path: &Path) -> AppResult<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(catalog)?;
    fs::write(path, json).with_context(|| format!("写入目录文件 '{}' 失败", path.display()))?;
    info!("目录已写入: {}", path.display());
    ui::info(&format!("目录已写入: {}", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, Course, Lecture, ListingRow};

    fn row(title: &str, id: &str) -> ListingRow {
        ListingRow {
            title: title.to_string(),
            id: id.to_string(),
            url: format!("https://school.test/{}", id),
        }
    }

    #[test]
    fn test_write_catalog_json_keeps_missing_links_as_null() {
        let mut chapter = Chapter::from(row("Guard", "category-1"));
        chapter.lectures = vec![
            Lecture::resolved(row("Intro", "post-1"), Some("https://cdn.test/1.m4v".to_string())),
            Lecture::resolved(row("Drills", "post-2"), None),
        ];
        let mut course = Course::from(row("Fundamentals", "product-1"));
        course.chapters = vec![chapter];
        let catalog = Catalog { courses: vec![course], failed_chapters: vec![] };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("catalog.json");
        write_catalog_json(&catalog, &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let lectures = &value["courses"][0]["chapters"][0]["lectures"];
        assert_eq!(lectures[0]["download_url"], "https://cdn.test/1.m4v");
        assert!(lectures[1]["download_url"].is_null());
        assert_eq!(value["failed_chapters"].as_array().unwrap().len(), 0);
    }
}
