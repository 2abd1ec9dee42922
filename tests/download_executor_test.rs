// tests/download_executor_test.rs

use async_trait::async_trait;
use futures::{StreamExt, stream};
use kajabi_dl::{
    client::{HttpTransport, TransferResponse, Transport},
    config::AppConfig,
    downloader::{
        CatalogDownloader, DownloadManager, DownloadStats, TaskProcessor, execute_tasks, fetch, plan_downloads,
    },
    error::{AppError, AppResult},
    models::{Catalog, Chapter, Course, DownloadStatus, DownloadTask, Lecture, ListingRow},
};
use std::{
    fs,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tempfile::tempdir;

/// 记录调用次数的假网络层，按 3 字节一块返回响应体
struct CountingTransport {
    calls: AtomicUsize,
    status: u16,
    body: Vec<u8>,
}

impl CountingTransport {
    fn new(status: u16, body: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            status,
            body: body.to_vec(),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for CountingTransport {
    async fn get(&self, _url: &str) -> AppResult<TransferResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let chunks: Vec<AppResult<Vec<u8>>> = self.body.chunks(3).map(|c| Ok(c.to_vec())).collect();
        Ok(TransferResponse {
            status: self.status,
            body: stream::iter(chunks).boxed(),
        })
    }
}

const URL: &str = "https://cdn.school.test/videos/1.m4v";

#[tokio::test]
async fn test_existing_file_is_skipped_without_network() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("000_Intro.m4v"), b"old").unwrap();
    let transport = CountingTransport::new(200, b"new content");

    let err = fetch(transport.as_ref(), Some(URL), dir.path(), "000_Intro.m4v", false)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::FileAlreadyExists(ref p) if p.ends_with("000_Intro.m4v")));
    assert_eq!(transport.calls(), 0);
    assert_eq!(fs::read(dir.path().join("000_Intro.m4v")).unwrap(), b"old");
}

#[tokio::test]
async fn test_missing_url_is_reported_without_network() {
    let dir = tempdir().unwrap();
    let transport = CountingTransport::new(200, b"data");

    let err = fetch(transport.as_ref(), None, &dir.path().join("course"), "001_x.m4v", true)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NoDownloadLink(_)));
    assert_eq!(transport.calls(), 0);
    // 没有链接时不会创建目录
    assert!(!dir.path().join("course").exists());
}

#[tokio::test]
async fn test_non_success_status_is_a_transfer_failure() {
    let dir = tempdir().unwrap();
    let transport = CountingTransport::new(404, b"not found");

    let err = fetch(transport.as_ref(), Some(URL), dir.path(), "002_y.m4v", false)
        .await
        .unwrap_err();

    match err {
        AppError::TransferFailed { url, status } => {
            assert_eq!(url, URL);
            assert_eq!(status, 404);
        }
        other => panic!("expected TransferFailed, got {:?}", other),
    }
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_success_creates_directories_and_writes_bytes() -> AppResult<()> {
    let dir = tempdir().unwrap();
    let target_dir = dir.path().join("Course").join("Chapter");
    let transport = CountingTransport::new(200, b"0123456789");

    let path = fetch(transport.as_ref(), Some(URL), &target_dir, "000_Intro.m4v", false).await?;

    assert_eq!(path, target_dir.join("000_Intro.m4v"));
    assert_eq!(fs::read(&path)?, b"0123456789");
    assert_eq!(transport.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_overwrite_replaces_existing_file() -> AppResult<()> {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("000_a.m4v"), b"a much longer old file")?;
    let transport = CountingTransport::new(200, b"short");

    fetch(transport.as_ref(), Some(URL), dir.path(), "000_a.m4v", true).await?;

    assert_eq!(fs::read(dir.path().join("000_a.m4v"))?, b"short");
    Ok(())
}

#[tokio::test]
async fn test_http_transport_against_mock_server() -> AppResult<()> {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("GET", "/videos/1.m4v")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body("video-bytes")
        .create_async()
        .await;
    let missing = server
        .mock("GET", "/videos/2.m4v")
        .with_status(403)
        .create_async()
        .await;

    let transport = HttpTransport::new(&AppConfig::default())?;
    let dir = tempdir().unwrap();

    let path = fetch(
        &transport,
        Some(&format!("{}/videos/1.m4v", server.url())),
        dir.path(),
        "000_v.m4v",
        false,
    )
    .await?;
    assert_eq!(fs::read_to_string(path)?, "video-bytes");

    let err = fetch(
        &transport,
        Some(&format!("{}/videos/2.m4v", server.url())),
        dir.path(),
        "001_v.m4v",
        false,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::TransferFailed { status: 403, .. }));
    assert!(!dir.path().join("001_v.m4v").exists());

    ok.assert_async().await;
    missing.assert_async().await;
    Ok(())
}

fn row(title: &str, id: &str) -> ListingRow {
    ListingRow {
        title: title.to_string(),
        id: id.to_string(),
        url: format!("https://school.test/{}", id),
    }
}

fn sample_catalog() -> Catalog {
    let mut guard = Chapter::from(row("Closed Guard", "category-7"));
    guard.lectures = vec![
        Lecture::resolved(row("Intro: basics", "post-30"), Some(URL.to_string())),
        Lecture::resolved(row("Sweep #1", "post-12"), None),
    ];
    let mut mount = Chapter::from(row("Mount", "category-3"));
    mount.lectures = vec![Lecture::resolved(row("Escape", "post-44"), Some(URL.to_string()))];
    let mut course = Course::from(row("A/B", "product-1"));
    course.chapters = vec![guard, mount];
    Catalog { courses: vec![course], failed_chapters: vec![] }
}

#[test]
fn test_plan_downloads_flattens_in_tree_order() {
    let root = std::path::Path::new("BJJ");
    let plan = plan_downloads(&sample_catalog(), root, "m4v");
    assert!(plan.rejected.is_empty());
    let tasks = plan.tasks;

    let paths: Vec<_> = tasks.iter().map(|t| t.filepath.clone()).collect();
    assert_eq!(
        paths,
        [
            root.join("A").join("B").join("Closed_Guard").join("000_Intro__basics.m4v"),
            root.join("A").join("B").join("Closed_Guard").join("001_Sweep__1.m4v"),
            root.join("A").join("B").join("Mount").join("000_Escape.m4v"),
        ]
    );
    assert_eq!(tasks[1].download_url, None);
    assert_eq!(tasks[2].lecture, "Escape");
}

#[tokio::test]
async fn test_processor_reports_status_per_lecture() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("000_done.m4v"), b"x").unwrap();
    let task = |name: &str, url: Option<&str>| DownloadTask {
        course: "Course".to_string(),
        chapter: "Chapter".to_string(),
        lecture: name.to_string(),
        download_url: url.map(str::to_string),
        filepath: dir.path().join(name),
    };

    let processor = TaskProcessor::new(CountingTransport::new(500, b""), false);
    assert_eq!(
        processor.process(&task("000_done.m4v", Some(URL))).await.status,
        DownloadStatus::Skipped
    );
    assert_eq!(
        processor.process(&task("001_none.m4v", None)).await.status,
        DownloadStatus::NoLink
    );
    let failed = processor.process(&task("002_err.m4v", Some(URL))).await;
    assert_eq!(failed.status, DownloadStatus::HttpError);
    assert!(failed.message.unwrap().contains("500"));
}

#[tokio::test]
async fn test_runner_continues_after_failures_and_records_stats() -> AppResult<()> {
    let dir = tempdir().unwrap();
    let tasks = plan_downloads(&sample_catalog(), dir.path(), "m4v").tasks;
    let transport = CountingTransport::new(200, b"payload");
    let processor = TaskProcessor::new(transport.clone(), false);
    let manager = DownloadManager::new();
    manager.start_batch(tasks.len());

    execute_tasks(&processor, &tasks, &manager, &Arc::new(AtomicBool::new(false))).await?;

    assert_eq!(
        manager.get_stats(),
        DownloadStats { total: 3, success: 2, skipped: 1, failed: 0 }
    );
    assert!(manager.did_all_succeed());
    assert_eq!(transport.calls(), 2);
    assert_eq!(fs::read(&tasks[2].filepath)?, b"payload");
    Ok(())
}

#[tokio::test]
async fn test_runner_stops_when_cancelled() {
    let dir = tempdir().unwrap();
    let tasks = plan_downloads(&sample_catalog(), dir.path(), "m4v").tasks;
    let transport = CountingTransport::new(200, b"payload");
    let processor = TaskProcessor::new(transport.clone(), false);

    let err = execute_tasks(&processor, &tasks, &DownloadManager::new(), &Arc::new(AtomicBool::new(true)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UserInterrupt));
    assert_eq!(transport.calls(), 0);
}

/// 在样例目录后追加一个标题会越出输出目录的章节
fn catalog_with_escaping_chapter() -> Catalog {
    let mut catalog = sample_catalog();
    let mut bad = Chapter::from(row("Part 2/..", "category-9"));
    bad.lectures = vec![
        Lecture::resolved(row("Leak", "post-90"), Some(URL.to_string())),
        Lecture::resolved(row("Leak again", "post-91"), Some(URL.to_string())),
    ];
    catalog.courses[0].chapters.insert(1, bad);
    catalog
}

#[test]
fn test_plan_rejects_only_lectures_with_escaping_paths() {
    let plan = plan_downloads(&catalog_with_escaping_chapter(), std::path::Path::new("BJJ"), "m4v");

    assert_eq!(plan.len(), 5);
    assert_eq!(
        plan.tasks.iter().map(|t| t.lecture.as_str()).collect::<Vec<_>>(),
        ["Intro: basics", "Sweep #1", "Escape"]
    );
    assert_eq!(plan.rejected.len(), 2);
    assert_eq!(plan.rejected[0].filename, "A/B / Part 2/.. / Leak");
    assert!(plan.rejected.iter().all(|r| r.status == DownloadStatus::IoError));
}

#[tokio::test]
async fn test_catalog_run_downloads_around_escaping_chapter() -> AppResult<()> {
    let dir = tempdir()?;
    let transport = CountingTransport::new(200, b"payload");
    let config = Arc::new(AppConfig {
        output_dir: dir.path().to_path_buf(),
        extension: "m4v".to_string(),
        ..AppConfig::default()
    });
    let manager = DownloadManager::new();
    let downloader = CatalogDownloader::new(
        transport.clone(),
        config,
        manager.clone(),
        Arc::new(AtomicBool::new(false)),
    );

    let all_ok = downloader.run(&catalog_with_escaping_chapter()).await?;

    assert!(!all_ok);
    assert_eq!(
        manager.get_stats(),
        DownloadStats { total: 5, success: 2, skipped: 1, failed: 2 }
    );
    assert_eq!(transport.calls(), 2);
    let guard = dir.path().join("A").join("B").join("Closed_Guard");
    assert_eq!(fs::read(guard.join("000_Intro__basics.m4v"))?, b"payload");
    assert_eq!(fs::read(dir.path().join("A").join("B").join("Mount").join("000_Escape.m4v"))?, b"payload");
    // 越界的章节没有在输出目录外留下任何文件
    assert!(!dir.path().join("A").join("B").join("Part_2").exists());
    assert!(!dir.path().join("A").join("000_Leak.m4v").exists());
    Ok(())
}
