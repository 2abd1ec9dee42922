// src/models/mod.rs

pub mod download;

pub use download::{DownloadResult, DownloadStatus, DownloadTask};

use serde::Serialize;

/// 目录中的三种实体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Course,
    Chapter,
    Lecture,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Course => "课程",
            EntityKind::Chapter => "章节",
            EntityKind::Lecture => "课时",
        }
    }
}

/// 列表页中一行的原始属性: (标题, 站点编号, 页面地址)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub title: String,
    pub id: String,
    pub url: String,
}

/// 三种实体共有的能力。`id` 由站点分配，只保证在同类实体中唯一，
/// 不连续也不可做任何算术运算。
pub trait CatalogNode {
    const KIND: EntityKind;

    fn title(&self) -> &str;
    fn id(&self) -> &str;
    fn url(&self) -> &str;
}

macro_rules! impl_catalog_node {
    ($ty:ty, $kind:expr) => {
        impl CatalogNode for $ty {
            const KIND: EntityKind = $kind;

            fn title(&self) -> &str {
                &self.title
            }
            fn id(&self) -> &str {
                &self.id
            }
            fn url(&self) -> &str {
                &self.url
            }
        }
    };
}

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub title: String,
    pub id: String,
    pub url: String,
    pub chapters: Vec<Chapter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub title: String,
    pub id: String,
    pub url: String,
    pub lectures: Vec<Lecture>,
}

/// 课时只在访问过自己的页面后才会被创建，
/// 因此 `download_url == None` 只表示页面上没有下载按钮。
#[derive(Debug, Clone, Serialize)]
pub struct Lecture {
    pub title: String,
    pub id: String,
    pub url: String,
    pub download_url: Option<String>,
}

impl_catalog_node!(Course, EntityKind::Course);
impl_catalog_node!(Chapter, EntityKind::Chapter);
impl_catalog_node!(Lecture, EntityKind::Lecture);

impl From<ListingRow> for Course {
    fn from(row: ListingRow) -> Self {
        Self { title: row.title, id: row.id, url: row.url, chapters: Vec::new() }
    }
}

impl From<ListingRow> for Chapter {
    fn from(row: ListingRow) -> Self {
        Self { title: row.title, id: row.id, url: row.url, lectures: Vec::new() }
    }
}

impl Lecture {
    pub fn resolved(row: ListingRow, download_url: Option<String>) -> Self {
        Self { title: row.title, id: row.id, url: row.url, download_url }
    }
}

/// 第三阶段中因没有任何视频而被跳过的章节
#[derive(Debug, Clone, Serialize)]
pub struct ChapterFailure {
    pub course: String,
    pub chapter: String,
    pub reason: String,
}

/// 完整的 课程 → 章节 → 课时 目录树
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    pub courses: Vec<Course>,
    pub failed_chapters: Vec<ChapterFailure>,
}

impl Catalog {
    pub fn chapter_count(&self) -> usize {
        self.courses.iter().map(|c| c.chapters.len()).sum()
    }

    pub fn lectures(&self) -> impl Iterator<Item = &Lecture> {
        self.courses
            .iter()
            .flat_map(|c| c.chapters.iter())
            .flat_map(|ch| ch.lectures.iter())
    }

    pub fn lecture_count(&self) -> usize {
        self.lectures().count()
    }

    /// 页面上没有下载按钮的课时
    pub fn missing_links(&self) -> Vec<&Lecture> {
        self.lectures().filter(|l| l.download_url.is_none()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> ListingRow {
        ListingRow {
            title: "Title".to_string(),
            id: id.to_string(),
            url: "https://www.lipsum.com/".to_string(),
        }
    }

    #[test]
    fn test_entity_kinds() {
        assert_eq!(Course::KIND, EntityKind::Course);
        assert_eq!(Chapter::KIND, EntityKind::Chapter);
        assert_eq!(Lecture::KIND, EntityKind::Lecture);
    }

    #[test]
    fn test_tree_assembly_and_counts() {
        let mut course = Course::from(row("product-123"));
        assert_eq!(course.title(), "Title");
        assert_eq!(course.id(), "product-123");
        assert_eq!(course.url(), "https://www.lipsum.com/");

        let mut chapter = Chapter::from(row("category-9"));
        chapter.lectures = vec![
            Lecture::resolved(row("post-7"), Some("https://cdn.test/7.m4v".to_string())),
            Lecture::resolved(row("post-3"), None),
        ];
        course.chapters = vec![chapter];

        let catalog = Catalog { courses: vec![course], failed_chapters: vec![] };
        assert_eq!(catalog.chapter_count(), 1);
        assert_eq!(catalog.lecture_count(), 2);
        let missing = catalog.missing_links();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].id(), "post-3");
    }
}
