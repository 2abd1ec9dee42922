// src/utils.rs

use crate::{constants, error::*};
use regex::Regex;
use std::{
    path::{Component, Path, PathBuf},
    sync::LazyLock,
};

// 目录名允许保留 '/' ':' '.' '-'，文件名只允许字母数字、下划线与 '-'
static DIR_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\d/:.-]").unwrap());
static FILENAME_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\d-]").unwrap());

pub fn sanitize_dir_segment(segment: &str) -> String {
    DIR_SEGMENT_RE.replace_all(segment, "_").into_owned()
}

pub fn sanitize_filename_segment(segment: &str) -> String {
    FILENAME_SEGMENT_RE.replace_all(segment, "_").into_owned()
}

/// 构建 `root/课程/章节/NNN_课时.ext`。
///
/// 课程与章节标题各自独立清理后再拼接，因此标题中的 '/' 只会在自己的
/// 目录段内展开为子目录；文件名段使用更严格的过滤规则，不会引入路径分隔符。
pub fn format_lecture_path(
    root: &Path,
    course_title: &str,
    chapter_title: &str,
    lecture_title: &str,
    ordinal: usize,
    ext: &str,
) -> AppResult<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in [course_title, chapter_title] {
        path = secure_join_path(&path, Path::new(&sanitize_dir_segment(segment)))?;
    }

    let stem = format!(
        "{:0width$}_{}",
        ordinal,
        sanitize_filename_segment(lecture_title),
        width = constants::ORDINAL_WIDTH
    );
    let ext = sanitize_filename_segment(ext);
    let filename = if ext.is_empty() { stem } else { format!("{}.{}", stem, ext) };
    path.push(filename);
    Ok(path)
}

/// 按词法拼接路径: 忽略根目录与 '.'，拒绝 '..'，保证结果不会离开 `base_dir`。
pub fn secure_join_path(base_dir: &Path, relative_path: &Path) -> AppResult<PathBuf> {
    let mut final_path = base_dir.to_path_buf();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => final_path.push(part),
            Component::ParentDir => {
                return Err(AppError::Security(format!(
                    "检测到路径遍历 '..': {:?}",
                    relative_path
                )))
            }
            _ => continue,
        }
    }
    Ok(final_path)
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

/// 将页面中的 href 解析为绝对地址
pub fn resolve_href(base: Option<&str>, href: &str) -> AppResult<String> {
    let href = href.trim();
    match url::Url::parse(href) {
        Ok(url) => Ok(url.into()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or(url::ParseError::RelativeUrlWithoutBase)?;
            Ok(url::Url::parse(base)?.join(href)?.into())
        }
        Err(e) => Err(e.into()),
    }
}
