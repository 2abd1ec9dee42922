// src/config/credentials.rs

use crate::{
    constants,
    error::{AppError, AppResult},
    ui,
};
use anyhow::Context;
use log::{debug, info};
use std::{fmt, fs, path::Path};

/// 登录所需的账户信息，启动时读取一次。
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub site_url: String,
}

// 避免密码被写入日志
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("site_url", &self.site_url)
            .finish()
    }
}

impl Credentials {
    pub fn new(username: &str, password: &str, site_url: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.trim().to_string(),
            site_url: site_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn login_url(&self, login_path: &str) -> String {
        format!("{}{}", self.site_url, login_path)
    }

    pub fn library_url(&self, library_path: &str) -> String {
        format!("{}{}", self.site_url, library_path)
    }
}

/// 邮箱、可选的密码与网站地址
type Fields = (String, Option<String>, String);

/// 解析 `user.info` 的单行内容: `邮箱 密码 网站地址`。
/// 只有两个字段时视为缺少密码。
pub fn parse_credentials_line(line: &str) -> AppResult<Fields> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [username, password, site_url] => Ok((
            username.to_string(),
            Some(password.to_string()),
            site_url.to_string(),
        )),
        [username, site_url] => Ok((username.to_string(), None, site_url.to_string())),
        _ => Err(AppError::Credentials(format!(
            "期望 3 个以空格分隔的字段 (邮箱 密码 网站地址)，实际为 {} 个",
            fields.len()
        ))),
    }
}

fn from_env() -> Option<Fields> {
    let username = std::env::var(constants::env::EMAIL).ok().filter(|s| !s.is_empty())?;
    let site_url = std::env::var(constants::env::SITE_URL).ok().filter(|s| !s.is_empty())?;
    let password = std::env::var(constants::env::PASSWORD).ok().filter(|s| !s.is_empty());
    Some((username, password, site_url))
}

fn from_file(path: &Path) -> AppResult<Fields> {
    if !path.is_file() {
        return Err(AppError::Credentials(format!(
            "未找到账户信息文件 '{}' (使用 --credentials-help 查看说明)",
            path.display()
        )));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("读取账户信息文件 '{}' 失败", path.display()))?;
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| AppError::Credentials(format!("账户信息文件 '{}' 为空", path.display())))?;
    parse_credentials_line(line)
}

fn fields_from_file(path: &Path) -> AppResult<(Fields, String)> {
    debug!("从文件 '{}' 读取账户信息", path.display());
    Ok((from_file(path)?, format!("文件 '{}'", path.display())))
}

// 命令行指定的文件 > 环境变量 > 当前目录的默认文件
fn select_fields(explicit: Option<&Path>, env: impl FnOnce() -> Option<Fields>) -> AppResult<(Fields, String)> {
    if let Some(path) = explicit {
        return fields_from_file(path);
    }
    if let Some(fields) = env() {
        debug!("使用来自环境变量的账户信息");
        return Ok((fields, "环境变量".to_string()));
    }
    fields_from_file(Path::new(constants::DEFAULT_CREDENTIALS_FILE))
}

/// 按 `--credentials` 文件、环境变量、默认 `user.info` 的顺序读取账户信息；
/// 缺少密码时提示用户输入。
pub fn resolve_credentials(explicit: Option<&Path>) -> AppResult<(Credentials, String)> {
    let (fields, source) = select_fields(explicit, from_env)?;
    let (username, password, site_url) = fields;
    if url::Url::parse(site_url.trim()).is_err() {
        return Err(AppError::Credentials(format!("无效的网站地址 '{}'", site_url)));
    }
    let password = match password {
        Some(p) => p,
        None => {
            info!("账户信息中缺少密码，提示用户输入");
            let p = ui::prompt_hidden(&format!("请输入 {} 的密码 (输入不可见)", username))?;
            if p.trim().is_empty() {
                return Err(AppError::Credentials("密码不能为空".to_string()));
            }
            p
        }
    };

    Ok((Credentials::new(&username, &password, &site_url), source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_credentials_line() {
        let (user, pass, url) =
            parse_credentials_line("me@example.com secret https://school.test\n").unwrap();
        assert_eq!(user, "me@example.com");
        assert_eq!(pass.as_deref(), Some("secret"));
        assert_eq!(url, "https://school.test");

        let (_, pass, _) = parse_credentials_line("me@example.com https://school.test").unwrap();
        assert!(pass.is_none());

        assert!(matches!(
            parse_credentials_line("only-one-field"),
            Err(AppError::Credentials(_))
        ));
    }

    #[test]
    fn test_derived_urls_strip_trailing_slash() {
        let creds = Credentials::new("me", "pw", " https://school.test/ \n");
        assert_eq!(creds.login_url("/login"), "https://school.test/login");
        assert_eq!(creds.library_url("/library"), "https://school.test/library");
        assert!(!format!("{:?}", creds).contains("pw"));
    }

    #[test]
    fn test_missing_file_is_a_credentials_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = from_file(&dir.path().join("user.info")).unwrap_err();
        assert!(matches!(err, AppError::Credentials(_)));
    }

    fn env_fields() -> Option<Fields> {
        Some(("env@example.com".to_string(), Some("env-pw".to_string()), "https://env.test".to_string()))
    }

    #[test]
    fn test_explicit_file_wins_over_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.info");
        fs::write(&path, "file@example.com file-pw https://file.test\n").unwrap();

        let ((user, pass, url), source) = select_fields(Some(&path), env_fields).unwrap();
        assert_eq!(user, "file@example.com");
        assert_eq!(pass.as_deref(), Some("file-pw"));
        assert_eq!(url, "https://file.test");
        assert!(source.contains("other.info"));

        // 指定的文件不存在时不会退回到环境变量
        let missing = dir.path().join("missing.info");
        let err = select_fields(Some(&missing), env_fields).unwrap_err();
        assert!(matches!(err, AppError::Credentials(ref m) if m.contains("missing.info")));
    }

    #[test]
    fn test_environment_used_without_explicit_file() {
        let ((user, _, _), source) = select_fields(None, env_fields).unwrap();
        assert_eq!(user, "env@example.com");
        assert_eq!(source, "环境变量");
    }
}
