// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const FILENAME_TRUNCATE_LENGTH: usize = 65;
pub const ORDINAL_WIDTH: usize = 3;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_CREDENTIALS_FILE: &str = "user.info";
pub const DEFAULT_LOG_FILE: &str = "log.log";
pub const DEFAULT_SAVE_DIR: &str = "BJJ";
pub const DEFAULT_EXTENSION: &str = "m4v";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub mod env {
    pub const EMAIL: &str = "KAJABI_EMAIL";
    pub const PASSWORD: &str = "KAJABI_PASSWORD";
    pub const SITE_URL: &str = "KAJABI_SITE_URL";
}

pub const HELP_CREDENTIALS_GUIDE: &str = r#"
1. 在当前目录创建 `user.info` 文件 (或使用 --credentials 指定其它路径)。
2. 文件只包含一行，三个字段以空格分隔:
----------------------------------------------
you@example.com  你的密码  https://your-school.mykajabi.com
----------------------------------------------
3. 网站地址不要以 '/' 结尾，程序会自动拼接 /login 与 /library。
4. 未使用 --credentials 时也可以用环境变量代替文件:
   KAJABI_EMAIL / KAJABI_PASSWORD / KAJABI_SITE_URL
   读取顺序: --credentials 指定的文件 > 环境变量 > 当前目录的 user.info
5. 若只提供了邮箱与网址，程序会在启动时提示输入密码 (输入不可见)。"#;

/// 站点页面结构的默认值，可在外部配置文件中覆盖。
pub mod site {
    pub const LOGIN_PATH: &str = "/login";
    pub const LIBRARY_PATH: &str = "/library";
    pub const EMAIL_INPUT: &str = "#member_email";
    pub const PASSWORD_INPUT: &str = "#member_password";
    pub const SUBMIT_BUTTON: &str = "[name='commit']";
    pub const LIBRARY_MARKER: &str = ".library__title";
    pub const COURSE_MARKER: &str = ".product-header";
    pub const PAGINATION_CONTAINER: &str = "div.pagination-custom";
    pub const NEXT_PAGE_TEXT: &str = "Next";
    pub const DOWNLOAD_LINK: &str = "a[class*='btn-video-download']";
}
