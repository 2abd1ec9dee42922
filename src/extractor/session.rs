// src/extractor/session.rs

use crate::{
    browser::PageDriver,
    config::{SiteLayout, credentials::Credentials},
    error::{AppError, AppResult},
};
use log::{debug, error, info};
use std::time::Duration;

/// 填写登录表单并提交，然后确认已进入课程库页面。
pub async fn sign_in<D: PageDriver>(
    driver: &mut D,
    credentials: &Credentials,
    layout: &SiteLayout,
    wait_timeout: Duration,
) -> AppResult<()> {
    let login_url = credentials.login_url(&layout.login_path);
    info!("打开登录页面: {}", login_url);
    driver.navigate(&login_url).await?;

    let email = find_required(driver, &layout.email_input, &login_url, wait_timeout).await?;
    driver.type_text(&email, &credentials.username).await?;
    let password = find_required(driver, &layout.password_input, &login_url, wait_timeout).await?;
    driver.type_text(&password, &credentials.password).await?;
    let submit = find_required(driver, &layout.submit_button, &login_url, wait_timeout).await?;
    debug!("提交登录表单");
    driver.click(&submit).await?;

    if driver.wait_for(&layout.library_marker, wait_timeout).await?.is_none() {
        let url = driver.current_url().await?.unwrap_or_default();
        error!("登录后未找到课程库标记 '{}' (当前页面: {})", layout.library_marker, url);
        return Err(AppError::SignInFailed(format!(
            "登录后未进入课程库页面 (当前页面: {})，请检查账户信息",
            url
        )));
    }
    info!("登录成功: {}", credentials.username);
    Ok(())
}

async fn find_required<D: PageDriver>(
    driver: &D,
    selector: &str,
    url: &str,
    wait_timeout: Duration,
) -> AppResult<D::Node> {
    driver
        .wait_for(selector, wait_timeout)
        .await?
        .ok_or_else(|| AppError::PageMarkerNotFound {
            marker: selector.to_string(),
            url: url.to_string(),
        })
}
