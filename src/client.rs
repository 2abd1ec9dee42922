// src/client.rs

use crate::{config::AppConfig, error::*};
use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use log::debug;
use std::sync::Arc;

pub type ByteStream = BoxStream<'static, AppResult<Vec<u8>>>;

/// 一次 GET 请求的结果: 状态码与按块读取的响应体
pub struct TransferResponse {
    pub status: u16,
    pub body: ByteStream,
}

impl TransferResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 下载器对网络层的唯一依赖，便于在测试中替换。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> AppResult<TransferResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> AppResult<TransferResponse> {
        (**self).get(url).await
    }
}

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> AppResult<TransferResponse> {
        let res = self.client.get(url).send().await?;
        let status = res.status().as_u16();
        debug!("GET {} -> {}", url, status);
        let body = res
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(AppError::from))
            .boxed();
        Ok(TransferResponse { status, body })
    }
}
