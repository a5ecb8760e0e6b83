//! Webhook通知模块
//! 用于把交易汇总推送到企业微信等平台

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::core::error::OrbError;

/// 通知配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// 是否启用
    #[serde(default)]
    pub enabled: bool,
    /// 企业微信webhook地址
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub mentioned_list: Vec<String>,
}

/// 通知渠道
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), OrbError>;
}

/// 根据配置选择通知渠道，未启用时退化为只写日志
pub fn build_notifier(config: &NotificationConfig) -> Box<dyn Notifier> {
    match (webhook_target(config), config.enabled) {
        (Some(url), true) => Box::new(WebhookNotifier::new(
            url.to_string(),
            config.mentioned_list.clone(),
        )),
        (None, true) => {
            warn!("通知已启用但webhook_url为空，改为写入日志");
            Box::new(LogNotifier)
        }
        _ => Box::new(LogNotifier),
    }
}

/// 启用且地址非空时返回webhook地址
fn webhook_target(config: &NotificationConfig) -> Option<&str> {
    if !config.enabled {
        return None;
    }
    config
        .webhook_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

/// 企业微信文本消息
pub fn build_text_payload(subject: &str, body: &str, mentioned_list: &[String]) -> serde_json::Value {
    json!({
        "msgtype": "text",
        "text": {
            "content": format!("【{}】\n{}", subject, body),
            "mentioned_list": mentioned_list,
        }
    })
}

/// Webhook通知器
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
    mentioned_list: Vec<String>,
}

impl WebhookNotifier {
    /// 创建新的通知器
    pub fn new(webhook_url: String, mentioned_list: Vec<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            webhook_url,
            mentioned_list,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), OrbError> {
        let payload = build_text_payload(subject, body, &self.mentioned_list);

        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OrbError::Notification(format!("webhook 请求失败: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(OrbError::Notification(format!(
                "webhook 返回异常: {} - {}",
                status, text
            )));
        }

        info!("成功发送Webhook通知: {}", subject);
        Ok(())
    }
}

/// 只写日志的通知器
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), OrbError> {
        info!("通知未启用，汇总内容如下:\n{}\n\n{}", subject, body);
        Ok(())
    }
}
