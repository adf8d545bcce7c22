use crate::utils::error::{Result, ScoutError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const MAX_LOGGED_BODY: usize = 300;

pub fn build_client(user_agent: &str) -> Result<Client> {
    let client = Client::builder().user_agent(user_agent).build()?;
    Ok(client)
}

/// 非 2xx 回應轉成 UpstreamStatusError，內容只寫進日誌
pub async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    provider: &'static str,
) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(
            "{} returned status {}: {}",
            provider,
            status,
            truncate(&body, MAX_LOGGED_BODY)
        );
        return Err(ScoutError::UpstreamStatusError {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }

    let value = resp.json::<T>().await?;
    Ok(value)
}

/// 把 JSON 物件攤平成字串對字串；空陣列 (PHP 的空物件) 或其他型別回傳空 map
pub fn string_map(value: Option<serde_json::Value>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Some(serde_json::Value::Object(obj)) = value {
        for (key, value) in obj {
            match value {
                serde_json::Value::String(s) => {
                    map.insert(key, s);
                }
                serde_json::Value::Number(n) => {
                    map.insert(key, n.to_string());
                }
                serde_json::Value::Bool(b) => {
                    map.insert(key, b.to_string());
                }
                _ => {}
            }
        }
    }
    map
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
