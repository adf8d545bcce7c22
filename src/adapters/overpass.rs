use crate::adapters::http::{build_client, handle_response};
use crate::adapters::nominatim::address_key;
use crate::config::toml_config::OverpassConfig;
use crate::domain::model::{BoundingBox, TaggedPlace};
use crate::domain::ports::StructuredSearch;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "Overpass";

#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

/// node / way / relation；way 與 relation 只有 center
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub type_: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

impl Element {
    fn into_tagged(self) -> Option<TaggedPlace> {
        let tags = self.tags?;

        let name = tags
            .get("name")
            .or_else(|| tags.get("name:en"))
            .filter(|n| !n.trim().is_empty())
            .cloned();

        let address = tags
            .iter()
            .filter(|(key, _)| key.starts_with("addr:"))
            .map(|(key, value)| (address_key(key).to_string(), value.clone()))
            .collect();

        let lat = self.lat.or(self.center.map(|c| c.lat)).unwrap_or(0.0);
        let lng = self.lon.or(self.center.map(|c| c.lon)).unwrap_or(0.0);

        Some(TaggedPlace {
            provider_id: Some(self.id.to_string()),
            name,
            display_name: None,
            lat,
            lng,
            tags,
            address,
        })
    }
}

/// 範圍內的醫院、診所與 healthcare=* 設施
pub fn facility_query(bbox: BoundingBox, timeout_seconds: u64) -> String {
    let area = format!(
        "{},{},{},{}",
        bbox.south, bbox.west, bbox.north, bbox.east
    );
    format!(
        r#"[out:json][timeout:{timeout}];
(
  nwr["amenity"~"^(hospital|clinic|doctors)$"]({area});
  nwr["healthcare"]({area});
);
out center tags;"#,
        timeout = timeout_seconds,
        area = area
    )
}

pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            config,
        })
    }
}

#[async_trait]
impl StructuredSearch for OverpassClient {
    async fn facilities_within(&self, bbox: BoundingBox) -> Result<Vec<TaggedPlace>> {
        let query = facility_query(bbox, self.config.timeout_seconds);
        tracing::debug!("Overpass query:\n{}", query);

        // Overpass 要求 form 編碼: data=<query>
        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&[("data", query.as_str())])
            .timeout(Duration::from_secs(self.config.timeout_seconds + 5))
            .send()
            .await?;

        let body: OverpassResponse = handle_response(response, PROVIDER).await?;
        tracing::debug!("Overpass returned {} elements", body.elements.len());

        Ok(body
            .elements
            .into_iter()
            .filter_map(Element::into_tagged)
            .collect())
    }
}
