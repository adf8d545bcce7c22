use crate::adapters::http::{build_client, handle_response, string_map};
use crate::config::toml_config::NominatimConfig;
use crate::domain::model::{GeoPoint, TaggedPlace};
use crate::domain::ports::PlaceSearch;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "Nominatim";

/// `/search` 回傳的單筆結果
#[derive(Debug, Deserialize)]
struct SearchPlace {
    #[serde(default)]
    place_id: Option<u64>,
    #[serde(default)]
    osm_id: Option<u64>,
    lat: String,
    lon: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<serde_json::Value>,
    #[serde(default)]
    extratags: Option<serde_json::Value>,
    #[serde(default)]
    namedetails: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Centroid {
    coordinates: Vec<f64>,
}

/// `/details` 的回應格式和 `/search` 不同
#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    place_id: Option<u64>,
    #[serde(default)]
    osm_id: Option<u64>,
    #[serde(default)]
    localname: Option<String>,
    #[serde(default)]
    names: Option<serde_json::Value>,
    #[serde(default)]
    addresstags: Option<serde_json::Value>,
    #[serde(default)]
    extratags: Option<serde_json::Value>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    centroid: Option<Centroid>,
}

impl SearchPlace {
    fn into_tagged(self) -> Option<TaggedPlace> {
        let lat = self.lat.trim().parse::<f64>().ok()?;
        let lng = self.lon.trim().parse::<f64>().ok()?;
        let names = string_map(self.namedetails);

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| names.get("name").cloned());

        Some(TaggedPlace {
            provider_id: self.place_id.or(self.osm_id).map(|id| id.to_string()),
            name,
            display_name: self.display_name.filter(|d| !d.trim().is_empty()),
            lat,
            lng,
            tags: string_map(self.extratags),
            address: string_map(self.address),
        })
    }
}

impl PlaceDetails {
    fn into_tagged(self) -> TaggedPlace {
        let mut tags = string_map(self.extratags);
        if let (Some(category), Some(kind)) = (self.category, self.place_type) {
            tags.entry(category).or_insert(kind);
        }

        let names = string_map(self.names);
        let name = self
            .localname
            .filter(|n| !n.trim().is_empty())
            .or_else(|| names.get("name").cloned())
            .or_else(|| names.get("name:en").cloned());

        // addresstags 使用 OSM 的 addr:* 命名，轉成 /search 的欄位名稱
        let address = string_map(self.addresstags)
            .into_iter()
            .map(|(key, value)| (address_key(&key).to_string(), value))
            .collect::<HashMap<_, _>>();

        let (lng, lat) = self
            .centroid
            .and_then(|c| match c.coordinates.as_slice() {
                [lon, lat, ..] => Some((*lon, *lat)),
                _ => None,
            })
            .unwrap_or((0.0, 0.0));

        TaggedPlace {
            provider_id: self.place_id.or(self.osm_id).map(|id| id.to_string()),
            name,
            display_name: None,
            lat,
            lng,
            tags,
            address,
        }
    }
}

/// OSM `addr:*` 標籤名稱對應到 Nominatim 地址欄位
pub fn address_key(osm_key: &str) -> &str {
    match osm_key.trim_start_matches("addr:") {
        "housenumber" => "house_number",
        "street" => "road",
        other => other,
    }
}

pub struct NominatimClient {
    client: Client,
    config: NominatimConfig,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn search(&self, query: &str, limit: u32, details: bool) -> Result<Vec<SearchPlace>> {
        let mut params: Vec<(&str, String)> = vec![
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("limit", limit.to_string()),
        ];
        if details {
            params.push(("addressdetails", "1".to_string()));
            params.push(("extratags", "1".to_string()));
            params.push(("namedetails", "1".to_string()));
        }

        tracing::debug!("Nominatim search: {}", query);
        let response = self
            .client
            .get(self.url("search"))
            .query(&params)
            .timeout(Duration::from_secs(self.config.search_timeout_seconds))
            .send()
            .await?;

        handle_response(response, PROVIDER).await
    }
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    async fn search_text(&self, query: &str) -> Result<Vec<TaggedPlace>> {
        let places = self
            .search(query, self.config.result_limit, true)
            .await?
            .into_iter()
            .filter_map(SearchPlace::into_tagged)
            .collect();
        Ok(places)
    }

    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>> {
        let point = self
            .search(query, 1, false)
            .await?
            .into_iter()
            .filter_map(SearchPlace::into_tagged)
            .next()
            .map(|p| GeoPoint {
                lat: p.lat,
                lng: p.lng,
            });
        Ok(point)
    }

    async fn lookup(&self, place_id: &str) -> Result<Option<TaggedPlace>> {
        let response = self
            .client
            .get(self.url("details"))
            .query(&[
                ("place_id", place_id),
                ("format", "json"),
                ("addressdetails", "1"),
                ("extratags", "1"),
                ("namedetails", "1"),
            ])
            .timeout(Duration::from_secs(self.config.detail_timeout_seconds))
            .send()
            .await?;

        // 未知的 place_id 會回 400/404
        if matches!(
            response.status(),
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST
        ) {
            tracing::debug!("Nominatim has no place {}", place_id);
            return Ok(None);
        }

        let details: PlaceDetails = handle_response(response, PROVIDER).await?;
        Ok(Some(details.into_tagged()))
    }
}
