use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: GeoPoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_now: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_text: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_url: Option<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    pub rating: f64,
    pub relative_time_description: String,
    pub text: String,
    /// Unix timestamp (秒)
    pub time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<bool>,
}

/// 以中心點與半徑 (公尺) 換算的經緯度範圍
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn around(center: GeoPoint, radius_m: u32) -> Self {
        let radius_km = radius_m as f64 / 1000.0;

        // 1 度緯度約 111 km，經度再乘上 cos(lat)
        let lat_delta = radius_km / 111.0;
        let lon_delta = radius_km / (111.0 * center.lat.to_radians().cos());

        Self {
            south: center.lat - lat_delta,
            west: center.lng - lon_delta,
            north: center.lat + lat_delta,
            east: center.lng + lon_delta,
        }
    }
}

/// 地圖服務回傳的原始地點：標籤與地址欄位都還沒整理
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedPlace {
    pub provider_id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub tags: HashMap<String, String>,
    pub address: HashMap<String, String>,
}

impl TaggedPlace {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn address_part(&self, key: &str) -> Option<&str> {
        self.address
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// 搜尋結果中的一筆醫療機構
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub place_id: String,
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub types: Vec<String>,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<Review>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
}

impl Facility {
    pub fn has_type(&self, wanted: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(wanted))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub facility_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchFilters {
    pub const MAX_LIMIT: usize = 100;

    pub fn for_location(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// 目錄查表用的鍵：逗號前的城市名稱，小寫並去除空白
    pub fn location_key(&self) -> String {
        self.location
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }

    pub fn clamp_limit(limit: i64) -> usize {
        limit.clamp(1, Self::MAX_LIMIT as i64) as usize
    }
}

/// 求職信草稿請求，欄位名稱與前端一致 (camelCase)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryRequest {
    #[serde(default)]
    pub facility_id: Option<String>,
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub facility_address: Option<String>,
    #[serde(default)]
    pub facility_phone: Option<String>,
    #[serde(default)]
    pub facility_website: Option<String>,
    #[serde(default)]
    pub user_experience: Option<String>,
    #[serde(default)]
    pub user_specialties: Option<Vec<String>>,
    #[serde(default)]
    pub user_message: Option<String>,
}

impl EnquiryRequest {
    pub fn specialties_joined(&self) -> Option<String> {
        self.user_specialties
            .as_ref()
            .filter(|s| !s.is_empty())
            .map(|s| s.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnquiryDraft {
    pub subject: String,
    pub enquiry: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRanking {
    pub ranked_cities: Vec<String>,
    pub raw: String,
}
