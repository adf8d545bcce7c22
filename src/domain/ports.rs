use crate::domain::model::{BoundingBox, GeoPoint, TaggedPlace};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 一列 SPARQL 結果：變數名稱 -> 值
pub type SparqlBinding = HashMap<String, String>;

/// 文字搜尋型的地理編碼服務 (Nominatim)
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_text(&self, query: &str) -> Result<Vec<TaggedPlace>>;
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>>;
    async fn lookup(&self, place_id: &str) -> Result<Option<TaggedPlace>>;
}

/// 結構化查詢服務 (Overpass)
#[async_trait]
pub trait StructuredSearch: Send + Sync {
    async fn facilities_within(&self, bbox: BoundingBox) -> Result<Vec<TaggedPlace>>;
}

/// 知識圖譜查詢服務 (Wikidata)
#[async_trait]
pub trait KnowledgeGraph: Send + Sync {
    async fn select(&self, sparql: &str) -> Result<Vec<SparqlBinding>>;
}

/// 託管的生成式語言模型 (Gemini)
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}
