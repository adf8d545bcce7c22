use crate::config::toml_config::SearchConfig;
use crate::core::catalog::FacilityCatalog;
use crate::core::places::{dedupe_by_provider_id, is_medical, to_facility};
use crate::domain::model::{BoundingBox, Facility, SearchFilters};
use crate::domain::ports::{PlaceSearch, StructuredSearch};
use crate::utils::error::{Result, ScoutError};

/// 文字搜尋用的關鍵字，依序各查一次
pub const SEARCH_TERMS: &[&str] = &[
    "hospital",
    "clinic",
    "ophthalmology",
    "optometry",
    "eye",
    "medical",
    "healthcare",
];

/// 依序嘗試：內建目錄 -> 文字搜尋 -> 結構化搜尋 -> 其他城市
pub struct FacilityAggregator<P: PlaceSearch, S: StructuredSearch> {
    places: P,
    structured: S,
    catalog: FacilityCatalog,
    config: SearchConfig,
}

impl<P: PlaceSearch, S: StructuredSearch> FacilityAggregator<P, S> {
    pub fn new(places: P, structured: S, catalog: FacilityCatalog, config: SearchConfig) -> Self {
        Self {
            places,
            structured,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &FacilityCatalog {
        &self.catalog
    }

    pub async fn search(&self, filters: &SearchFilters) -> Vec<Facility> {
        match self.try_search(filters).await {
            Ok(facilities) => facilities,
            Err(e) => {
                tracing::error!("❌ Facility search for '{}' failed: {}", filters.location, e);
                self.catalog
                    .all()
                    .take(self.config.fallback_results)
                    .cloned()
                    .collect()
            }
        }
    }

    /// 請求的篩選條件只套用在外部搜尋結果；目錄與備援清單原樣回傳

    async fn try_search(&self, filters: &SearchFilters) -> Result<Vec<Facility>> {
        let key = filters.location_key();

        if let Some(known) = self.catalog.city(&key) {
            tracing::info!("📚 Found {} catalog facilities for {}", known.len(), key);
            return Ok(known.to_vec());
        }

        let location = filters.location.trim();
        let from_text = apply_filters(self.text_search(location).await?, filters);
        if !from_text.is_empty() {
            tracing::info!("🔍 Text search returned {} facilities for {}", from_text.len(), location);
            return Ok(from_text);
        }

        if self.config.structured_search {
            let radius = filters.radius.unwrap_or(self.config.default_radius_m);
            match self
                .structured_search(location, radius)
                .await
                .map(|found| apply_filters(found, filters))
            {
                Ok(found) if !found.is_empty() => {
                    tracing::info!(
                        "🗺️ Structured search returned {} facilities for {}",
                        found.len(),
                        location
                    );
                    return Ok(found);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Structured search for '{}' failed: {}", location, e),
            }
        }

        let nearby: Vec<Facility> = self
            .catalog
            .excluding(&key)
            .take(self.config.fallback_results)
            .cloned()
            .collect();
        tracing::info!("No facilities found in {}, showing {} from other cities", key, nearby.len());
        Ok(nearby)
    }

    /// 每個關鍵字查詢失敗就略過；全部失敗才回傳最後一個錯誤
    async fn text_search(&self, location: &str) -> Result<Vec<Facility>> {
        let mut collected = Vec::new();
        let mut last_error: Option<ScoutError> = None;
        let mut succeeded = 0usize;

        for term in SEARCH_TERMS {
            let query = format!("{} {}", term, location);
            match self.places.search_text(&query).await {
                Ok(found) => {
                    succeeded += 1;
                    collected.extend(found);
                }
                Err(e) => {
                    tracing::warn!("Error searching with query \"{}\": {}", query, e);
                    last_error = Some(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(dedupe_by_provider_id(collected)
            .into_iter()
            .filter(is_medical)
            .map(to_facility)
            .take(self.config.max_results)
            .collect())
    }

    async fn structured_search(&self, location: &str, radius_m: u32) -> Result<Vec<Facility>> {
        let Some(center) = self.places.geocode(location).await? else {
            tracing::debug!("Could not geocode '{}'", location);
            return Ok(Vec::new());
        };

        let bbox = BoundingBox::around(center, radius_m);
        let found = self.structured.facilities_within(bbox).await?;

        Ok(found
            .into_iter()
            .map(to_facility)
            .take(self.config.max_results)
            .collect())
    }

    pub async fn details(&self, place_id: &str) -> Option<Facility> {
        if let Some(known) = self.catalog.find(place_id) {
            return Some(known.clone());
        }

        match self.places.lookup(place_id).await {
            Ok(found) => found.map(to_facility),
            Err(e) => {
                tracing::error!("Error getting facility details for {}: {}", place_id, e);
                None
            }
        }
    }
}

pub fn apply_filters(facilities: Vec<Facility>, filters: &SearchFilters) -> Vec<Facility> {
    let wanted_type = filters
        .facility_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let min_rating = filters.min_rating.filter(|r| *r > 0.0);

    let filtered = facilities.into_iter().filter(|f| {
        wanted_type.map(|t| f.has_type(t)).unwrap_or(true)
            && min_rating
                .map(|min| f.rating.map(|r| r >= min).unwrap_or(false))
                .unwrap_or(true)
    });

    match filters.limit {
        Some(limit) => filtered
            .take(SearchFilters::clamp_limit(limit as i64))
            .collect(),
        None => filtered.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{GeoPoint, TaggedPlace};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockPlaces {
        results: HashMap<String, Vec<TaggedPlace>>,
        center: Option<GeoPoint>,
        failing: bool,
        queries: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl PlaceSearch for MockPlaces {
        async fn search_text(&self, query: &str) -> Result<Vec<TaggedPlace>> {
            self.queries.lock().await.push(query.to_string());
            if self.failing {
                return Err(ScoutError::UpstreamStatusError {
                    provider: "Nominatim".to_string(),
                    status: 500,
                });
            }
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn geocode(&self, _query: &str) -> Result<Option<GeoPoint>> {
            Ok(self.center)
        }

        async fn lookup(&self, place_id: &str) -> Result<Option<TaggedPlace>> {
            if place_id == "broken" {
                return Err(ScoutError::UpstreamStatusError {
                    provider: "Nominatim".to_string(),
                    status: 502,
                });
            }
            Ok((place_id == "9001").then(|| named("9001", "Ring Road Eye Clinic")))
        }
    }

    #[derive(Clone, Default)]
    struct MockStructured {
        places: Vec<TaggedPlace>,
        calls: Arc<Mutex<Vec<BoundingBox>>>,
    }

    #[async_trait]
    impl StructuredSearch for MockStructured {
        async fn facilities_within(&self, bbox: BoundingBox) -> Result<Vec<TaggedPlace>> {
            self.calls.lock().await.push(bbox);
            Ok(self.places.clone())
        }
    }

    fn named(id: &str, name: &str) -> TaggedPlace {
        TaggedPlace {
            provider_id: Some(id.to_string()),
            name: Some(name.to_string()),
            lat: 7.4,
            lng: 3.9,
            ..TaggedPlace::default()
        }
    }

    fn aggregator(
        places: MockPlaces,
        structured: MockStructured,
    ) -> FacilityAggregator<MockPlaces, MockStructured> {
        FacilityAggregator::new(
            places,
            structured,
            FacilityCatalog::builtin(),
            SearchConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_catalog_hit_skips_providers() {
        let places = MockPlaces::default();
        let queries = places.queries.clone();
        let agg = aggregator(places, MockStructured::default());

        let found = agg.search(&SearchFilters::for_location("Lagos, Nigeria")).await;

        let ids: Vec<&str> = found.iter().map(|f| f.place_id.as_str()).collect();
        assert_eq!(ids, vec!["lagos-1", "lagos-2", "lagos-3"]);
        assert!(queries.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_text_search_dedupes_and_filters() {
        let mut results = HashMap::new();
        results.insert(
            "hospital Ibadan".to_string(),
            vec![named("1", "Adeoyo Hospital"), named("2", "Dugbe Market")],
        );
        results.insert(
            "eye Ibadan".to_string(),
            vec![named("1", "Adeoyo Hospital"), named("3", "Bright Vision Centre")],
        );
        let places = MockPlaces {
            results,
            ..MockPlaces::default()
        };
        let queries = places.queries.clone();
        let agg = aggregator(places, MockStructured::default());

        let found = agg.search(&SearchFilters::for_location("Ibadan")).await;

        let ids: Vec<&str> = found.iter().map(|f| f.place_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(queries.lock().await.len(), SEARCH_TERMS.len());
        assert_eq!(queries.lock().await[0], "hospital Ibadan");
    }

    #[tokio::test]
    async fn test_text_search_caps_results() {
        let many: Vec<TaggedPlace> = (0..30)
            .map(|i| named(&i.to_string(), &format!("Clinic {}", i)))
            .collect();
        let mut results = HashMap::new();
        results.insert("clinic Ibadan".to_string(), many);
        let places = MockPlaces {
            results,
            ..MockPlaces::default()
        };
        let agg = aggregator(places, MockStructured::default());

        let found = agg.search(&SearchFilters::for_location("Ibadan")).await;
        assert_eq!(found.len(), 20);
    }

    #[tokio::test]
    async fn test_structured_search_used_when_text_empty() {
        let places = MockPlaces {
            center: Some(GeoPoint { lat: 7.38, lng: 3.94 }),
            ..MockPlaces::default()
        };
        let structured = MockStructured {
            places: vec![named("node/42", "Oyo State Hospital")],
            ..MockStructured::default()
        };
        let calls = structured.calls.clone();
        let agg = aggregator(places, structured);

        let mut filters = SearchFilters::for_location("Ibadan");
        filters.radius = Some(2000);
        let found = agg.search(&filters).await;

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].place_id, "node/42");
        let bbox = calls.lock().await[0];
        assert!(bbox.south < 7.38 && bbox.north > 7.38);
    }

    #[tokio::test]
    async fn test_fallback_to_other_cities() {
        let agg = aggregator(MockPlaces::default(), MockStructured::default());

        let found = agg.search(&SearchFilters::for_location("Timbuktu")).await;

        assert!(!found.is_empty());
        assert!(found.len() <= 10);
        assert_eq!(found[0].place_id, "lagos-1");
    }

    #[tokio::test]
    async fn test_failing_provider_falls_back_to_catalog() {
        let places = MockPlaces {
            failing: true,
            ..MockPlaces::default()
        };
        let agg = aggregator(places, MockStructured::default());

        let found = agg.search(&SearchFilters::for_location("Ibadan")).await;
        assert_eq!(found.len(), 7);
    }

    fn tagged(id: &str, name: &str, amenity: &str) -> TaggedPlace {
        let mut place = named(id, name);
        place.tags.insert("amenity".to_string(), amenity.to_string());
        place
    }

    #[tokio::test]
    async fn test_filters_apply_to_provider_results() {
        let mut results = HashMap::new();
        results.insert(
            "hospital Ibadan".to_string(),
            vec![
                tagged("1", "Adeoyo Hospital", "hospital"),
                tagged("2", "Ring Road Clinic", "clinic"),
                tagged("3", "Mokola Clinic", "clinic"),
            ],
        );
        let places = MockPlaces {
            results,
            ..MockPlaces::default()
        };
        let agg = aggregator(places, MockStructured::default());

        let mut filters = SearchFilters::for_location("Ibadan");
        filters.facility_type = Some("Clinic".to_string());
        let ids: Vec<String> = agg
            .search(&filters)
            .await
            .into_iter()
            .map(|f| f.place_id)
            .collect();
        assert_eq!(ids, vec!["2", "3"]);

        filters.limit = Some(1);
        assert_eq!(agg.search(&filters).await.len(), 1);
    }

    #[tokio::test]
    async fn test_filters_leave_catalog_untouched() {
        let agg = aggregator(MockPlaces::default(), MockStructured::default());

        let mut filters = SearchFilters::for_location("Lagos");
        filters.min_rating = Some(4.9);
        filters.facility_type = Some("dentist".to_string());
        filters.limit = Some(1);
        let ids: Vec<String> = agg
            .search(&filters)
            .await
            .into_iter()
            .map(|f| f.place_id)
            .collect();
        assert_eq!(ids, vec!["lagos-1", "lagos-2", "lagos-3"]);
    }

    #[tokio::test]
    async fn test_filtered_out_results_fall_back_to_other_cities() {
        let mut results = HashMap::new();
        results.insert(
            "clinic Timbuktu".to_string(),
            vec![tagged("7", "Djingareyber Clinic", "clinic")],
        );
        let places = MockPlaces {
            results,
            ..MockPlaces::default()
        };
        let agg = aggregator(places, MockStructured::default());

        let mut filters = SearchFilters::for_location("Timbuktu");
        filters.facility_type = Some("dentist".to_string());
        let found = agg.search(&filters).await;

        assert!(!found.is_empty());
        assert!(found.len() <= 10);
        assert_eq!(found[0].place_id, "lagos-1");
    }

    #[test]
    fn test_min_rating_drops_unrated_only_when_positive() {
        let agg_catalog = FacilityCatalog::builtin();
        let mut unrated = agg_catalog.find("kano-1").cloned().unwrap();
        unrated.rating = None;

        let mut filters = SearchFilters::for_location("kano");
        filters.min_rating = Some(0.0);
        assert_eq!(apply_filters(vec![unrated.clone()], &filters).len(), 1);

        filters.min_rating = Some(1.0);
        assert!(apply_filters(vec![unrated], &filters).is_empty());
    }

    #[tokio::test]
    async fn test_details() {
        let agg = aggregator(MockPlaces::default(), MockStructured::default());

        assert_eq!(agg.details("abuja-2").await.unwrap().name, "Abuja Vision Center");
        assert_eq!(
            agg.details("9001").await.unwrap().name,
            "Ring Road Eye Clinic"
        );
        assert!(agg.details("unknown").await.is_none());
        assert!(agg.details("broken").await.is_none());
    }
}
