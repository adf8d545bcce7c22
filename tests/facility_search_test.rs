use anyhow::Result;
use eyecare_scout::adapters::{NominatimClient, OverpassClient};
use eyecare_scout::config::toml_config::{NominatimConfig, OverpassConfig, SearchConfig};
use eyecare_scout::core::aggregator::SEARCH_TERMS;
use eyecare_scout::domain::model::SearchFilters;
use eyecare_scout::{FacilityAggregator, FacilityCatalog};
use httpmock::prelude::*;
use serde_json::{json, Value};

fn aggregator(server: &MockServer) -> Result<FacilityAggregator<NominatimClient, OverpassClient>> {
    let nominatim = NominatimConfig {
        endpoint: server.base_url(),
        ..NominatimConfig::default()
    };
    let overpass = OverpassConfig {
        endpoint: server.url("/api/interpreter"),
        ..OverpassConfig::default()
    };

    Ok(FacilityAggregator::new(
        NominatimClient::new(nominatim, "eyecare-scout-tests")?,
        OverpassClient::new(overpass, "eyecare-scout-tests")?,
        FacilityCatalog::builtin(),
        SearchConfig::default(),
    ))
}

fn search_result(place_id: u64, name: &str, extratags: Value) -> Value {
    json!({
        "place_id": place_id,
        "osm_id": place_id + 1000,
        "lat": "7.3775",
        "lon": "3.9470",
        "name": name,
        "display_name": format!("{}, Ibadan, Oyo State, Nigeria", name),
        "address": {"city": "Ibadan", "country": "Nigeria"},
        "extratags": extratags,
        "namedetails": {"name": name}
    })
}

/// 每個關鍵字各自一個 mock，避免多個 mock 同時符合
async fn mock_text_search(server: &MockServer, location: &str, mut bodies: Vec<(&str, Value)>) {
    for term in SEARCH_TERMS {
        let found = bodies.iter().position(|(t, _)| t == term);
        let body = match found {
            Some(i) => bodies.remove(i).1,
            None => json!([]),
        };
        let query = format!("{} {}", term, location);

        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", query.as_str())
                    .query_param("limit", "10");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(body);
            })
            .await;
    }
}

#[tokio::test]
async fn test_catalog_city_skips_providers() -> Result<()> {
    let server = MockServer::start_async().await;
    let search_mock = server
        .mock_async(|when, then| {
            when.path("/search");
            then.status(200).json_body(json!([]));
        })
        .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Abuja, Nigeria"))
        .await;

    let ids: Vec<&str> = facilities.iter().map(|f| f.place_id.as_str()).collect();
    assert_eq!(ids, vec!["abuja-1", "abuja-2"]);
    search_mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_text_search_is_deduplicated_and_filtered() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_text_search(
        &server,
        "Ibadan",
        vec![
            (
                "hospital",
                json!([
                    search_result(1, "University College Hospital", json!({"amenity": "hospital"})),
                    search_result(2, "Dugbe Market", json!({"shop": "mall"})),
                ]),
            ),
            (
                "eye",
                json!([
                    search_result(1, "University College Hospital", json!({"amenity": "hospital"})),
                    search_result(3, "Bright Vision Centre", json!([])),
                ]),
            ),
        ],
    )
    .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Ibadan"))
        .await;

    let ids: Vec<&str> = facilities.iter().map(|f| f.place_id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
    assert_eq!(facilities[0].name, "University College Hospital");
    assert_eq!(facilities[0].types, vec!["hospital", "healthcare"]);
    assert_eq!(facilities[0].vicinity.as_deref(), Some("Ibadan"));
    assert!(facilities[0].rating.is_none());
    Ok(())
}

#[tokio::test]
async fn test_text_search_is_capped_at_twenty() -> Result<()> {
    let server = MockServer::start_async().await;
    let page = |offset: u64| {
        Value::Array(
            (0..10)
                .map(|i| search_result(offset + i, &format!("Clinic {}", offset + i), json!({"amenity": "clinic"})))
                .collect(),
        )
    };
    mock_text_search(
        &server,
        "Ibadan",
        vec![("hospital", page(0)), ("clinic", page(100)), ("medical", page(200))],
    )
    .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Ibadan"))
        .await;

    assert_eq!(facilities.len(), 20);
    assert_eq!(facilities[0].place_id, "0");
    assert_eq!(facilities[19].place_id, "109");
    Ok(())
}

#[tokio::test]
async fn test_structured_search_when_text_search_is_empty() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_text_search(&server, "Ibadan", vec![]).await;

    let geocode = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("q", "Ibadan")
                .query_param("limit", "1");
            then.status(200).json_body(json!([
                {"place_id": 77, "lat": "7.3775", "lon": "3.9470", "display_name": "Ibadan, Nigeria"}
            ]));
        })
        .await;

    let overpass = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/interpreter")
                .body_contains("data=");
            then.status(200).json_body(json!({
                "elements": [
                    {"type": "node", "id": 42, "lat": 7.38, "lon": 3.94,
                     "tags": {"amenity": "hospital", "name": "Oyo State Hospital", "addr:city": "Ibadan",
                              "opening_hours": "24/7", "contact:website": "https://oyostatehospital.ng"}},
                    {"type": "way", "id": 43, "center": {"lat": 7.39, "lon": 3.95}}
                ]
            }));
        })
        .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Ibadan"))
        .await;

    geocode.assert_async().await;
    overpass.assert_async().await;
    assert_eq!(facilities.len(), 1);

    let hospital = &facilities[0];
    assert_eq!(hospital.place_id, "42");
    assert_eq!(hospital.name, "Oyo State Hospital");
    assert_eq!(hospital.address, "Ibadan");
    assert_eq!(hospital.website.as_deref(), Some("https://oyostatehospital.ng"));
    assert!(hospital.opening_hours.as_ref().map(|h| h.open_now).unwrap_or(false));
    Ok(())
}

#[tokio::test]
async fn test_unknown_location_falls_back_to_other_cities() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!([]));
        })
        .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Atlantis"))
        .await;

    assert!(!facilities.is_empty());
    assert!(facilities.len() <= 10);
    assert!(facilities.iter().all(|f| f.rating.is_some()));
    Ok(())
}

#[tokio::test]
async fn test_failing_provider_returns_catalog_fallback() -> Result<()> {
    let server = MockServer::start_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(500).body("upstream exploded");
        })
        .await;

    let facilities = aggregator(&server)?
        .search(&SearchFilters::for_location("Ibadan"))
        .await;

    failing.assert_hits_async(SEARCH_TERMS.len()).await;
    let ids: Vec<&str> = facilities.iter().map(|f| f.place_id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"lagos-1"));
    assert_eq!(ids.len(), 7);
    Ok(())
}

#[tokio::test]
async fn test_details_from_provider() -> Result<()> {
    let server = MockServer::start_async().await;
    let details = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/details")
                .query_param("place_id", "555");
            then.status(200).json_body(json!({
                "place_id": 555,
                "localname": "Ring Road Eye Clinic",
                "category": "amenity",
                "type": "clinic",
                "addresstags": {"street": "Ring Road", "city": "Ibadan"},
                "extratags": {"phone": "+234 800 000 0000"},
                "centroid": {"type": "Point", "coordinates": [3.88, 7.36]}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/details")
                .query_param("place_id", "404404");
            then.status(404).json_body(json!({"error": "not found"}));
        })
        .await;

    let aggregator = aggregator(&server)?;

    let facility = aggregator.details("555").await.expect("provider facility");
    details.assert_async().await;
    assert_eq!(facility.name, "Ring Road Eye Clinic");
    assert_eq!(facility.address, "Ring Road, Ibadan");
    assert_eq!(facility.phone.as_deref(), Some("+234 800 000 0000"));
    assert!(facility.has_type("clinic"));
    assert!((facility.geometry.location.lat - 7.36).abs() < 1e-9);

    assert!(aggregator.details("404404").await.is_none());
    assert_eq!(
        aggregator.details("kano-1").await.map(|f| f.name),
        Some("Aminu Kano Teaching Hospital".to_string())
    );
    Ok(())
}
