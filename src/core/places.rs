use crate::domain::model::{Facility, GeoPoint, Geometry, OpeningHours, TaggedPlace};
use std::collections::HashSet;

const MEDICAL_AMENITIES: &[&str] = &["hospital", "clinic", "doctors", "pharmacy"];
const ADDRESS_AMENITY_KEYWORDS: &[&str] = &["hospital", "clinic", "medical"];
const NAME_KEYWORDS: &[&str] = &[
    "hospital",
    "clinic",
    "medical",
    "health",
    "eye",
    "ophthalmology",
    "optometry",
    "vision",
];
const DISPLAY_NAME_KEYWORDS: &[&str] = &["hospital", "clinic", "medical", "health"];
const ADDRESS_ORDER: &[&str] = &[
    "house_number",
    "road",
    "suburb",
    "city",
    "state",
    "postcode",
    "country",
];

pub const UNKNOWN_FACILITY: &str = "Unknown Facility";

/// 標籤或名稱任一符合醫療關鍵字即保留
pub fn is_medical(place: &TaggedPlace) -> bool {
    let tagged_medical = place
        .tag("amenity")
        .map(|a| MEDICAL_AMENITIES.contains(&a))
        .unwrap_or(false)
        || place.tag("healthcare").is_some()
        || place.tag("medical_system").is_some();

    let address_medical = place
        .address_part("amenity")
        .map(|a| contains_any(&a.to_lowercase(), ADDRESS_AMENITY_KEYWORDS))
        .unwrap_or(false);

    let name = place.name.as_deref().unwrap_or_default().to_lowercase();
    let display_name = place
        .display_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();

    tagged_medical
        || address_medical
        || contains_any(&name, NAME_KEYWORDS)
        || contains_any(&display_name, DISPLAY_NAME_KEYWORDS)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// 依 provider id 去重，保留第一次出現的順序；沒有 id 的一律保留
pub fn dedupe_by_provider_id(places: Vec<TaggedPlace>) -> Vec<TaggedPlace> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|p| match &p.provider_id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

pub fn format_address(place: &TaggedPlace) -> String {
    ADDRESS_ORDER
        .iter()
        .filter_map(|key| place.address_part(key))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn extract_types(place: &TaggedPlace) -> Vec<String> {
    let mut types: Vec<String> = [
        place.tag("amenity"),
        place.tag("healthcare"),
        place.tag("speciality"),
        place.address_part("amenity"),
    ]
    .into_iter()
    .flatten()
    .map(str::to_string)
    .collect();

    if matches!(place.tag("amenity"), Some("hospital") | Some("clinic")) {
        types.push("healthcare".to_string());
    }

    types
}

/// opening_hours 標籤的粗略判斷，不解析完整語法
pub fn open_now_hint(hours: &str) -> bool {
    let normalized = hours.to_lowercase();
    if normalized.contains("24/7") {
        return true;
    }
    !(normalized.contains("closed") || normalized.contains(" off"))
}

pub fn extract_opening_hours(place: &TaggedPlace) -> Option<OpeningHours> {
    place.tag("opening_hours").map(|hours| OpeningHours {
        open_now: open_now_hint(hours),
        weekday_text: Some(vec![hours.to_string()]),
    })
}

pub fn to_facility(place: TaggedPlace) -> Facility {
    let place_id = place
        .provider_id
        .clone()
        .unwrap_or_else(|| format!("osm-{}", rand::random::<u32>()));

    let name = place
        .name
        .clone()
        .or_else(|| {
            place
                .display_name
                .as_deref()
                .and_then(|d| d.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
        .unwrap_or_else(|| UNKNOWN_FACILITY.to_string());

    let address = place
        .display_name
        .clone()
        .unwrap_or_else(|| format_address(&place));

    let phone = place
        .tag("phone")
        .or_else(|| place.tag("contact:phone"))
        .map(str::to_string);
    let website = place
        .tag("website")
        .or_else(|| place.tag("contact:website"))
        .map(str::to_string);

    let vicinity = place
        .address_part("suburb")
        .or_else(|| place.address_part("city"))
        .or_else(|| place.address_part("town"))
        .map(str::to_string);

    Facility {
        place_id,
        name,
        address,
        phone,
        website,
        rating: None,
        user_ratings_total: None,
        types: extract_types(&place),
        geometry: Geometry {
            location: GeoPoint {
                lat: place.lat,
                lng: place.lng,
            },
        },
        opening_hours: extract_opening_hours(&place),
        reviews: None,
        vicinity,
    }
}
