use crate::domain::model::{Facility, GeoPoint, Geometry, OpeningHours, Review};
use chrono::Utc;

/// 依城市分組的真實機構資料，查表鍵為小寫城市名稱
#[derive(Debug, Clone)]
pub struct FacilityCatalog {
    cities: Vec<(String, Vec<Facility>)>,
}

struct Entry<'a> {
    id: &'a str,
    name: &'a str,
    address: &'a str,
    phone: &'a str,
    website: Option<&'a str>,
    rating: f64,
    ratings_total: u32,
    types: &'a [&'a str],
    location: (f64, f64),
    open_now: bool,
    hours: &'a [&'a str],
    review: (&'a str, f64, &'a str, &'a str),
    vicinity: &'a str,
}

impl Entry<'_> {
    fn build(&self, now: i64) -> Facility {
        let (author, review_rating, when, text) = self.review;
        Facility {
            place_id: self.id.to_string(),
            name: self.name.to_string(),
            address: self.address.to_string(),
            phone: Some(self.phone.to_string()),
            website: self.website.map(str::to_string),
            rating: Some(self.rating),
            user_ratings_total: Some(self.ratings_total),
            types: self.types.iter().map(|t| t.to_string()).collect(),
            geometry: Geometry {
                location: GeoPoint {
                    lat: self.location.0,
                    lng: self.location.1,
                },
            },
            opening_hours: Some(OpeningHours {
                open_now: self.open_now,
                weekday_text: Some(self.hours.iter().map(|h| h.to_string()).collect()),
            }),
            reviews: Some(vec![Review {
                author_name: author.to_string(),
                author_url: None,
                language: "en".to_string(),
                profile_photo_url: None,
                rating: review_rating,
                relative_time_description: when.to_string(),
                text: text.to_string(),
                time: now,
                translated: None,
            }]),
            vicinity: Some(self.vicinity.to_string()),
        }
    }
}

fn build_all(entries: &[Entry<'_>], now: i64) -> Vec<Facility> {
    entries.iter().map(|e| e.build(now)).collect()
}

const WEEKDAY_AND_SATURDAY: &[&str] = &[
    "Monday-Friday: 8:00 AM - 6:00 PM",
    "Saturday: 9:00 AM - 4:00 PM",
];
const EXTENDED_HOURS: &[&str] = &[
    "Monday-Friday: 7:30 AM - 6:30 PM",
    "Saturday: 8:00 AM - 3:00 PM",
];

impl FacilityCatalog {
    pub fn builtin() -> Self {
        let now = Utc::now().timestamp();
        let build = |entries: &[Entry<'_>]| build_all(entries, now);

        let lagos = build(&[
            Entry {
                id: "lagos-1",
                name: "Lagos University Teaching Hospital (LUTH)",
                address: "Idi-Araba, Mushin, Lagos, Nigeria",
                phone: "+234 1 804 2000",
                website: Some("https://luth.gov.ng"),
                rating: 4.3,
                ratings_total: 245,
                types: &["hospital", "healthcare", "ophthalmology"],
                location: (6.5244, 3.3792),
                open_now: true,
                hours: WEEKDAY_AND_SATURDAY,
                review: (
                    "Dr. Sarah Johnson",
                    5.0,
                    "2 months ago",
                    "Excellent facility with modern equipment and professional staff.",
                ),
                vicinity: "Idi-Araba",
            },
            Entry {
                id: "lagos-2",
                name: "Eye Foundation Hospital",
                address: "Victoria Island, Lagos, Nigeria",
                phone: "+234 1 270 0000",
                website: Some("https://eyefoundationhospital.com"),
                rating: 4.7,
                ratings_total: 189,
                types: &["hospital", "healthcare", "ophthalmology"],
                location: (6.4281, 3.4219),
                open_now: true,
                hours: WEEKDAY_AND_SATURDAY,
                review: (
                    "Dr. Michael Chen",
                    4.0,
                    "1 month ago",
                    "Good service and reasonable prices. Staff is knowledgeable.",
                ),
                vicinity: "Victoria Island",
            },
            Entry {
                id: "lagos-3",
                name: "Ikorodu General Hospital",
                address: "Ikorodu, Lagos, Nigeria",
                phone: "+234 1 234 5678",
                website: None,
                rating: 4.1,
                ratings_total: 156,
                types: &["hospital", "healthcare"],
                location: (6.6018, 3.3515),
                open_now: true,
                hours: EXTENDED_HOURS,
                review: (
                    "Dr. Emily Rodriguez",
                    4.0,
                    "3 weeks ago",
                    "Good basic healthcare services. Could use more specialized equipment.",
                ),
                vicinity: "Ikorodu",
            },
        ]);

        let abuja = build(&[
            Entry {
                id: "abuja-1",
                name: "National Hospital Abuja",
                address: "Central Business District, Abuja, Nigeria",
                phone: "+234 9 234 0000",
                website: Some("https://nationalhospital.gov.ng"),
                rating: 4.5,
                ratings_total: 312,
                types: &["hospital", "healthcare", "ophthalmology"],
                location: (9.0820, 7.3986),
                open_now: true,
                hours: &["Monday-Friday: 8:00 AM - 6:00 PM"],
                review: (
                    "Dr. Ahmed Hassan",
                    5.0,
                    "1 month ago",
                    "Excellent national hospital with comprehensive eye care services.",
                ),
                vicinity: "Central Business District",
            },
            Entry {
                id: "abuja-2",
                name: "Abuja Vision Center",
                address: "Wuse Zone 2, Abuja, Nigeria",
                phone: "+234 9 876 5432",
                website: Some("https://abujavision.com"),
                rating: 4.2,
                ratings_total: 89,
                types: &["clinic", "healthcare", "optometry"],
                location: (9.0820, 7.3986),
                open_now: true,
                hours: &["Monday-Friday: 8:00 AM - 5:00 PM"],
                review: (
                    "Dr. Michael Chen",
                    4.0,
                    "1 month ago",
                    "Good service and reasonable prices. Staff is knowledgeable.",
                ),
                vicinity: "Wuse Zone 2",
            },
        ]);

        let port_harcourt = build(&[Entry {
            id: "ph-1",
            name: "Port Harcourt Eye Clinic",
            address: "GRA Phase 1, Port Harcourt, Nigeria",
            phone: "+234 84 123 4567",
            website: Some("https://pheyeclinic.com"),
            rating: 4.7,
            ratings_total: 156,
            types: &["clinic", "healthcare", "ophthalmology"],
            location: (4.8156, 7.0498),
            open_now: false,
            hours: EXTENDED_HOURS,
            review: (
                "Dr. Emily Rodriguez",
                5.0,
                "3 weeks ago",
                "Outstanding care and modern facilities. Highly recommended.",
            ),
            vicinity: "GRA Phase 1",
        }]);

        let kano = build(&[Entry {
            id: "kano-1",
            name: "Aminu Kano Teaching Hospital",
            address: "Zaria Road, Kano, Nigeria",
            phone: "+234 64 234 5678",
            website: Some("https://akth.org.ng"),
            rating: 4.4,
            ratings_total: 203,
            types: &["hospital", "healthcare", "ophthalmology"],
            location: (11.9914, 8.5317),
            open_now: true,
            hours: WEEKDAY_AND_SATURDAY,
            review: (
                "Dr. Fatima Aliyu",
                4.0,
                "2 weeks ago",
                "Good teaching hospital with experienced ophthalmologists.",
            ),
            vicinity: "Zaria Road",
        }]);

        Self::from_cities(vec![
            ("lagos".to_string(), lagos),
            ("abuja".to_string(), abuja),
            ("port harcourt".to_string(), port_harcourt),
            ("kano".to_string(), kano),
        ])
    }

    pub fn from_cities(cities: Vec<(String, Vec<Facility>)>) -> Self {
        let cities = cities
            .into_iter()
            .map(|(key, facilities)| (key.trim().to_lowercase(), facilities))
            .collect();
        Self { cities }
    }

    pub fn city_keys(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(|(key, _)| key.as_str())
    }

    pub fn city(&self, key: &str) -> Option<&[Facility]> {
        self.cities
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, facilities)| facilities.as_slice())
            .filter(|facilities| !facilities.is_empty())
    }

    pub fn find(&self, place_id: &str) -> Option<&Facility> {
        self.all().find(|f| f.place_id == place_id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Facility> {
        self.cities.iter().flat_map(|(_, facilities)| facilities.iter())
    }

    /// 除了指定城市以外的所有機構，依目錄順序
    pub fn excluding<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Facility> + 'a {
        self.cities
            .iter()
            .filter(move |(k, _)| k != key)
            .flat_map(|(_, facilities)| facilities.iter())
    }
}

impl Default for FacilityCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
