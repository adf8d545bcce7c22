pub mod aggregator;
pub mod catalog;
pub mod cities;
pub mod enquiry;
pub mod places;
pub mod retry;

pub use aggregator::FacilityAggregator;
pub use catalog::FacilityCatalog;
pub use cities::{CityRanker, PopularCities};
pub use enquiry::EnquiryDrafter;
pub use retry::RetryConfig;
