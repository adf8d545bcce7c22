pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::ServiceConfig;
pub use crate::core::{EnquiryDrafter, FacilityAggregator, FacilityCatalog};
pub use crate::utils::error::{Result, ScoutError};
