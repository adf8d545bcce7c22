use crate::adapters::{GeminiClient, NominatimClient, OverpassClient, WikidataClient};
use crate::config::ServiceConfig;
use crate::core::{
    CityRanker, EnquiryDrafter, FacilityAggregator, FacilityCatalog, PopularCities, RetryConfig,
};
use crate::utils::error::Result;

pub type Aggregator = FacilityAggregator<NominatimClient, OverpassClient>;

/// 所有 worker 共用的唯讀狀態
pub struct AppState {
    pub facilities: Aggregator,
    pub enquiries: EnquiryDrafter<GeminiClient>,
    pub cities: PopularCities<WikidataClient>,
    pub ranker: CityRanker<GeminiClient>,
}

impl AppState {
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let providers = &config.providers;
        let user_agent = providers.user_agent.as_str();

        if !config.gemini_key_configured() {
            tracing::warn!("Gemini API key is not configured; enquiries will use the template letter");
        }

        let facilities = FacilityAggregator::new(
            NominatimClient::new(providers.nominatim.clone(), user_agent)?,
            OverpassClient::new(providers.overpass.clone(), user_agent)?,
            FacilityCatalog::builtin(),
            config.search.clone(),
        );

        let enquiries = EnquiryDrafter::new(
            GeminiClient::new(providers.gemini.clone(), user_agent)?,
            providers.gemini.enquiry_model.clone(),
            RetryConfig::from(&providers.gemini),
        );

        let cities = PopularCities::new(WikidataClient::new(providers.wikidata.clone(), user_agent)?);

        let ranker = CityRanker::new(
            GeminiClient::new(providers.gemini.clone(), user_agent)?,
            providers.gemini.ranking_model.clone(),
        );

        Ok(Self {
            facilities,
            enquiries,
            cities,
            ranker,
        })
    }
}
