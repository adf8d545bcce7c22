// Adapters layer: reqwest implementations of the provider ports in domain::ports.

pub mod gemini;
pub mod http;
pub mod nominatim;
pub mod overpass;
pub mod wikidata;

pub use gemini::GeminiClient;
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;
pub use wikidata::WikidataClient;
