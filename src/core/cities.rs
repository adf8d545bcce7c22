use crate::domain::model::CityRanking;
use crate::domain::ports::{KnowledgeGraph, LanguageModel};
use crate::utils::error::{Result, ScoutError};
use std::collections::HashSet;

pub const MAX_CITIES: usize = 20;
const CITY_QUERY_LIMIT: usize = 50;

/// 以 ISO 3166-1 alpha-2 國碼查詢該國人口最多的城市
pub struct PopularCities<K: KnowledgeGraph> {
    graph: K,
}

impl<K: KnowledgeGraph> PopularCities<K> {
    pub fn new(graph: K) -> Self {
        Self { graph }
    }

    pub async fn for_country(&self, country_code: &str) -> Result<Vec<String>> {
        let iso_code = normalize_iso_code(country_code)?;

        let rows = self.graph.select(&country_lookup_query(&iso_code)).await?;
        let qid = rows
            .first()
            .and_then(|row| row.get("country"))
            .and_then(|uri| entity_id(uri))
            .ok_or_else(|| ScoutError::ValidationError {
                message: format!("Could not resolve country from ISO code: {}", iso_code),
            })?;

        tracing::debug!("Resolved {} to Wikidata entity {}", iso_code, qid);

        let rows = self.graph.select(&cities_query(&qid)).await?;
        let cities = unique_labels(rows.iter().filter_map(|row| row.get("cityLabel")));

        tracing::info!("🏙️ Found {} popular cities for {}", cities.len(), iso_code);
        Ok(cities)
    }
}

fn normalize_iso_code(country_code: &str) -> Result<String> {
    let code = country_code.trim().to_uppercase();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ScoutError::ValidationError {
            message: format!("Could not resolve country from ISO code: {}", code),
        });
    }
    Ok(code)
}

pub fn country_lookup_query(iso_code: &str) -> String {
    format!(
        "SELECT ?country WHERE {{\n  ?country wdt:P297 \"{}\" .\n}}\nLIMIT 1",
        iso_code
    )
}

pub fn cities_query(country_qid: &str) -> String {
    format!(
        "SELECT ?city ?cityLabel (MAX(?population) AS ?maxPopulation) WHERE {{\n  \
         ?city wdt:P31/wdt:P279* wd:Q515;\n        \
         wdt:P17 wd:{qid};\n        \
         wdt:P1082 ?population.\n  \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\". }}\n\
         }}\n\
         GROUP BY ?city ?cityLabel\n\
         ORDER BY DESC(?maxPopulation)\n\
         LIMIT {limit}",
        qid = country_qid,
        limit = CITY_QUERY_LIMIT
    )
}

/// `http://www.wikidata.org/entity/Q1033` -> `Q1033`
pub fn entity_id(uri: &str) -> Option<String> {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

fn unique_labels<'a>(labels: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_string()))
        .take(MAX_CITIES)
        .map(str::to_string)
        .collect()
}

/// 請語言模型依熱門程度排序城市
pub struct CityRanker<L: LanguageModel> {
    model: L,
    model_name: String,
}

impl<L: LanguageModel> CityRanker<L> {
    pub fn new(model: L, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    pub async fn rank(&self, cities: &[String]) -> Result<CityRanking> {
        let cities: Vec<&str> = cities
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .collect();
        if cities.is_empty() {
            return Err(ScoutError::ValidationError {
                message: "No cities provided".to_string(),
            });
        }

        let raw = match self.model.generate(&self.model_name, &ranking_prompt(&cities)).await {
            Ok(text) => text,
            // 空白回覆仍回傳 200，只是沒有排序結果
            Err(ScoutError::UpstreamResponseError { .. }) => String::new(),
            Err(e) => return Err(e),
        };

        Ok(CityRanking {
            ranked_cities: parse_ranking(&raw),
            raw,
        })
    }
}

pub fn ranking_prompt(cities: &[&str]) -> String {
    format!(
        "Rank the following cities by popularity for both travelers and locals (not just by population). \
         Return the top 8 as a JSON array, most popular first.\nCities: {}",
        cities.join(", ")
    )
}

/// 取第一個 `[` 到最後一個 `]` 之間的文字當成 JSON 字串陣列
pub fn parse_ranking(text: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }

    serde_json::from_str(&text[start..=end]).unwrap_or_else(|e| {
        tracing::debug!("Ranking reply is not a JSON string array: {}", e);
        Vec::new()
    })
}
