use crate::adapters::http::{build_client, handle_response};
use crate::config::toml_config::WikidataConfig;
use crate::domain::ports::{KnowledgeGraph, SparqlBinding};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "Wikidata";

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, SparqlTerm>>,
}

#[derive(Debug, Deserialize)]
struct SparqlTerm {
    #[serde(default)]
    value: Option<String>,
}

pub struct WikidataClient {
    client: Client,
    config: WikidataConfig,
}

impl WikidataClient {
    pub fn new(config: WikidataConfig, user_agent: &str) -> Result<Self> {
        Ok(Self {
            client: build_client(user_agent)?,
            config,
        })
    }
}

#[async_trait]
impl KnowledgeGraph for WikidataClient {
    async fn select(&self, sparql: &str) -> Result<Vec<SparqlBinding>> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("format", "json"), ("query", sparql)])
            .header("Accept", "application/sparql-results+json")
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await?;

        let body: SparqlResponse = handle_response(response, PROVIDER).await?;

        Ok(body
            .results
            .bindings
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .filter_map(|(var, term)| term.value.map(|v| (var, v)))
                    .collect()
            })
            .collect())
    }
}
