//! IDT SciTools Plus CRISPR endpoints

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::models::{self, CustomDesignRequest, PredesignRequest, SequenceCheckRequest};
use crate::application::errors::VendorError;
use crate::domain::entities::{AccessToken, GuideSet, Species};
use crate::domain::traits::{CrisprVendor, VendorResult};
use crate::infrastructure::config::IdtConfig;

const CUSTOM_DESIGN: &str = "CRISPRCustom";
const SEQUENCE_CHECKER: &str = "CRISPRSequenceChecker";
const PREDESIGN: &str = "CRISPRPredesign";

/// IDT CRISPR design client
pub struct IdtClient {
    http: Client,
    config: IdtConfig,
}

impl IdtClient {
    pub fn new(http: Client, config: IdtConfig) -> Self {
        Self { http, config }
    }

    /// POST a JSON body to a design endpoint and return the raw payload
    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, token: &AccessToken, body: &B) -> VendorResult<Value> {
        let url = self.config.endpoint_url(endpoint);
        tracing::debug!("IDT POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.secret())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| VendorError::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = VendorError::from_status(status.as_u16(), body);
            tracing::warn!("IDT {} failed: {}", endpoint, err);
            return Err(err);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| VendorError::from_reqwest(&e))
    }
}

#[async_trait]
impl CrisprVendor for IdtClient {
    fn name(&self) -> &str {
        "idt"
    }

    async fn design_guides(&self, token: &AccessToken, sequence: &str, species: Species) -> VendorResult<GuideSet> {
        tracing::info!("IDT custom gRNA design: species={}, seq_length={}", species, sequence.len());
        let body = CustomDesignRequest::fasta(sequence, species.as_str(), self.config.result_count);
        let payload = self.post(CUSTOM_DESIGN, token, &body).await?;
        Ok(models::project_guides(&payload))
    }

    async fn check_sequence(&self, token: &AccessToken, protospacer: &str, species: Species) -> VendorResult<GuideSet> {
        tracing::info!("IDT gRNA checker: species={}, sequence={}", species, protospacer);
        let body = SequenceCheckRequest {
            species: species.as_str(),
            sequences: vec![protospacer],
        };
        let payload = self.post(SEQUENCE_CHECKER, token, &body).await?;
        Ok(models::project_check(&payload))
    }

    async fn lookup_predesigned(&self, token: &AccessToken, gene_symbol: &str, species: Species) -> VendorResult<GuideSet> {
        tracing::info!("IDT predesigned gRNA lookup: gene={}, species={}", gene_symbol, species);
        let body = PredesignRequest {
            species: species.as_str(),
            gene_symbol_or_accession: gene_symbol,
            result_count: self.config.result_count,
        };
        let payload = self.post(PREDESIGN, token, &body).await?;
        Ok(models::project_guides(&payload))
    }
}
