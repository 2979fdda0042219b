use super::{parse_response, FrequencySource};
use crate::config::LookupConfig;
use crate::error::{AnnotateError, Result};
use crate::types::{CompositeKey, LookupResult};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Client for the ExAC bulk variant endpoint.
///
/// Posts a JSON array of `CHROM-POS-REF-ALT` keys and reads back an object
/// keyed by the same strings.
pub struct ExacClient {
    client: reqwest::Client,
    url: String,
    chunk_size: usize,
}

impl ExacClient {
    pub fn new(url: impl Into<String>, timeout: Duration, chunk_size: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnnotateError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
            chunk_size,
        })
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        Self::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_seconds),
            config.chunk_size,
        )
    }

    async fn post_chunk(&self, keys: &[CompositeKey]) -> Result<LookupResult> {
        let body = serde_json::to_string(keys)?;
        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AnnotateError::lookup(format!(
                "{} responded with status {}",
                self.url,
                status.as_u16()
            )));
        }

        let text = resp.text().await?;
        parse_response(&text, keys)
    }
}

#[async_trait]
impl FrequencySource for ExacClient {
    #[instrument(skip(self, keys), fields(url = %self.url, keys = keys.len()))]
    async fn lookup(&self, keys: &[CompositeKey]) -> Result<LookupResult> {
        let mut result = LookupResult::with_capacity(keys.len());
        if keys.is_empty() {
            return Ok(result);
        }

        let chunk_size = if self.chunk_size == 0 {
            keys.len()
        } else {
            self.chunk_size
        };
        let chunks = keys.len().div_ceil(chunk_size);
        info!("Querying allele frequencies for {} keys in {} request(s)", keys.len(), chunks);

        let started = std::time::Instant::now();
        for (i, chunk) in keys.chunks(chunk_size).enumerate() {
            debug!("Posting chunk {}/{} ({} keys)", i + 1, chunks, chunk.len());
            result.extend(self.post_chunk(chunk).await?);
            counter!("var_annot_lookup_requests_total").increment(1);
        }
        histogram!("var_annot_lookup_duration_seconds").record(started.elapsed().as_secs_f64());
        counter!("var_annot_lookup_keys_total").increment(keys.len() as u64);

        Ok(result)
    }
}
