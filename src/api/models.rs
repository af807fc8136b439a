use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tracker::{RankQuery, RankResult};

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub domain: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl TrackRequest {
    pub fn into_query(self, default_host: &str) -> Result<RankQuery> {
        RankQuery::new(
            &self.domain,
            &self.keywords,
            self.location.as_deref(),
            default_host,
        )
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub domain: String,
    pub location: String,
    pub results: Vec<RankResult>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
