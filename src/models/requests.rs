use serde::{Deserialize, Serialize};

/// Body of the compare endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub urls: Vec<String>,
    /// Accepted when the `secret` query parameter is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Query string of the compare endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareQuery {
    pub secret: Option<String>,
}

impl ComparisonRequest {
    /// Secret to check, preferring the query parameter over the body field
    pub fn effective_secret<'a>(&'a self, query: &'a CompareQuery) -> Option<&'a str> {
        query.secret.as_deref().or(self.secret.as_deref())
    }
}
