pub mod apiai;
pub mod models;

use crate::errors::RelayResult;
use async_trait::async_trait;

pub use apiai::ApiAiClient;
pub use models::{FulfillmentMessage, QueryRequest, QueryResponse, Status};

/// Request/response contract to a natural-language-understanding backend.
///
/// `session_id` threads conversational context on the backend side and must be
/// stable per end user. Implementations make exactly one attempt per call.
#[async_trait]
pub trait NluClient: Send + Sync {
    async fn query(&self, session_id: &str, utterances: &[String]) -> RelayResult<QueryResponse>;
}
