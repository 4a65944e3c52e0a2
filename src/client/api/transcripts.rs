//! Transcripts API trait

use async_trait::async_trait;

use crate::client::fetcher::Fetch;
use crate::client::models::Transcript;
use crate::client::{ApiClient, FetchOptions, Resource, Transport};
use crate::error::Result;

/// Transcript retrieval
#[async_trait]
pub trait TranscriptsApi: Send + Sync {
    /// Get the transcript for a call.
    ///
    /// Returns `Fetch::Pending` while transcription is still running.
    async fn get_transcript(&self, call_id: i64, options: FetchOptions) -> Result<Fetch<Transcript>>;
}

#[async_trait]
impl<T: Transport> TranscriptsApi for ApiClient<T> {
    async fn get_transcript(&self, call_id: i64, options: FetchOptions) -> Result<Fetch<Transcript>> {
        let resource = Resource::get(format!("/transcripts/call/{}", call_id));
        self.fetch_as(&resource, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::transcript_json;
    use crate::client::{MockResponse, MockTransport};
    use reqwest::Method;

    #[tokio::test]
    async fn test_transcript_pending_then_ready() {
        let mock = MockTransport::new()
            .on(Method::GET, "/transcripts/call/3", MockResponse::pending())
            .on(Method::GET, "/transcripts/call/3", MockResponse::ok(transcript_json(3)));
        let client = ApiClient::new(mock);

        let first = client.get_transcript(3, FetchOptions::default()).await.unwrap();
        let second = client.get_transcript(3, FetchOptions::default()).await.unwrap();

        assert!(first.is_pending());
        let transcript = second.ready().unwrap();
        assert_eq!(transcript.call_id, 3);
        assert!(transcript.text.contains("proposal"));
    }
}
