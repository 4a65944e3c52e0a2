//! Transcript models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::call::deserialize_timestamp;

/// Speech-to-text output for a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub call_id: i64,

    pub text: String,

    /// Diarization segments as produced by the transcription service
    #[serde(default)]
    pub speaker_labels: Option<Value>,

    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<NaiveDateTime>,
}

impl Transcript {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_deserializes() {
        let transcript: Transcript = serde_json::from_value(json!({
            "call_id": 7,
            "text": "Thanks for taking the time today.",
            "speaker_labels": [{"speaker": "A", "start": 0.0, "end": 2.1}],
            "created_at": "2025-03-14T09:30:00"
        }))
        .unwrap();

        assert_eq!(transcript.call_id, 7);
        assert_eq!(transcript.word_count(), 6);
        assert!(transcript.speaker_labels.is_some());
    }
}
