//! Call display models

use serde::Serialize;
use tabled::Tabled;

use crate::client::models::{Call, Transcript};
use crate::output::formatters::{format_duration_seconds, format_timestamp_local, or_dash, truncate};
use crate::output::table::format_record;

/// Call row for list output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CallDisplay {
    #[tabled(rename = "ID")]
    pub id: i64,

    #[tabled(rename = "FILE")]
    pub filename: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "REP")]
    pub sales_rep: String,

    #[tabled(rename = "DURATION")]
    pub duration: String,

    #[tabled(rename = "SCORE")]
    pub score: String,

    #[tabled(rename = "SENTIMENT")]
    pub sentiment: String,

    #[tabled(rename = "UPLOADED")]
    pub uploaded: String,
}

impl From<&Call> for CallDisplay {
    fn from(call: &Call) -> Self {
        Self {
            id: call.id,
            filename: truncate(&call.filename, 32),
            status: call.status.to_string(),
            sales_rep: or_dash(call.sales_rep_name.as_deref()),
            duration: format_duration_seconds(call.duration),
            score: or_dash(call.score),
            sentiment: or_dash(call.sentiment),
            uploaded: format_timestamp_local(call.upload_date.as_ref()),
        }
    }
}

impl From<Call> for CallDisplay {
    fn from(call: Call) -> Self {
        Self::from(&call)
    }
}

/// Pretty, multi-line view of one call.
pub struct CallSummary<'a>(pub &'a Call);

impl std::fmt::Display for CallSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let call = self.0;
        let language = match (&call.language, call.translate_to_english) {
            (Some(lang), true) => format!("{} (translated to English)", lang),
            (Some(lang), false) => lang.clone(),
            (None, _) => "auto-detect".to_string(),
        };

        let fields = [
            ("Call", format!("#{}", call.id)),
            ("File", call.filename.clone()),
            ("Status", call.status.to_string()),
            ("Sales rep", or_dash(call.sales_rep_name.as_deref())),
            ("Duration", format_duration_seconds(call.duration)),
            ("Score", or_dash(call.score)),
            ("Sentiment", or_dash(call.sentiment)),
            ("Language", language),
            ("Upload", or_dash(call.upload_method)),
            ("Uploaded", format_timestamp_local(call.upload_date.as_ref())),
        ];
        write!(f, "{}", format_record(&fields))
    }
}

/// Transcript header plus wrapped text.
pub struct TranscriptSummary<'a>(pub &'a Transcript);

impl std::fmt::Display for TranscriptSummary<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let transcript = self.0;
        writeln!(
            f,
            "Transcript for call #{} ({} words, created {})",
            transcript.call_id,
            transcript.word_count(),
            format_timestamp_local(transcript.created_at.as_ref()),
        )?;
        writeln!(f)?;
        write!(f, "{}", transcript.text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{CallBuilder, transcript_json};
    use crate::client::models::Sentiment;

    #[test]
    fn test_call_display_fills_missing_with_dashes() {
        let display = CallDisplay::from(CallBuilder::new(4).build());

        assert_eq!(display.id, 4);
        assert_eq!(display.status, "PROCESSING");
        assert_eq!(display.duration, "--");
        assert_eq!(display.score, "--");
        assert_eq!(display.sentiment, "--");
    }

    #[test]
    fn test_call_display_processed() {
        let call = CallBuilder::new(9)
            .processed()
            .duration(312)
            .score(81)
            .sentiment(Sentiment::Positive)
            .sales_rep("Dana")
            .build();

        let display = CallDisplay::from(&call);

        assert_eq!(display.duration, "5:12");
        assert_eq!(display.score, "81");
        assert_eq!(display.sentiment, "positive");
        assert_eq!(display.sales_rep, "Dana");
    }

    #[test]
    fn test_call_summary_lists_fields() {
        let call = CallBuilder::new(2).processed().duration(61).build();
        let text = CallSummary(&call).to_string();

        assert!(text.contains("#2"));
        assert!(text.contains("PROCESSED"));
        assert!(text.contains("1:01"));
    }

    #[test]
    fn test_transcript_summary_counts_words() {
        let transcript: Transcript = serde_json::from_value(transcript_json(5)).unwrap();
        let text = TranscriptSummary(&transcript).to_string();

        assert!(text.starts_with("Transcript for call #5"));
        assert!(text.contains(&format!("{} words", transcript.word_count())));
    }
}
