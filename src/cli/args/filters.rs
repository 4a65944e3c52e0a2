//! Filter argument types for CLI commands

use clap::Args;

use crate::client::models::{CallStatus, UploadMethod};

/// Filter arguments for `call list`.
#[derive(Args, Debug, Default, Clone)]
pub struct CallFilterArgs {
    /// Filter by status (processing, processed, failed)
    #[arg(long, short = 's')]
    pub status: Option<CallStatus>,

    /// Filter by sales rep name
    #[arg(long)]
    pub rep: Option<String>,

    /// Filter by upload method (manual, s3_auto)
    #[arg(long)]
    pub upload_method: Option<UploadMethod>,

    /// Search filename or call id
    #[arg(long, short = 'q')]
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        filters: CallFilterArgs,
    }

    #[test]
    fn test_parse_filters_case_insensitive() {
        let parsed = Harness::try_parse_from([
            "test",
            "--status",
            "processed",
            "--upload-method",
            "s3",
            "-q",
            "acme",
        ])
        .unwrap();

        assert_eq!(parsed.filters.status, Some(CallStatus::Processed));
        assert_eq!(parsed.filters.upload_method, Some(UploadMethod::S3Auto));
        assert_eq!(parsed.filters.search.as_deref(), Some("acme"));
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        assert!(Harness::try_parse_from(["test", "--status", "done"]).is_err());
    }
}
