//! Table output formatting

use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Columns, object::Rows},
};

/// Format rows as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format one record as aligned `label  value` lines.
pub fn format_record(fields: &[(&str, String)]) -> String {
    let mut builder = Builder::default();
    for (label, value) in fields {
        builder.push_record([label.to_string(), value.clone()]);
    }

    let mut table = builder.build();
    table
        .with(Style::blank())
        .with(Modify::new(Columns::first()).with(Alignment::right()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Tabled)]
    struct CallRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "FILE")]
        filename: String,
    }

    #[test]
    fn test_format_table_empty() {
        let rows: Vec<CallRow> = vec![];
        assert_eq!(format_table(&rows), "No results found.");
    }

    #[test]
    fn test_format_table_rows_and_headers() {
        let rows = vec![
            CallRow {
                id: 1,
                filename: "intro-call.mp3".to_string(),
            },
            CallRow {
                id: 2,
                filename: "follow-up.wav".to_string(),
            },
        ];

        let result = format_table(&rows);

        assert!(result.contains("FILE"));
        assert!(result.contains("intro-call.mp3"));
        assert!(result.contains("follow-up.wav"));
        // Rounded style corners
        assert!(result.contains('╭'));
        assert!(result.contains('╰'));
    }

    #[test]
    fn test_format_record() {
        let result = format_record(&[
            ("Status", "PROCESSED".to_string()),
            ("Duration", "5:12".to_string()),
        ]);

        let lines: Vec<&str> = result.lines().filter(|l| !l.trim().is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Status") && lines[0].contains("PROCESSED"));
        assert!(!result.contains('╭'));
    }
}
