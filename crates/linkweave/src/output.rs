//! Output formatting for command reports
//!
//! Every report serializes to JSON and also knows how to render itself for a
//! terminal, either with labels and icons (`human`) or one record per line
//! (`text`) for piping into other tools.

use linkweave_core::{Result, to_json_string};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output format preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable format with labels and icons
    #[default]
    Human,
    /// Plain text, one record per line
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Unknown output format '{}'. Valid options: json, human, text",
                s
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Terminal renderings of a report
pub trait Render {
    /// Labelled, multi-line output
    fn human(&self) -> String;

    /// Minimal output: the key facts, tab-separated where there are several
    fn text(&self) -> String;
}

/// Formatter for converting reports to different formats
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a report according to the output format preference
    pub fn format<T: Serialize + Render>(report: &T, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => to_json_string(report, "report"),
            OutputFormat::Human => Ok(report.human()),
            OutputFormat::Text => Ok(report.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
    }

    impl Render for Sample {
        fn human(&self) -> String {
            format!("📄 Name: {}", self.name)
        }

        fn text(&self) -> String {
            self.name.to_string()
        }
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("HUMAN".parse::<OutputFormat>().unwrap(), OutputFormat::Human);
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("invalid".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Human.to_string(), "human");
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }

    #[test]
    fn test_format_dispatch() {
        let sample = Sample { name: "demo" };
        let json = ReportFormatter::format(&sample, OutputFormat::Json).unwrap();
        assert!(json.contains("\"name\": \"demo\""));
        assert_eq!(
            ReportFormatter::format(&sample, OutputFormat::Human).unwrap(),
            "📄 Name: demo"
        );
        assert_eq!(ReportFormatter::format(&sample, OutputFormat::Text).unwrap(), "demo");
    }
}
