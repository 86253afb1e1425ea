use super::{OutputFormatter, display_name};
use anyhow::Result;
use checksumit_core::FileOutcome;
use colored::*;
use serde_json::{Value, json};

/// Text formatter, one `"{hex} - {file} ({algorithm})"` line per digest
///
/// With more than one digest per file, files are separated by a blank line.
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_batch(&self, outcomes: &[FileOutcome]) -> Result<String> {
        let mut blocks = Vec::new();
        let mut separate = false;

        for outcome in outcomes {
            let Ok(digests) = &outcome.result else {
                continue;
            };
            separate |= digests.len() > 1;

            let file = display_name(&outcome.name);
            let block: Vec<String> = digests
                .entries
                .iter()
                .map(|entry| {
                    format!(
                        "{} - {} ({})",
                        self.colorize(&entry.hex, |s| s.cyan()),
                        file,
                        self.colorize(entry.algorithm.name(), |s| s.yellow())
                    )
                })
                .collect();

            if !block.is_empty() {
                blocks.push(block.join("\n"));
            }
        }

        let separator = if separate { "\n\n" } else { "\n" };
        let mut output = blocks.join(separator);
        if !output.is_empty() {
            output.push('\n');
        }
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn outcome_to_value(outcome: &FileOutcome) -> Value {
        match &outcome.result {
            Ok(digests) => json!({
                "file": outcome.name,
                "size": digests.input_size,
                "mode": digests.mode,
                "processing_time_ms": digests.duration.as_millis(),
                "digests": digests.entries,
            }),
            Err(e) => json!({
                "file": outcome.name,
                "error": e.to_string(),
            }),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_batch(&self, outcomes: &[FileOutcome]) -> Result<String> {
        let values: Vec<Value> = outcomes.iter().map(Self::outcome_to_value).collect();

        let mut output = if self.pretty {
            serde_json::to_string_pretty(&values)?
        } else {
            serde_json::to_string(&values)?
        };
        output.push('\n');
        Ok(output)
    }
}

/// CSV formatter, one record per digest of each successful file
#[derive(Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn get_headers() -> [&'static str; 5] {
        ["file", "algorithm", "hash", "size", "mode"]
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_batch(&self, outcomes: &[FileOutcome]) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(Self::get_headers())?;

        for outcome in outcomes {
            let Ok(digests) = &outcome.result else {
                continue;
            };
            let size = digests.input_size.to_string();
            let mode = digests.mode.to_string();
            for entry in &digests.entries {
                wtr.write_record([
                    outcome.name.as_str(),
                    entry.algorithm.name(),
                    entry.hex.as_str(),
                    size.as_str(),
                    mode.as_str(),
                ])?;
            }
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}
