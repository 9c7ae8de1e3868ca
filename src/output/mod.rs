use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::AnalysisResult;

/// JSON envelope wrapping an analysis result with generation metadata.
#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

/// Save analysis result to file
pub async fn save_to_file(
    result: &AnalysisResult,
    path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let content = render(result, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print analysis result to console
pub fn print_to_console(result: &AnalysisResult, format: &OutputFormat) -> Result<()> {
    println!("{}", render(result, format)?);
    Ok(())
}

/// Save raw transcript text to file
pub async fn save_text(text: &str, path: &Path) -> Result<()> {
    fs_err::write(path, text)?;
    Ok(())
}

fn render(result: &AnalysisResult, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(result)),
        OutputFormat::Json => format_as_json(result),
    }
}

fn format_as_text(result: &AnalysisResult) -> String {
    let mut output = String::new();
    output.push_str(&result.summary);
    output.push('\n');

    for (index, place) in result.places.iter().enumerate() {
        let _ = write!(output, "\n{}. {} [{}]\n", index + 1, place.name, place.kind);

        if place.coordinates.lat == 0.0 && place.coordinates.lng == 0.0 {
            output.push_str("   Location: unknown\n");
        } else {
            let _ = writeln!(
                output,
                "   Location: {}, {}",
                place.coordinates.lat, place.coordinates.lng
            );
        }

        if let Some(address) = &place.address {
            let _ = writeln!(output, "   Address: {}", address);
        }

        if let Some(photos) = &place.photos {
            if !photos.is_empty() {
                let _ = writeln!(output, "   Photos: {}", photos.len());
            }
        }

        if !place.description.is_empty() {
            let _ = writeln!(output, "   {}", place.description);
        }
    }

    output
}

fn format_as_json(result: &AnalysisResult) -> Result<String> {
    let report = AnalysisReport {
        generated_at: Utc::now(),
        result,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
