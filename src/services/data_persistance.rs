use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::domain::AnalysisReport;

const MAX_COMPANY_CHARS: usize = 50;
const MAX_LOCATION_CHARS: usize = 20;

/// Writes the combined analysis document into the output directory as
/// pretty JSON. The write is atomic (tmp file + rename) so a crashed run
/// never leaves a half-written report behind.
pub async fn save_report(
    output_dir: &str,
    company_name: &str,
    location: Option<&str>,
    report: &AnalysisReport,
) -> anyhow::Result<PathBuf> {
    let filename = report_filename(company_name, location, Utc::now());
    let path = Path::new(output_dir).join(filename);

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("failed to create output directory {}", output_dir))?;

    let bytes = serde_json::to_vec_pretty(report).context("failed to serialize report")?;

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp)
        .await
        .with_context(|| format!("failed to create {}", tmp.display()))?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, &path)
        .await
        .with_context(|| format!("failed to move report into place at {}", path.display()))?;

    log::info!("Combined analysis results saved to: {}", path.display());
    Ok(path)
}

fn report_filename(
    company_name: &str,
    location: Option<&str>,
    timestamp: DateTime<Utc>,
) -> String {
    let safe_company = sanitize(company_name, MAX_COMPANY_CHARS);
    let safe_company = if safe_company.is_empty() {
        "unknown".to_string()
    } else {
        safe_company
    };

    let location_suffix = location
        .map(|l| sanitize(l, MAX_LOCATION_CHARS))
        .filter(|l| !l.is_empty())
        .map(|l| format!("_{}", l))
        .unwrap_or_default();

    format!(
        "{}{}_analysis_{}.json",
        safe_company,
        location_suffix,
        timestamp.format("%Y%m%d%H%M%S")
    )
}

fn sanitize(value: &str, max_chars: usize) -> String {
    value
        .chars()
        .take(max_chars)
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LlmOutcome, SiteReport};
    use chrono::TimeZone;
    use url::Url;

    fn sample_report() -> AnalysisReport {
        let base = Url::parse("https://example.com").unwrap();
        AnalysisReport {
            scrape_analysis: SiteReport::new(&base, "Acme Robotics", Some("Berlin")),
            llm_generated_insights: LlmOutcome::Failed {
                error: "skipped".to_string(),
            },
        }
    }

    #[test]
    fn filenames_are_sanitized_and_timestamped() {
        let timestamp = Utc.with_ymd_and_hms(2026, 8, 5, 12, 30, 0).unwrap();

        let name = report_filename("Acme Robotics, Inc.", Some("Berlin"), timestamp);
        assert_eq!(name, "Acme_Robotics__Inc_Berlin_analysis_20260805123000.json");

        let name = report_filename("???", None, timestamp);
        assert_eq!(name, "unknown_analysis_20260805123000.json");
    }

    #[tokio::test]
    async fn writes_report_to_disk() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().to_str().unwrap();

        let path = save_report(dir, "Acme Robotics", None, &sample_report())
            .await
            .unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(
            value["scrape_analysis"]["input_company_name"],
            "Acme Robotics"
        );
        assert_eq!(value["llm_generated_insights"]["error"], "skipped");
        assert!(path.to_str().unwrap().ends_with(".json"));
    }
}
