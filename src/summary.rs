//! Summary pipeline: dataset lookup, prompt, generation, reformatting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::dataset::load_dataset;
use crate::error::{HostSummaryError, Result};
use crate::generation::TextGenerator;
use crate::prompt::build_summary_prompt;
use crate::reformat::reformat_summary;

const BULLET_HEADING: &str = "## Bullet Point Summary";
const PARAGRAPH_HEADING: &str = "## Paragraph Summary";

/// Successful response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostSummary {
    pub ip: String,
    pub summary: String,
}

/// The two parts of a generated summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySections {
    pub bullets: Option<String>,
    pub paragraph: Option<String>,
}

pub struct SummaryService {
    dataset_path: PathBuf,
    generator: Arc<dyn TextGenerator>,
}

impl SummaryService {
    pub fn new(dataset_path: impl Into<PathBuf>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            generator,
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Summarize the host with the given IP.
    ///
    /// The dataset is checked before the IP so a missing dataset is reported
    /// regardless of the request.
    pub async fn summarize(&self, ip: Option<&str>) -> Result<HostSummary> {
        let dataset = load_dataset(&self.dataset_path)?.ok_or(HostSummaryError::DatasetNotFound)?;

        let ip = ip
            .filter(|ip| !ip.is_empty())
            .ok_or(HostSummaryError::MissingIp)?;

        let host = dataset
            .find_host(ip)
            .ok_or(HostSummaryError::HostNotFound)?;

        let prompt = build_summary_prompt(host)?;
        debug!(ip, prompt_chars = prompt.len(), "Built summary prompt");

        let raw = self.generator.generate(&prompt).await?;
        let summary = reformat_summary(&raw);
        if summary != raw {
            debug!(ip, "Collapsed nested bullets in generated summary");
        }

        info!(ip, chars = summary.len(), "Generated host summary");
        Ok(HostSummary {
            ip: ip.to_string(),
            summary,
        })
    }
}

/// Split a summary into its bullet block and paragraph block.
pub fn split_sections(summary: &str) -> SummarySections {
    let bullet_start = summary.find(BULLET_HEADING);
    let paragraph_start = summary.find(PARAGRAPH_HEADING);

    let bullets = bullet_start.map(|start| {
        let body = start + BULLET_HEADING.len();
        let end = paragraph_start.filter(|&p| p >= body).unwrap_or(summary.len());
        summary[body..end].trim().to_string()
    });
    let paragraph =
        paragraph_start.map(|start| summary[start + PARAGRAPH_HEADING.len()..].trim().to_string());

    SummarySections {
        bullets: bullets.filter(|s| !s.is_empty()),
        paragraph: paragraph.filter(|s| !s.is_empty()),
    }
}
