//! Prompt template for host security summaries

use serde_json::Value;

use crate::error::Result;

/// Instructions sent ahead of the host record. The model is asked for a fixed
/// six-category bullet block followed by a short paragraph.
pub const SUMMARY_INSTRUCTIONS: &str = "Create a security analysis summary. Use EXACTLY this format for every host:

## Bullet Point Summary
- IP: [IP address]
- Location: [City, Country]
- Autonomous System: [ASN, Provider]
- Services: [All ports and protocols]
- Vulnerabilities: [All CVEs with severities]
- Threat Intelligence: [Risk level and labels]

## Paragraph Summary
5-7 sentence security analysis]

STRICT FORMATTING RULES:
- ALWAYS use this exact structure for every host
- ALWAYS include all 6 categories in this order
- Services: ALL ports must be on the SAME LINE after the colon
- Vulnerabilities: ALL CVEs must be on the SAME LINE after the colon
- Threat Intelligence: ALL info must be on the SAME LINE after the colon
- NEVER create sub-bullets for any category
- Keep descriptions concise (max 40 chars per line)

";

/// Build the summary prompt for one host record.
pub fn build_summary_prompt(host: &Value) -> Result<String> {
    let host_json = serde_json::to_string_pretty(host)?;
    Ok(format!("{SUMMARY_INSTRUCTIONS}Host Data: {host_json}"))
}
