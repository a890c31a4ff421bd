//! Post-processing for generated summaries.
//!
//! The model is asked to keep Services, Vulnerabilities and Threat Intelligence on
//! one line each but regularly nests them as sub-bullets anyway:
//!
//! ```text
//! - Services:
//!   - Port 80/tcp http
//!   - Port 443/tcp https
//! ```
//!
//! Each pass folds such a block back into `- Services: Port 80/tcp http, Port 443/tcp https`.
//! Blocks that do not look like this are left exactly as generated.

use once_cell::sync::Lazy;
use regex::Regex;

/// One collapsible category: its header label, which following lines count as its
/// sub-bullets, and what to extract from them.
pub struct SectionRule {
    label: &'static str,
    sub_bullet: Regex,
    item: Regex,
}

impl SectionRule {
    /// `item` may use a named group `item`; otherwise the whole match is taken.
    pub fn new(label: &'static str, sub_bullet: &str, item: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            label,
            sub_bullet: Regex::new(sub_bullet)?,
            item: Regex::new(item)?,
        })
    }

    pub fn label(&self) -> &str {
        self.label
    }

    fn items<'t>(&self, line: &'t str) -> Vec<&'t str> {
        self.item
            .captures_iter(line)
            .filter_map(|c| c.name("item").or_else(|| c.get(0)))
            .map(|m| m.as_str().trim_end())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

pub static SERVICES: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new("Services", r"^\s+- Port", r"Port .+").expect("services rule should compile")
});

pub static VULNERABILITIES: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "Vulnerabilities",
        r"^\s+- CVE-",
        r"CVE-\S+ \([^)]+\)",
    )
    .expect("vulnerabilities rule should compile")
});

pub static THREAT_INTELLIGENCE: Lazy<SectionRule> = Lazy::new(|| {
    SectionRule::new(
        "Threat Intelligence",
        r"^\s+- \S",
        r"^\s+- (?P<item>.+)$",
    )
    .expect("threat intelligence rule should compile")
});

fn strip_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn eol(line: &str) -> &str {
    &line[strip_eol(line).len()..]
}

/// Collapse every `- <label>:` header that is directly followed by matching
/// sub-bullets into a single line. Headers whose sub-bullets yield no item are
/// left untouched, as is everything outside the collapsed block.
pub fn collapse_section(summary: &str, rule: &SectionRule) -> String {
    let marker = format!("- {}:", rule.label);
    let lines: Vec<&str> = summary.split_inclusive('\n').collect();
    let mut out = String::with_capacity(summary.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let Some(pos) = line.find(&marker) else {
            out.push_str(line);
            i += 1;
            continue;
        };

        let mut end = i + 1;
        while end < lines.len() && rule.sub_bullet.is_match(strip_eol(lines[end])) {
            end += 1;
        }

        let items: Vec<&str> = lines[i + 1..end]
            .iter()
            .flat_map(|l| rule.items(strip_eol(l)))
            .collect();

        if items.is_empty() {
            out.push_str(line);
            i += 1;
            continue;
        }

        out.push_str(&line[..pos]);
        out.push_str(&marker);
        out.push(' ');
        out.push_str(&items.join(", "));
        out.push_str(eol(lines[end - 1]));
        i = end;
    }

    out
}

pub fn collapse_services(summary: &str) -> String {
    collapse_section(summary, &SERVICES)
}

pub fn collapse_vulnerabilities(summary: &str) -> String {
    collapse_section(summary, &VULNERABILITIES)
}

pub fn collapse_threat_intelligence(summary: &str) -> String {
    collapse_section(summary, &THREAT_INTELLIGENCE)
}

/// Apply the Services, Vulnerabilities and Threat Intelligence passes in order.
pub fn reformat_summary(summary: &str) -> String {
    let summary = collapse_services(summary);
    let summary = collapse_vulnerabilities(&summary);
    collapse_threat_intelligence(&summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NESTED: &str = "## Bullet Point Summary
- IP: 1.2.3.4
- Location: Berlin, Germany
- Autonomous System: AS3320, Deutsche Telekom
- Services:
  - Port 22/tcp ssh
  - Port 80/tcp http
- Vulnerabilities:
  - CVE-2021-1234 (high)
  - CVE-2020-5678 (medium)
- Threat Intelligence:
  - Risk level: high
  - Labels: botnet, scanner

## Paragraph Summary
The host exposes SSH and HTTP.
";

    #[test]
    fn collapses_services_block() {
        let input = "- Services:\n  - Port 80/tcp http\n  - Port 443/tcp https\n";
        assert_eq!(
            collapse_services(input),
            "- Services: Port 80/tcp http, Port 443/tcp https\n"
        );
    }

    #[test]
    fn collapses_vulnerabilities_block() {
        let input = "- Vulnerabilities:\n  - CVE-2021-1234 (high)\n  - CVE-2020-5678 (medium)";
        assert_eq!(
            collapse_vulnerabilities(input),
            "- Vulnerabilities: CVE-2021-1234 (high), CVE-2020-5678 (medium)"
        );
    }

    #[test]
    fn collapses_threat_intelligence_block() {
        let input = "- Threat Intelligence:\n\t- Risk: high\n  - Labels: c2, tor-exit\n";
        assert_eq!(
            collapse_threat_intelligence(input),
            "- Threat Intelligence: Risk: high, Labels: c2, tor-exit\n"
        );
    }

    #[test]
    fn full_summary_is_flattened() {
        let expected = "## Bullet Point Summary
- IP: 1.2.3.4
- Location: Berlin, Germany
- Autonomous System: AS3320, Deutsche Telekom
- Services: Port 22/tcp ssh, Port 80/tcp http
- Vulnerabilities: CVE-2021-1234 (high), CVE-2020-5678 (medium)
- Threat Intelligence: Risk level: high, Labels: botnet, scanner

## Paragraph Summary
The host exposes SSH and HTTP.
";
        assert_eq!(reformat_summary(NESTED), expected);
    }

    #[test]
    fn reformatting_is_idempotent() {
        let once = reformat_summary(NESTED);
        assert_eq!(reformat_summary(&once), once);
    }

    #[test]
    fn already_flat_summary_is_unchanged() {
        let flat = "- Services: Port 80/tcp http\n- Vulnerabilities: None\n- Threat Intelligence: Low risk\n\n## Paragraph Summary\nQuiet host.\n";
        assert_eq!(reformat_summary(flat), flat);
    }

    #[test]
    fn only_targeted_section_changes() {
        let input = "- Services: Port 80/tcp http\n- Vulnerabilities:\n  - CVE-2019-0001 (low)\n- Threat Intelligence: Low risk\n";
        let output = reformat_summary(input);
        assert_eq!(
            output,
            "- Services: Port 80/tcp http\n- Vulnerabilities: CVE-2019-0001 (low)\n- Threat Intelligence: Low risk\n"
        );
        assert!(output.starts_with("- Services: Port 80/tcp http\n"));
        assert!(output.ends_with("- Threat Intelligence: Low risk\n"));
    }

    #[test]
    fn non_conforming_cves_are_left_alone() {
        let input = "- Vulnerabilities:\n  - CVE-2021-1234 rated high\n";
        assert_eq!(collapse_vulnerabilities(input), input);
    }

    #[test]
    fn services_without_port_sub_bullets_are_left_alone() {
        let input = "- Services:\n  - ssh on 22\n- Vulnerabilities: None\n";
        assert_eq!(collapse_services(input), input);
    }

    #[test]
    fn header_prefix_is_preserved() {
        let input = "  - Services:\n    - Port 53/udp dns\n";
        assert_eq!(collapse_services(input), "  - Services: Port 53/udp dns\n");
    }

    #[test]
    fn crlf_line_endings_survive() {
        let input = "- Services:\r\n  - Port 80/tcp http\r\n  - Port 8080/tcp http-alt\r\n- IP: 1.2.3.4\r\n";
        assert_eq!(
            collapse_services(input),
            "- Services: Port 80/tcp http, Port 8080/tcp http-alt\r\n- IP: 1.2.3.4\r\n"
        );
    }

    #[test]
    fn collapse_stops_at_first_unindented_line() {
        let input = "- Threat Intelligence:\n  - Risk: medium\n\n## Paragraph Summary\n- not a sub-bullet\n";
        assert_eq!(
            collapse_threat_intelligence(input),
            "- Threat Intelligence: Risk: medium\n\n## Paragraph Summary\n- not a sub-bullet\n"
        );
    }

    #[test]
    fn inline_header_text_is_replaced_by_items() {
        let input = "- Services: 2 open ports\n  - Port 80/tcp http\n  - Port 443/tcp https\n";
        assert_eq!(
            collapse_services(input),
            "- Services: Port 80/tcp http, Port 443/tcp https\n"
        );
    }

    #[test]
    fn every_matching_block_is_collapsed() {
        let input = "- Services:\n  - Port 80/tcp http\nHost two\n- Services:\n  - Port 25/tcp smtp\n";
        assert_eq!(
            collapse_services(input),
            "- Services: Port 80/tcp http\nHost two\n- Services: Port 25/tcp smtp\n"
        );
    }

    #[test]
    fn custom_rule_uses_item_group() {
        let rule = SectionRule::new("Labels", r"^\s+\* ", r"^\s+\* (?P<item>.+)$").unwrap();
        assert_eq!(rule.label(), "Labels");
        assert_eq!(
            collapse_section("- Labels:\n  * tor\n  * vpn\n", &rule),
            "- Labels: tor, vpn\n"
        );
    }

    #[test]
    fn empty_input_is_unchanged() {
        assert_eq!(reformat_summary(""), "");
    }
}
