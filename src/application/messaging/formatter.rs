//! Response formatter - Renders vendor results and failures as chat text

use crate::application::errors::{ParseError, VendorError, VendorErrorKind};
use crate::domain::entities::{CommandRequest, GuideCandidate, GuideSet, ScoreTier, Species, Subcommand};

/// Placeholder for fields the vendor did not return
pub const NOT_AVAILABLE: &str = "n/a";

/// Builds Slack mrkdwn replies
#[derive(Debug, Clone, Default)]
pub struct ResponseFormatter {
    default_species: Species,
}

impl ResponseFormatter {
    pub fn new(default_species: Species) -> Self {
        Self { default_species }
    }

    /// Render a vendor result for the request that produced it
    pub fn format(&self, request: &CommandRequest, result: &GuideSet) -> String {
        match request.subcommand {
            Subcommand::Design => self.format_design(request, result),
            Subcommand::Check => self.format_check(request, result),
            Subcommand::Predesign => self.format_predesign(request, result),
            Subcommand::Help => self.help(),
        }
    }

    fn format_design(&self, request: &CommandRequest, result: &GuideSet) -> String {
        let mut lines = vec![
            "🧬 *IDT Custom gRNA Design Results*".to_string(),
            format!(
                "Species: *{}* | Target: {} bp",
                request.species.scientific_name(),
                request.target.len()
            ),
        ];

        if result.is_empty() {
            lines.push("⚠️ No guide RNAs found for this target region. Try a different sequence (23-1000 bp).".to_string());
            return lines.join("\n");
        }

        for (i, guide) in result.guides.iter().enumerate() {
            lines.push(format!(
                "{}. `{}` | {} | {} | Pos: {} | Strand: {}",
                i + 1,
                text_or_na(&guide.sequence),
                score_field("On-target", guide.on_target),
                score_field("Off-target", guide.off_target),
                text_or_na(&guide.position),
                text_or_na(&guide.strand),
            ));
        }

        lines.push("💡 Scores 1-100 (higher = better). On-target ≥60 = high efficiency. IDT recommends testing ≥3 guides.".to_string());
        lines.join("\n")
    }

    fn format_check(&self, request: &CommandRequest, result: &GuideSet) -> String {
        let mut lines = vec![
            "🔍 *IDT gRNA Sequence Check*".to_string(),
            format!(
                "Sequence: `{}` | Species: *{}*",
                request.target,
                request.species.scientific_name()
            ),
        ];

        match result.first() {
            Some(guide) => lines.push(self.check_summary(guide)),
            None => lines.push("⚠️ No results returned. Ensure the sequence is exactly 20 bases upstream of a PAM site (NGG).".to_string()),
        }

        lines.push("💡 Input must be the 20 bp protospacer directly 5′ of the PAM (NGG).".to_string());
        lines.join("\n")
    }

    /// Single summary line for a checked protospacer
    pub fn check_summary(&self, guide: &GuideCandidate) -> String {
        let verdict = if guide.is_recommended() {
            "✅ *Recommended*"
        } else {
            "⚠️ *Proceed with caution*"
        };
        format!(
            "{} | {} | {}",
            score_field_out_of_100("On-target", guide.on_target),
            score_field_out_of_100("Off-target", guide.off_target),
            verdict
        )
    }

    fn format_predesign(&self, request: &CommandRequest, result: &GuideSet) -> String {
        let mut lines = vec![
            format!("📋 *IDT Predesigned gRNAs: {}*", request.target),
            format!(
                "Gene: *{}* | Species: *{}*",
                request.target,
                request.species.scientific_name()
            ),
        ];

        if result.is_empty() {
            lines.push(format!(
                "⚠️ No predesigned gRNAs found for *{}* in *{}*. Check the gene symbol or use `/crispr design` with a custom sequence.",
                request.target,
                request.species.scientific_name()
            ));
            return lines.join("\n");
        }

        for (i, guide) in result.guides.iter().enumerate() {
            lines.push(format!(
                "{}. `{}` | {} | {} | Design ID: `{}`",
                i + 1,
                text_or_na(&guide.sequence),
                score_field("On", guide.on_target),
                score_field("Off", guide.off_target),
                text_or_na(&guide.design_id),
            ));
        }

        lines.push("💡 IDT recommends testing ≥3 guides for best results.".to_string());
        lines.join("\n")
    }

    pub fn help(&self) -> String {
        [
            "🧬 *IDT CRISPR gRNA Bot*".to_string(),
            "*1. Design custom gRNAs from a target sequence (23-1000 bp, A/C/G/T/N):*".to_string(),
            "```/crispr design ATGCGATCG...NNNNN human```".to_string(),
            "*2. Check a known 20 bp guide (A/C/G/T, 5′ of PAM):*".to_string(),
            "```/crispr check ATGCGATCGATCGATCGATC human```".to_string(),
            "*3. Look up predesigned gRNAs by gene symbol:*".to_string(),
            "```/crispr predesign TNNT2 human```".to_string(),
            format!(
                "*Supported species:* {} (default: {})",
                Species::supported_list(),
                self.default_species
            ),
        ]
        .join("\n")
    }

    pub fn parse_error(&self, err: &ParseError) -> String {
        format!("❌ *Error:* {}\nUse `/crispr help` for usage.", err)
    }

    /// Reply for a failed credential exchange. Carries no detail.
    pub fn auth_failure(&self) -> String {
        "❌ The IDT design service is unavailable right now. Please try again later.".to_string()
    }

    pub fn vendor_failure(&self, err: &VendorError) -> String {
        let status = err
            .http_status
            .map(|s| format!(" (HTTP {})", s))
            .unwrap_or_default();
        match err.kind {
            VendorErrorKind::Unauthorized => format!(
                "❌ IDT rejected the bot's credentials{}. An administrator should check the IDT account.",
                status
            ),
            VendorErrorKind::NotFound => format!(
                "❌ IDT vendor endpoint unavailable{}. The IDT API may be changing; please try again later.",
                status
            ),
            VendorErrorKind::RateLimited => format!(
                "❌ IDT rate limit reached{}. Please wait a minute and retry.",
                status
            ),
            VendorErrorKind::ValidationRejected => format!(
                "❌ IDT rejected the input{}: `{}`",
                status,
                err.message.replace('`', "'")
            ),
            VendorErrorKind::Timeout => {
                "❌ IDT did not respond in time. Please try again.".to_string()
            }
            VendorErrorKind::Connection => {
                "❌ Cannot connect to the IDT API. Check network/firewall.".to_string()
            }
            VendorErrorKind::Unknown => format!(
                "❌ IDT API returned an unexpected error{}.",
                status
            ),
        }
    }
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_AVAILABLE)
}

fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{:.1}", score)
    }
}

fn score_field(label: &str, score: Option<f64>) -> String {
    match score {
        Some(s) => {
            let tier = ScoreTier::from_score(s);
            format!("{} {}: *{}* ({})", tier.marker(), label, format_score(s), tier)
        }
        None => format!("{}: {}", label, NOT_AVAILABLE),
    }
}

fn score_field_out_of_100(label: &str, score: Option<f64>) -> String {
    match score {
        Some(s) => {
            let tier = ScoreTier::from_score(s);
            format!("{} {}: *{}/100* ({})", tier.marker(), label, format_score(s), tier)
        }
        None => format!("{}: {}", label, NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide(seq: &str, on: Option<f64>, off: Option<f64>) -> GuideCandidate {
        GuideCandidate {
            sequence: Some(seq.to_string()),
            on_target: on,
            off_target: off,
            ..Default::default()
        }
    }

    #[test]
    fn test_check_summary_high() {
        let request = CommandRequest::new(Subcommand::Check, "ATGGCAGATTCCCAGTTGGA", Species::Human);
        let result = GuideSet::new(vec![guide("ATGGCAGATTCCCAGTTGGA", Some(75.0), Some(90.0))]);
        let text = ResponseFormatter::new(Species::Human).format(&request, &result);

        assert!(text.contains("(high)"));
        assert!(text.contains("75/100"));
        assert!(text.contains("90/100"));
        assert!(text.contains("Recommended"));
        assert!(text.contains("Homo sapiens"));
    }

    #[test]
    fn test_design_keeps_vendor_order() {
        let request = CommandRequest::new(Subcommand::Design, "A".repeat(40), Species::Mouse);
        let result = GuideSet::new(vec![
            guide("CCCCCCCCCCCCCCCCCCCC", Some(30.0), Some(20.0)),
            guide("GGGGGGGGGGGGGGGGGGGG", Some(90.0), Some(80.0)),
        ]);
        let text = ResponseFormatter::new(Species::Human).format(&request, &result);

        let first = text.find("CCCCCCCCCCCCCCCCCCCC").unwrap();
        let second = text.find("GGGGGGGGGGGGGGGGGGGG").unwrap();
        assert!(first < second);
        assert!(text.contains("1. `CCCCCCCCCCCCCCCCCCCC`"));
        assert!(text.contains("(low)"));
        assert!(text.contains("Mus musculus"));
    }

    #[test]
    fn test_missing_fields_render_placeholder() {
        let request = CommandRequest::new(Subcommand::Predesign, "BRCA1", Species::Human);
        let result = GuideSet::new(vec![GuideCandidate::default()]);
        let text = ResponseFormatter::new(Species::Human).format(&request, &result);

        assert!(text.contains("1. `n/a`"));
        assert!(text.contains("On: n/a"));
        assert!(text.contains("Design ID: `n/a`"));
    }

    #[test]
    fn test_empty_results() {
        let request = CommandRequest::new(Subcommand::Predesign, "NOTAGENE", Species::Rat);
        let text = ResponseFormatter::new(Species::Human).format(&request, &GuideSet::default());
        assert!(text.contains("No predesigned gRNAs found for *NOTAGENE*"));
    }

    #[test]
    fn test_fractional_scores() {
        assert_eq!(format_score(72.0), "72");
        assert_eq!(format_score(72.46), "72.5");
    }

    #[test]
    fn test_not_found_distinct_from_auth_failure() {
        let formatter = ResponseFormatter::new(Species::Human);
        let not_found = formatter.vendor_failure(&VendorError::from_status(404, "Not Found"));
        assert!(not_found.contains("endpoint unavailable"));
        assert_ne!(not_found, formatter.auth_failure());
    }

    #[test]
    fn test_help_lists_species() {
        let help = ResponseFormatter::new(Species::Human).help();
        assert!(help.contains("human, mouse, rat, zebrafish, celegans"));
        assert!(help.contains("/crispr predesign"));
    }

    #[test]
    fn test_help_shows_configured_default() {
        let help = ResponseFormatter::new(Species::Mouse).help();
        assert!(help.contains("(default: mouse)"), "{}", help);
    }
}
