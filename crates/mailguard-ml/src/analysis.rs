//! Human-readable email inspection
//!
//! Produces the report shown next to a verdict: urgency scoring, URL
//! triage, sender reputation and concrete do/don't advice. Everything here
//! is heuristic and model-free; the classifier decides, this module
//! explains.

use crate::signals::{COMMON_DOMAINS, ROLE_LOCAL_PARTS, URGENCY_KEYWORDS};
use mailguard_common::RawEmail;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Phrases that ask the recipient for credentials or identity data
const PII_KEYWORDS: &[&str] = &[
    "password",
    "ssn",
    "social security number",
    "bank account",
    "credit card",
    "login credentials",
    "pin",
    "security code",
    "date of birth",
];

/// URL path fragments typical of credential-harvesting pages
const SUSPICIOUS_URL_FRAGMENTS: &[&str] = &["verify", "login", "secure", "confirm", "update"];

/// Coarse trust classification of the sending domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainReputation {
    /// Well-known consumer or corporate domain
    Trusted,
    /// Syntactically valid but unrecognized domain
    Unknown,
    /// No parseable domain at all
    Untrusted,
}

/// Likelihood that the sender identity is spoofed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpoofingRisk {
    Low,
    Medium,
    High,
}

/// Inspection report for one email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    /// Urgency pressure on a 0-10 scale
    pub urgency_score: u32,
    /// Whether the email asks for credentials or identity data
    pub personal_info_requests: bool,
    /// Urgency keywords actually present
    pub suspicious_keywords: Vec<String>,
    /// All URLs found in subject and body
    pub urls: Vec<String>,
    /// URLs whose shape suggests credential harvesting
    pub suspicious_url_count: usize,
    /// Trust classification of the sending domain
    pub domain_reputation: DomainReputation,
    /// Sender spoofing assessment
    pub spoofing_risk: SpoofingRisk,
}

impl DetailedAnalysis {
    /// Actionable advice lines for the recipient, phrased for the given
    /// verdict.
    pub fn advice(&self, is_phishing: bool) -> Vec<String> {
        let mut advice = Vec::new();
        if is_phishing {
            advice.push(
                "This email has been flagged as potentially malicious. Do not interact with it."
                    .to_string(),
            );
            if self.personal_info_requests {
                advice.push(
                    "Never share personal information (passwords, SSN, bank details) via email. \
                     Legitimate organizations will not ask for this."
                        .to_string(),
                );
            }
            if self.suspicious_url_count > 0 {
                advice.push(
                    "Do not click any links in this email. Hover over links to see the actual \
                     URL, and type known website addresses manually."
                        .to_string(),
                );
            }
            if self.urgency_score > 5 {
                advice.push(
                    "Be wary of urgent or threatening language. Phishers create a sense of \
                     urgency to bypass critical thinking."
                        .to_string(),
                );
            }
            if self.spoofing_risk == SpoofingRisk::High {
                advice.push(
                    "The sender's address appears suspicious. Verify the sender's authenticity, \
                     especially for unexpected emails."
                        .to_string(),
                );
            }
            if !self.suspicious_keywords.is_empty() {
                advice.push(format!(
                    "Watch out for suspicious keywords like: {}. These are often used in scams.",
                    self.suspicious_keywords.join(", ")
                ));
            }
            advice.push(
                "Report suspected phishing to your IT department or email provider, then delete \
                 the email."
                    .to_string(),
            );
            advice.push(
                "When in doubt, contact the organization directly using official contact \
                 information, not details from the email."
                    .to_string(),
            );
        } else {
            advice.push(
                "This email appears safe based on our analysis, but stay vigilant and follow \
                 general email security practices."
                    .to_string(),
            );
            advice.push(
                "Double-check the sender's address and look for inconsistencies.".to_string(),
            );
            advice.push(
                "Be cautious of unexpected attachments or links, even from known senders."
                    .to_string(),
            );
        }
        advice
    }
}

/// Heuristic inspector behind [`DetailedAnalysis`]
pub struct EmailInspector {
    url_re: Regex,
}

impl EmailInspector {
    pub fn new() -> Self {
        Self {
            url_re: Regex::new(r"(?i)\bhttps?://\S+|\bwww\.\S+").unwrap(),
        }
    }

    /// Inspect one email.
    pub fn inspect(&self, email: &RawEmail) -> DetailedAnalysis {
        let text = format!("{} {}", email.subject, email.body);
        let lower = text.to_lowercase();

        let suspicious_keywords: Vec<String> = URGENCY_KEYWORDS
            .iter()
            .filter(|kw| lower.contains(*kw))
            .map(|kw| kw.to_string())
            .collect();
        let urgency_score = (suspicious_keywords.len() as u32).min(10);

        let personal_info_requests = PII_KEYWORDS.iter().any(|kw| lower.contains(kw));

        let urls: Vec<String> = self
            .url_re
            .find_iter(&text)
            .map(|m| m.as_str().to_string())
            .collect();
        let suspicious_url_count = urls
            .iter()
            .filter(|url| {
                let url = url.to_lowercase();
                SUSPICIOUS_URL_FRAGMENTS.iter().any(|frag| url.contains(frag))
            })
            .count();

        DetailedAnalysis {
            urgency_score,
            personal_info_requests,
            suspicious_keywords,
            urls,
            suspicious_url_count,
            domain_reputation: domain_reputation(&email.sender),
            spoofing_risk: spoofing_risk(&email.sender),
        }
    }
}

impl Default for EmailInspector {
    fn default() -> Self {
        Self::new()
    }
}

fn domain_reputation(sender: &str) -> DomainReputation {
    let sender = sender.to_lowercase();
    let Some((_, domain)) = sender.split_once('@') else {
        return DomainReputation::Untrusted;
    };
    if domain.is_empty() {
        return DomainReputation::Untrusted;
    }
    let well_known = COMMON_DOMAINS.contains(&domain)
        || ["google.com", "microsoft.com", "amazon.com", "apple.com"]
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")));
    if well_known {
        DomainReputation::Trusted
    } else {
        DomainReputation::Unknown
    }
}

fn spoofing_risk(sender: &str) -> SpoofingRisk {
    let sender = sender.to_lowercase();
    let Some((local, domain)) = sender.split_once('@') else {
        return SpoofingRisk::Medium;
    };
    if ROLE_LOCAL_PARTS.iter().any(|role| local.contains(role))
        && !COMMON_DOMAINS.contains(&domain)
    {
        return SpoofingRisk::High;
    }
    if local.len() < 3 {
        return SpoofingRisk::Medium;
    }
    SpoofingRisk::Low
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phishing_email_report() {
        let inspector = EmailInspector::new();
        let email = RawEmail::new(
            "support@secure-alerts.biz",
            "Urgent: account suspended",
            "Verify your password now at http://secure-alerts.biz/login or your account stays locked!",
        );
        let report = inspector.inspect(&email);
        assert!(report.urgency_score >= 3);
        assert!(report.personal_info_requests);
        assert_eq!(report.urls.len(), 1);
        assert_eq!(report.suspicious_url_count, 1);
        assert_eq!(report.domain_reputation, DomainReputation::Unknown);
        assert_eq!(report.spoofing_risk, SpoofingRisk::High);

        let advice = report.advice(true);
        assert!(advice.len() >= 4);
        assert!(advice[0].contains("flagged"));
    }

    #[test]
    fn test_benign_email_report() {
        let inspector = EmailInspector::new();
        let email = RawEmail::new(
            "jane.miller@gmail.com",
            "Lunch on Friday?",
            "Want to grab lunch at the usual place on Friday?",
        );
        let report = inspector.inspect(&email);
        assert_eq!(report.urgency_score, 0);
        assert!(!report.personal_info_requests);
        assert!(report.urls.is_empty());
        assert_eq!(report.domain_reputation, DomainReputation::Trusted);
        assert_eq!(report.spoofing_risk, SpoofingRisk::Low);

        let advice = report.advice(false);
        assert_eq!(advice.len(), 3);
        assert!(advice[0].contains("appears safe"));
    }

    #[test]
    fn test_unparseable_sender_is_untrusted() {
        let inspector = EmailInspector::new();
        let email = RawEmail::new("no-reply", "hello", "plain text body");
        let report = inspector.inspect(&email);
        assert_eq!(report.domain_reputation, DomainReputation::Untrusted);
        assert_eq!(report.spoofing_risk, SpoofingRisk::Medium);
    }

    #[test]
    fn test_urgency_score_is_capped() {
        let inspector = EmailInspector::new();
        let body = "urgent immediately act now verify suspended suspension limited time \
                    click here winner congratulations expire locked compromised confirm your";
        let email = RawEmail::new("a@b.com", "final notice last chance", body);
        let report = inspector.inspect(&email);
        assert_eq!(report.urgency_score, 10);
    }
}
