//! Built-in sample corpus
//!
//! Twenty labelled emails, ten per class. Enough to exercise the full
//! train/serve path in tests and demos; real deployments train on their
//! own mail instead.

use mailguard_common::{Label, RawEmail};

/// The bundled labelled corpus: 10 phishing, 10 legitimate.
pub fn sample_corpus() -> Vec<(RawEmail, Label)> {
    let phishing = [
        (
            "security@account-alerts.info",
            "URGENT: Your account will be suspended!",
            "Dear customer, your account will be suspended unless you click here immediately and verify your information: http://account-alerts.info/verify. Act now!",
        ),
        (
            "prize@lucky-winner-draw.net",
            "Congratulations! You won $1,000,000!",
            "You are our lucky winner! Click here to claim your prize: http://lucky-winner-draw.net/claim. Limited time offer, don't delay!",
        ),
        (
            "alert@secure-notify.org",
            "Security Alert: Unusual Activity",
            "We detected unusual activity on your account. Click here to secure your account immediately: http://secure-notify.org/login or it will be locked.",
        ),
        (
            "service@paypa1-verify.com",
            "PayPal: Verify Your Account",
            "Your PayPal account has been limited. Please verify your information by clicking the link to restore access: http://paypa1-verify.com/account",
        ),
        (
            "admin@bank-secure-alerts.com",
            "Bank Alert: Suspicious Transaction",
            "We noticed a suspicious transaction on your account. Please confirm your identity by providing your login details.",
        ),
        (
            "refunds@irs-taxrefund.org",
            "IRS: Tax Refund Available",
            "You have a tax refund of $2,847 waiting. Click here to claim it now before it expires.",
        ),
        (
            "orders@amaz0n-billing.net",
            "Amazon: Order Confirmation Required",
            "Your order for $899.99 needs confirmation. If you didn't make this purchase, click here to cancel immediately.",
        ),
        (
            "support@micros0ft-security.com",
            "Microsoft: Account Compromised",
            "Your Microsoft account has been compromised. Click here to change your password and secure your account.",
        ),
        (
            "giveaway@free-iphone-now.com",
            "Free iPhone 15 - Limited Time!",
            "Congratulations! You've been selected to receive a FREE iPhone 15. Click here to claim your prize now!",
        ),
        (
            "billing@netf1ix-payments.com",
            "Netflix: Payment Failed",
            "Your Netflix payment has failed. Update your payment information immediately at http://netf1ix-payments.com/update to avoid service interruption.",
        ),
    ];

    let legitimate = [
        (
            "jane.miller@gmail.com",
            "Meeting scheduled for tomorrow",
            "Hi, I wanted to confirm our meeting scheduled for tomorrow at 2 PM. Please let me know if you need to reschedule.",
        ),
        (
            "david.chen@acme-corp.com",
            "Project update",
            "Please find attached the latest project update. Let me know if you have any questions or need clarification.",
        ),
        (
            "team-lead@acme-corp.com",
            "Weekly team standup",
            "Our weekly team standup is scheduled for Friday at 10 AM. We'll discuss project progress and upcoming tasks.",
        ),
        (
            "accounts@consulting-partners.com",
            "Invoice #12345",
            "Please find attached invoice #12345 for services rendered last month. Payment is due within 30 days.",
        ),
        (
            "registration@techconference.org",
            "Conference registration confirmation",
            "Thank you for registering for the Tech Conference 2024. Your registration has been confirmed.",
        ),
        (
            "newsletter@techweekly.com",
            "Newsletter: Tech Updates",
            "Here are the latest technology updates and industry news for this week. Enjoy reading!",
        ),
        (
            "sarah.johnson@yahoo.com",
            "Birthday party invitation",
            "You're invited to Sarah's birthday party this Saturday at 7 PM. Please RSVP by Thursday.",
        ),
        (
            "finance@acme-corp.com",
            "Quarterly report ready",
            "The quarterly financial report is now ready for review. Please check the shared folder for the document.",
        ),
        (
            "hr@acme-corp.com",
            "Training session reminder",
            "Reminder: The mandatory training session is tomorrow at 3 PM in Conference Room A.",
        ),
        (
            "hr@acme-corp.com",
            "Welcome to the team!",
            "Welcome to our team! We're excited to have you on board. Your first day orientation is scheduled for Monday.",
        ),
    ];

    phishing
        .iter()
        .map(|(sender, subject, body)| (RawEmail::new(*sender, *subject, *body), Label::Phishing))
        .chain(
            legitimate.iter().map(|(sender, subject, body)| {
                (RawEmail::new(*sender, *subject, *body), Label::Legitimate)
            }),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_is_balanced() {
        let corpus = sample_corpus();
        assert_eq!(corpus.len(), 20);
        let phishing = corpus
            .iter()
            .filter(|(_, l)| *l == Label::Phishing)
            .count();
        assert_eq!(phishing, 10);
    }

    #[test]
    fn test_phishing_fixtures_carry_url_evidence() {
        // The URL feature column trains on these rows; keep it attested
        let with_urls = sample_corpus()
            .iter()
            .filter(|(e, l)| *l == Label::Phishing && e.body.contains("http://"))
            .count();
        assert!(with_urls >= 5);
    }

    #[test]
    fn test_corpus_has_no_empty_text() {
        for (email, _) in sample_corpus() {
            assert!(!email.sender.is_empty());
            assert!(!email.subject.trim().is_empty());
            assert!(!email.body.trim().is_empty());
        }
    }
}
