//! Train on the bundled corpus and analyze a few emails end to end.

use mailguard_common::{MailGuardResult, RawEmail};
use mailguard_ml::corpus::sample_corpus;
use mailguard_ml::pipeline::PhishingAnalyzer;
use mailguard_ml::train::TrainingConfig;
use mailguard_ml::EmailInspector;

fn main() -> MailGuardResult<()> {
    tracing_subscriber::fmt::init();

    let analyzer = PhishingAnalyzer::new();
    let version = analyzer.train_and_commit(&sample_corpus(), &TrainingConfig::default())?;
    println!("trained model, serving version {version}");

    let inspector = EmailInspector::new();
    let emails = [
        RawEmail::new(
            "security@paypa1.com",
            "Urgent: Verify your account now!!!",
            "Your account will be suspended. Click here immediately: http://paypa1-secure.com/login",
        ),
        RawEmail::new(
            "newsletter@nytimes.com",
            "Your weekly digest",
            "Here are the top stories we picked for you this week.",
        ),
    ];

    for email in &emails {
        let verdict = analyzer.analyze(email)?;
        println!();
        println!("from:       {}", email.sender);
        println!("subject:    {}", email.subject);
        println!(
            "verdict:    {} ({:.0}% confidence)",
            verdict.label,
            verdict.confidence * 100.0
        );
        for indicator in &verdict.indicators {
            println!("indicator:  {indicator}");
        }

        let report = inspector.inspect(email);
        println!("urgency:    {}/10", report.urgency_score);
        println!("reputation: {:?}", report.domain_reputation);
        for line in report.advice(verdict.label == mailguard_common::Label::Phishing) {
            println!("advice:     {line}");
        }
    }

    let stats = analyzer.stats();
    println!();
    println!(
        "analyzed {} email(s): {} phishing, {} legitimate",
        stats.analyzed, stats.phishing, stats.legitimate
    );
    Ok(())
}
