//! Feature extraction, training and serving for phishing classification.
//!
//! The flow is: normalize text ([`mailguard_text`]), vectorize it into a
//! TF-IDF block plus eight hand-crafted signals, fit candidate classifiers
//! under cross-validation, and serve the winner behind an atomic slot.
//!
//! ```no_run
//! use mailguard_ml::corpus::sample_corpus;
//! use mailguard_ml::pipeline::PhishingAnalyzer;
//! use mailguard_ml::train::TrainingConfig;
//! use mailguard_common::RawEmail;
//!
//! # fn main() -> mailguard_common::MailGuardResult<()> {
//! let analyzer = PhishingAnalyzer::new();
//! analyzer.train_and_commit(&sample_corpus(), &TrainingConfig::default())?;
//!
//! let email = RawEmail::new(
//!     "security@paypa1.com",
//!     "Urgent: Verify your account now!!!",
//!     "Click here immediately: http://paypa1-secure.com/login",
//! );
//! let verdict = analyzer.analyze(&email)?;
//! println!("{} ({:.0}%)", verdict.label, verdict.confidence * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod classifier;
pub mod corpus;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod serving;
pub mod signals;
pub mod tfidf;
pub mod train;

pub use analysis::{DetailedAnalysis, EmailInspector};
pub use classifier::Algorithm;
pub use features::FeatureVector;
pub use model::{TrainedModel, MODEL_SCHEMA_VERSION};
pub use pipeline::PhishingAnalyzer;
pub use serving::ActiveModel;
pub use signals::{SignalExtractor, SignalScaler, SIGNAL_COUNT};
pub use tfidf::TfidfVocabulary;
pub use train::{train, TrainingConfig, TrainingReport};
