//! MailGuard Text - Email text normalization
//!
//! First stage of the detection pipeline: cleans a raw email's subject and
//! body into normalized tokens for lexical feature extraction.
//!
//! - Lowercasing, URL / address / HTML / digit stripping
//! - Word-boundary tokenization
//! - Fixed English stop-word removal
//! - Porter stemming
//!
//! The stop-word list and stemmer are part of the vectorization schema:
//! a trained model embeds [`TEXT_PIPELINE_VERSION`] and refuses to load
//! against a build with a different one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod normalize;
pub mod stemmer;
pub mod stopwords;

pub use normalize::{NormalizedDocument, TextNormalizer};

/// Version of the normalization resources (stop-word list, stemmer,
/// stripping rules). Bump on any change that alters token output.
pub const TEXT_PIPELINE_VERSION: u32 = 1;
