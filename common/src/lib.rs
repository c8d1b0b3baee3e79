//! RateMyFit Common Library
//!
//! CLIとクライアントコアで共有される型とユーティリティ

pub mod error;
pub mod extraction;
pub mod fingerprint;
pub mod parser;
pub mod types;

pub use error::{Error, Result};
pub use extraction::{extract_clothing_items, extract_colors};
pub use fingerprint::{compute_fingerprint, RequestFingerprint, DIGEST_PREFIX_LEN};
pub use parser::{extract_json_object, parse_analysis_response};
pub use types::{AnalysisResult, ClothingItem, FeedbackMode, Gender, WardrobeItem};
