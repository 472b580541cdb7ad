//! HumanMark - Forensic human-vs-AI content analysis
//!
//! HumanMark estimates whether a piece of text, an image, an audio file or
//! a video was made by a person or generated by a model. It works offline:
//! no trained model, no mandatory network calls. It reads the content's
//! structure and statistics instead.
//!
//! # Overview
//!
//! Generators leave fingerprints. Image tools write their name into PNG
//! text chunks, voice synthesizers stamp ID3 tags, video pipelines encode
//! with Lavf at suspiciously round bitrates, and language models write
//! sentences of uniform length full of stock phrases. Real cameras and
//! microphones leave fingerprints too: EXIF make/model, GPS, recorder
//! software, noisy high-entropy payloads.
//!
//! # Detection Methods
//!
//! 1. **Container metadata**: EXIF, PNG chunks, ID3v2, RIFF, FLAC
//!    metadata blocks, MP4 atoms and EBML tags are walked defensively for
//!    generator and device markers.
//!
//! 2. **Statistical signals**: byte entropy, block similarity, quantization
//!    tables, sentence-length variance, vocabulary richness, burstiness.
//!
//! 3. **External detectors** (optional): Hive, GPTZero and OpenAI opinions
//!    are fused in with per-detector reliability weights.
//!
//! # Quick Start
//!
//! ```no_run
//! use humanmark::{AnalysisInput, Analyzer};
//!
//! let analyzer = Analyzer::new();
//! let input = AnalysisInput::from_path("photo.jpg").unwrap();
//! let result = analyzer.analyze(&input).unwrap();
//!
//! if result.human {
//!     println!("Looks human-made ({:.0}% confident)", result.confidence * 100.0);
//! } else {
//!     println!("Likely AI-generated ({:.0}% confident)", result.confidence * 100.0);
//! }
//! println!("AI score: {:.2}", result.ai_score);
//! ```
//!
//! # Scoring System
//!
//! Every signal is an AI score in [0,1]. A weighted mean per modality gives
//! the internal score, which is then fused with any external opinions:
//!
//! | ai_score | Verdict |
//! |----------|---------|
//! | 0.0-0.49 | human |
//! | 0.5-1.0 | AI |
//!
//! # Modules
//!
//! - [`analyzer`]: Orchestration plus the per-modality signal engines
//! - [`classify`]: Content category detection
//! - [`container`]: Defensive binary container walkers
//! - [`external`]: Hosted detector clients and URL fetching
//! - [`db`]: SQLite job store
//! - [`serve`]: HTTP API
//! - [`report`]: Output formatters (JSON, CSV)

pub mod analyzer;
pub mod classify;
pub mod config;
pub mod container;
pub mod db;
pub mod external;
pub mod logging;
pub mod report;
pub mod schema;
pub mod serve;

pub use analyzer::{AnalysisError, AnalysisInput, Analyzer, DetectionResult, ForensicReport};
pub use classify::ContentCategory;
pub use config::Config;
pub use db::{Database, DbSummary, Job};
