//! clipscribe
//!
//! Batch-processes local video files into transcripts and derived publishing
//! metadata: ffmpeg demuxes audio, fixed 30-second chunks go to a
//! speech-to-text API, and the concatenated transcript feeds a
//! text-generation API that derives titles, a description, tags and a
//! timestamped outline.

pub mod audio;
pub mod config;
pub mod content;
pub mod pipeline;
pub mod transcription;
pub mod video;

// Re-export main types for easy access
pub use crate::audio::{chunk_path, plan_chunks, AudioExtractor, ChunkSpec, MediaToolError};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::content::{split_lines_nonempty, split_tags, ContentBundle, ContentGenerator};
pub use crate::pipeline::{details_path, BatchProcessor, RunSummary};
pub use crate::transcription::TranscriptionClient;
pub use crate::video::VideoScanner;
