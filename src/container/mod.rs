//! Container-level parsers
//!
//! These modules walk the structure of media containers far enough to pull
//! out metadata and basic technical fields. They never decode samples or
//! pixels.
//!
//! Every parser works on an in-memory slice of untrusted bytes. Length
//! fields are checked against the buffer before use: a truncated or hostile
//! file ends the walk early and yields `None`/default fields instead of an
//! error. None of them can loop forever, since each step either advances by
//! at least the size of a header or stops.

pub mod flac;
pub mod jpeg;
pub mod mp3;
pub mod mp4;
pub mod png;
pub mod riff;
