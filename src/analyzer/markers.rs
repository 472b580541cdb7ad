//! Token tables for metadata scanning
//!
//! All tables are ordered slices so lookups are deterministic: when several
//! encoder patterns match, the first entry wins. Matching is done against
//! lowercased text, so every pattern here is lowercase.

use super::stats::lower_text;

/// Tokens left behind by AI voice/music tools in tags and comments
pub const AI_AUDIO_MARKERS: &[&str] = &[
    "elevenlabs", "eleven labs", "murf", "play.ht", "resemble", "descript",
    "synthesia", "wellsaid", "suno", "udio", "musicgen", "riffusion",
    "ai generated", "ai-generated", "synthetic voice", "text to speech",
    "text-to-speech", "tts", "voice clone", "cloned voice",
];

/// Tokens suggesting a real capture
pub const RECORDING_MARKERS: &[&str] = &[
    "recorded", "recording", "studio", "microphone", "live", "concert",
    "session", "interview", "iphone", "android", "voice memo",
];

pub const AUDIO_ENCODERS: &[(&str, &str)] = &[
    ("lame", "LAME"),
    ("ffmpeg", "ffmpeg"),
    ("audacity", "Audacity"),
    ("adobe", "Adobe Audition"),
    ("logic", "Logic Pro"),
    ("pro tools", "Pro Tools"),
    ("ableton", "Ableton Live"),
    ("fl studio", "FL Studio"),
    ("elevenlabs", "ElevenLabs"),
    ("suno", "Suno AI"),
    ("udio", "Udio"),
];

/// Encoder names belonging to AI audio products
pub const AI_AUDIO_TOOLS: &[&str] = &[
    "elevenlabs", "eleven labs", "murf", "play.ht", "resemble", "descript",
    "synthesia", "wellsaid", "amazon polly", "google tts", "azure speech",
    "suno", "udio", "musicgen", "riffusion",
];

/// Raw-byte signatures searched in the head of an audio file
pub const AI_AUDIO_SIGNATURES: &[&str] = &[
    "elevenlabs", "murf.ai", "play.ht", "resemble.ai", "suno", "udio",
    "generated", "synthetic", "ai voice", "text-to-speech", "tts", "voice clone",
];

pub const AI_VIDEO_TOOLS: &[&str] = &[
    "runway", "pika", "sora", "gen-2", "gen2", "stable video", "stablevideo",
    "modelscope", "deforum", "animatediff", "zeroscope",
];

const AI_VIDEO_EXTRA_MARKERS: &[&str] = &[
    "ai generated", "ai-generated", "synthetic", "dall-e", "midjourney",
];

pub const PRO_VIDEO_ENCODERS: &[&str] = &[
    "premiere", "final cut", "davinci", "avid", "ffmpeg", "handbrake", "x264", "x265",
];

pub const VIDEO_ENCODERS: &[(&str, &str)] = &[
    ("lavf", "ffmpeg"),
    ("ffmpeg", "ffmpeg"),
    ("handbrake", "HandBrake"),
    ("premiere", "Adobe Premiere"),
    ("final cut", "Final Cut Pro"),
    ("davinci", "DaVinci Resolve"),
    ("x264", "x264"),
    ("x265", "x265"),
    ("runway", "Runway"),
    ("pika", "Pika Labs"),
    ("sora", "OpenAI Sora"),
    ("modelscope", "ModelScope"),
];

/// Image generators that stamp their name into EXIF/PNG text chunks
pub const AI_IMAGE_GENERATORS: &[&str] = &["DALL-E", "Midjourney", "Stable Diffusion"];

/// PNG text chunks additionally carry ComfyUI workflow dumps
pub const AI_PNG_GENERATORS: &[&str] = &["DALL-E", "Midjourney", "Stable Diffusion", "ComfyUI"];

pub const AI_GENERATOR_LABEL: &str = "AI Generator";

pub fn any_of(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| text.contains(t))
}

pub fn has_ai_audio_marker(data: &[u8]) -> bool {
    any_of(&lower_text(data), AI_AUDIO_MARKERS)
}

pub fn has_recording_marker(data: &[u8]) -> bool {
    any_of(&lower_text(data), RECORDING_MARKERS)
}

pub fn has_ai_video_marker(data: &[u8]) -> bool {
    let text = lower_text(data);
    any_of(&text, AI_VIDEO_TOOLS) || any_of(&text, AI_VIDEO_EXTRA_MARKERS)
}

fn lookup_encoder(data: &[u8], table: &[(&str, &'static str)]) -> Option<&'static str> {
    let text = lower_text(data);
    table
        .iter()
        .find(|(pattern, _)| text.contains(pattern))
        .map(|(_, name)| *name)
}

pub fn audio_encoder(data: &[u8]) -> Option<&'static str> {
    lookup_encoder(data, AUDIO_ENCODERS)
}

pub fn video_encoder(data: &[u8]) -> Option<&'static str> {
    lookup_encoder(data, VIDEO_ENCODERS)
}
