//! Mapping from Telegram media kinds to temp-file extensions.

use teloxide::types::{FileId, Message};

/// Media categories the bot transcribes.
///
/// Every category carries a fixed pair of extensions: the one Telegram
/// delivers the payload in, and the one the normalizer produces. The
/// acquirer and the cleanup both go through this table so they can never
/// disagree about file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Voice,
    Audio,
    Video,
    VideoNote,
}

impl ContentKind {
    /// Extension Telegram delivers this kind in.
    pub fn source_ext(self) -> &'static str {
        match self {
            Self::Voice => ".ogg",
            Self::Audio => ".mp3",
            Self::Video | Self::VideoNote => ".mp4",
        }
    }

    /// Extension after normalization.
    pub fn target_ext(self) -> &'static str {
        ".wav"
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Voice => "voice",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::VideoNote => "video_note",
        }
    }
}

/// Classify a message and surface its attached file reference.
///
/// Returns `None` for everything the bot does not transcribe (plain text,
/// photos, stickers, ...); those messages are ignored, not errors.
pub fn media_attachment(msg: &Message) -> Option<(ContentKind, FileId)> {
    if let Some(voice) = msg.voice() {
        Some((ContentKind::Voice, voice.file.id.clone()))
    } else if let Some(audio) = msg.audio() {
        Some((ContentKind::Audio, audio.file.id.clone()))
    } else if let Some(video) = msg.video() {
        Some((ContentKind::Video, video.file.id.clone()))
    } else if let Some(note) = msg.video_note() {
        Some((ContentKind::VideoNote, note.file.id.clone()))
    } else {
        None
    }
}
