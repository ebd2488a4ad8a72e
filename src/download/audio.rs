//! Audio detection and filename synthesis for message attachments.

use std::path::Path;

use crate::telegram::{Attachment, AttachmentKind};

/// Extensions treated as audio when a document carries no audio MIME type.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "flac", "wav", "ogg", "opus", "aac", "wma"];

const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("audio/mpeg", ".mp3"),
    ("audio/mp4", ".m4a"),
    ("audio/x-m4a", ".m4a"),
    ("audio/flac", ".flac"),
    ("audio/wav", ".wav"),
    ("audio/ogg", ".ogg"),
    ("audio/opus", ".opus"),
    ("audio/aac", ".aac"),
    ("audio/x-ms-wma", ".wma"),
];

/// Whether `filename` has one of the known audio extensions (case-insensitive).
pub fn is_audio_file(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Map a MIME type to a file extension (with leading dot). Unknown types
/// fall back to `.mp3`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
        .unwrap_or(".mp3")
}

fn is_audio_mime(mime: Option<&str>) -> bool {
    mime.is_some_and(|m| m.starts_with("audio/"))
}

/// Decide whether an attachment is audio and, if so, what to call it on disk.
///
/// Returns `None` for documents that are neither audio by MIME type nor by
/// extension. The name is not sanitized yet.
pub fn audio_filename(message_id: i32, attachment: &Attachment) -> Option<String> {
    match attachment.kind {
        AttachmentKind::Audio => Some(match &attachment.file_name {
            Some(name) => name.clone(),
            None => match (&attachment.performer, &attachment.title) {
                (Some(performer), Some(title)) => format!("{} - {}.mp3", performer, title),
                (None, Some(title)) => format!("{}.mp3", title),
                _ => format!("audio_{}.mp3", message_id),
            },
        }),
        AttachmentKind::Voice => Some(
            attachment
                .file_name
                .clone()
                .unwrap_or_else(|| format!("voice_{}.ogg", message_id)),
        ),
        AttachmentKind::Document => {
            let mime = attachment.mime_type.as_deref();
            match &attachment.file_name {
                Some(name) if is_audio_mime(mime) || is_audio_file(name) => Some(name.clone()),
                None if is_audio_mime(mime) => Some(format!(
                    "audio_{}{}",
                    message_id,
                    extension_for_mime(mime.unwrap_or_default())
                )),
                _ => None,
            }
        }
    }
}
