use chrono::{DateTime, Utc};

/// What kind of document a message carries, as far as audio is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// A music track (audio attribute without the voice flag).
    Audio,
    /// A recorded voice note.
    Voice,
    /// Any other document; may still be audio by MIME type or extension.
    Document,
}

/// Library-independent view of a message's document attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub size: Option<u64>,
}

impl Attachment {
    pub fn new(kind: AttachmentKind) -> Self {
        Self {
            kind,
            file_name: None,
            mime_type: None,
            title: None,
            performer: None,
            size: None,
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = non_empty(name.into());
        self
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = non_empty(mime.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn with_performer(mut self, performer: impl Into<String>) -> Self {
        self.performer = non_empty(performer.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Wire values use empty strings for "absent".
pub(crate) fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// A single entry of a channel's history.
///
/// `media` is the opaque handle the history implementation needs to fetch the
/// attachment's bytes later; `attachment` is its parsed description.
#[derive(Debug, Clone)]
pub struct ChannelMessage<M> {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub attachment: Option<Attachment>,
    pub media: Option<M>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_drops_empty_strings() {
        let a = Attachment::new(AttachmentKind::Audio)
            .with_title("")
            .with_performer("  ")
            .with_file_name("song.mp3");
        assert_eq!(a.title, None);
        assert_eq!(a.performer, None);
        assert_eq!(a.file_name.as_deref(), Some("song.mp3"));
    }
}
