//! Adapts the client library's raw TL document into an [`Attachment`].

use grammers_client::types::Media;
use grammers_tl_types as tl;

use super::types::{Attachment, AttachmentKind};

/// Describe the audio-relevant parts of a message's media, if it is a document.
///
/// Photos, stickers-as-photos, polls, geo points and the like yield `None`.
pub fn attachment_from_media(media: &Media) -> Option<Attachment> {
    match media {
        Media::Document(doc) => match doc.raw.document.as_ref()? {
            tl::enums::Document::Document(d) => Some(attachment_from_document(d)),
            tl::enums::Document::Empty(_) => None,
        },
        _ => None,
    }
}

pub(crate) fn attachment_from_document(doc: &tl::types::Document) -> Attachment {
    let mut kind = AttachmentKind::Document;
    let mut file_name = None;
    let mut title = None;
    let mut performer = None;

    for attr in &doc.attributes {
        match attr {
            tl::enums::DocumentAttribute::Audio(audio) => {
                kind = if audio.voice {
                    AttachmentKind::Voice
                } else {
                    AttachmentKind::Audio
                };
                title = audio.title.clone();
                performer = audio.performer.clone();
            }
            tl::enums::DocumentAttribute::Filename(f) => {
                file_name = Some(f.file_name.clone());
            }
            _ => {}
        }
    }

    let mut attachment = Attachment::new(kind).with_mime_type(doc.mime_type.clone());
    if let Some(name) = file_name {
        attachment = attachment.with_file_name(name);
    }
    if let Some(t) = title {
        attachment = attachment.with_title(t);
    }
    if let Some(p) = performer {
        attachment = attachment.with_performer(p);
    }
    if doc.size > 0 {
        attachment = attachment.with_size(doc.size as u64);
    }
    attachment
}
