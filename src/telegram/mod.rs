//! Telegram service boundary.
//!
//! Everything that talks to the MTProto client library lives here: connecting,
//! logging in, resolving the channel, and adapting its messages and file
//! transfers to the [`ChannelHistory`] / [`MediaDownload`] traits the download
//! engine consumes. The engine never sees a `grammers` type.

pub mod auth;
pub mod error;
pub mod media;
pub mod session;
pub mod types;

use grammers_client::types::{Chat, Downloadable, Media};
use grammers_client::{Client, Config, InitParams};
use grammers_session::Session;
use tokio::sync::mpsc;

use crate::types::ChannelRef;
use self::media::attachment_from_media;
pub use self::error::TelegramError;
pub use self::types::{Attachment, AttachmentKind, ChannelMessage};

/// Messages buffered ahead of the consumer while it is busy downloading.
const MESSAGE_PREFETCH: usize = 64;
/// File chunks buffered ahead of the disk writer.
const CHUNK_PREFETCH: usize = 4;

/// Sequential access to one channel's history, newest message first.
#[async_trait::async_trait]
pub trait ChannelHistory: Send {
    /// Opaque handle used to fetch an attachment's bytes.
    type Media: Send + Sync;
    type Download: MediaDownload;

    /// Number of messages the scan will visit, when the service reports it.
    async fn total(&mut self) -> Option<u64> {
        None
    }

    async fn next_message(
        &mut self,
    ) -> Result<Option<ChannelMessage<Self::Media>>, TelegramError>;

    fn download(&self, media: &Self::Media) -> Self::Download;
}

/// A chunked file transfer. `Ok(None)` marks the end of the file.
#[async_trait::async_trait]
pub trait MediaDownload: Send {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TelegramError>;
}

/// Open a connection using the given session.
pub async fn connect(api_id: i32, api_hash: &str, session: Session) -> Result<Client, TelegramError> {
    tracing::info!("Connecting to Telegram...");
    let client = Client::connect(Config {
        session,
        api_id,
        api_hash: api_hash.to_string(),
        params: InitParams::default(),
    })
    .await
    .map_err(|e| TelegramError::Connect(e.to_string()))?;
    tracing::info!("Connected successfully");
    Ok(client)
}

/// Find the chat the operator asked for.
///
/// Usernames resolve through the server. Numeric ids need an access hash the
/// client only has for chats it has seen, so they are matched against the
/// account's dialog list.
pub async fn resolve_channel(client: &Client, channel: &ChannelRef) -> Result<Chat, TelegramError> {
    match channel {
        ChannelRef::Username(name) => client
            .resolve_username(name)
            .await
            .map_err(TelegramError::invocation)?
            .ok_or_else(|| TelegramError::ChannelNotFound(channel.to_string())),
        ChannelRef::Id(id) => {
            let mut dialogs = client.iter_dialogs();
            while let Some(dialog) = dialogs.next().await.map_err(TelegramError::invocation)? {
                if dialog.chat().id() == *id {
                    return Ok(dialog.chat().clone());
                }
            }
            Err(TelegramError::ChannelNotFound(channel.to_string()))
        }
    }
}

/// [`ChannelHistory`] over a live Telegram chat.
///
/// A background task pages through the history and feeds a bounded channel,
/// so the next page is fetched while the current file downloads.
pub struct TelegramHistory {
    client: Client,
    total: Option<u64>,
    rx: mpsc::Receiver<Result<ChannelMessage<Media>, TelegramError>>,
    pager: tokio::task::JoinHandle<()>,
}

impl TelegramHistory {
    pub async fn open(client: &Client, chat: &Chat, limit: Option<usize>) -> Self {
        let mut messages = client.iter_messages(chat.pack());
        if let Some(limit) = limit {
            messages = messages.limit(limit);
        }

        let total = match messages.total().await {
            Ok(n) => {
                let n = n as u64;
                Some(limit.map_or(n, |l| n.min(l as u64)))
            }
            Err(e) => {
                tracing::debug!("Could not fetch message count: {}", e);
                None
            }
        };

        let (tx, rx) = mpsc::channel(MESSAGE_PREFETCH);
        let pager = tokio::spawn(async move {
            loop {
                let item = match messages.next().await {
                    Ok(Some(msg)) => {
                        let msg_media = msg.media();
                        Ok(ChannelMessage {
                            id: msg.id(),
                            date: msg.date(),
                            attachment: msg_media.as_ref().and_then(attachment_from_media),
                            media: msg_media,
                        })
                    }
                    Ok(None) => break,
                    Err(e) => Err(TelegramError::invocation(e)),
                };
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
        });

        Self {
            client: client.clone(),
            total,
            rx,
            pager,
        }
    }
}

impl Drop for TelegramHistory {
    fn drop(&mut self) {
        self.pager.abort();
    }
}

#[async_trait::async_trait]
impl ChannelHistory for TelegramHistory {
    type Media = Media;
    type Download = TelegramDownload;

    async fn total(&mut self) -> Option<u64> {
        self.total
    }

    async fn next_message(&mut self) -> Result<Option<ChannelMessage<Media>>, TelegramError> {
        self.rx.recv().await.transpose()
    }

    fn download(&self, media: &Media) -> TelegramDownload {
        TelegramDownload::start(&self.client, media)
    }
}

/// [`MediaDownload`] backed by the client's chunked file iterator.
pub struct TelegramDownload {
    rx: mpsc::Receiver<Result<Vec<u8>, TelegramError>>,
    fetcher: tokio::task::JoinHandle<()>,
}

impl TelegramDownload {
    fn start(client: &Client, media: &Media) -> Self {
        let mut chunks = client.iter_download(&Downloadable::Media(media.clone()));
        let (tx, rx) = mpsc::channel(CHUNK_PREFETCH);
        let fetcher = tokio::spawn(async move {
            loop {
                let item = match chunks.next().await {
                    Ok(Some(chunk)) => Ok(chunk),
                    Ok(None) => break,
                    Err(e) => Err(TelegramError::invocation(e)),
                };
                let failed = item.is_err();
                if tx.send(item).await.is_err() || failed {
                    break;
                }
            }
        });
        Self { rx, fetcher }
    }
}

impl Drop for TelegramDownload {
    fn drop(&mut self) {
        self.fetcher.abort();
    }
}

#[async_trait::async_trait]
impl MediaDownload for TelegramDownload {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TelegramError> {
        self.rx.recv().await.transpose()
    }
}
