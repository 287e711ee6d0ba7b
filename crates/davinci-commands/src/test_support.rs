//! A fully installed bot over a recording gateway, for command tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use davinci_core::{InboundEvent, MessageRef, MessageView, TextMessage};
use davinci_framework::testing::{RecordingGateway, text_message};
use davinci_framework::{RuntimeContext, Router};
use davinci_media::{FetchError, ImagePipeline, ImageSource, ImageTransformer, TransformError};
use davinci_storage::{BookmarkStore, MemoryBookmarkStore};

/// Serves the same bytes for every URL, or a fixed HTTP status.
#[derive(Default)]
pub(crate) struct FakeImages {
    pub status: Option<u16>,
    pub fetches: AtomicUsize,
}

#[async_trait]
impl ImageSource for FakeImages {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match self.status {
            Some(status) => Err(FetchError::Status(status)),
            None => Ok(b"pixels".to_vec()),
        }
    }
}

/// Tags the bytes with the operation instead of touching pixels.
#[derive(Default)]
pub(crate) struct TaggingTransformer {
    pub calls: AtomicUsize,
}

impl ImageTransformer for TaggingTransformer {
    fn rotate(&self, bytes: &[u8], degrees: i32) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([format!("rotate{degrees}:").as_bytes(), bytes].concat())
    }

    fn greyscale(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok([b"grey:".as_slice(), bytes].concat())
    }
}

pub(crate) struct Bot {
    pub router: Router,
    pub gateway: Arc<RecordingGateway>,
    pub store: Arc<dyn BookmarkStore>,
    pub images: Arc<FakeImages>,
    pub transformer: Arc<TaggingTransformer>,
}

pub(crate) fn bot_with_images(images: FakeImages) -> Bot {
    let gateway = RecordingGateway::new();
    let store: Arc<dyn BookmarkStore> = Arc::new(MemoryBookmarkStore::new());
    let images = Arc::new(images);
    let transformer = Arc::new(TaggingTransformer::default());
    let pipeline = ImagePipeline::new(images.clone(), transformer.clone());

    let mut builder = RuntimeContext::builder(gateway.clone());
    builder
        .service::<dyn BookmarkStore>(store.clone())
        .service::<ImagePipeline>(Arc::new(pipeline));
    crate::install(&mut builder).unwrap();

    Bot {
        router: Router::new(builder.build()),
        gateway,
        store,
        images,
        transformer,
    }
}

pub(crate) fn full_bot() -> Bot {
    bot_with_images(FakeImages::default())
}

pub(crate) fn bot() -> (Router, Arc<RecordingGateway>) {
    let bot = full_bot();
    (bot.router, bot.gateway)
}

pub(crate) fn text(id: &str, author: &str, content: &str) -> MessageView {
    text_message(id, author, content)
}

/// A text message replying to `target`.
pub(crate) fn reply_to(id: &str, author: &str, content: &str, target: &str) -> MessageView {
    let mut message = text(id, author, content);
    message.reference = Some(MessageRef::new(message.channel_id.clone(), target));
    message
}

pub(crate) trait IntoEvent {
    fn into_event(self) -> InboundEvent;
}

impl IntoEvent for MessageView {
    fn into_event(self) -> InboundEvent {
        InboundEvent::TextMessage(TextMessage { message: self })
    }
}

/// Titles of every embed sent with `respond`, in order.
pub(crate) fn reply_titles(gateway: &RecordingGateway) -> Vec<String> {
    gateway
        .responses()
        .iter()
        .flat_map(|r| r.embeds.iter())
        .filter_map(|e| e.title.clone())
        .collect()
}
