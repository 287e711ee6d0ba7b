//! Fetch-then-transform pipeline.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::MediaConfig;
use crate::error::{FetchError, MediaError, MediaResult};
use crate::fetch::{HttpImageFetcher, ImageSource};
use crate::transform::{ImageTransformer, RasterTransformer, Transform};

/// Downloads an image and transforms it off the async workers.
#[derive(Clone)]
pub struct ImagePipeline {
    source: Arc<dyn ImageSource>,
    transformer: Arc<dyn ImageTransformer>,
}

impl ImagePipeline {
    pub fn new(source: Arc<dyn ImageSource>, transformer: Arc<dyn ImageTransformer>) -> Self {
        Self {
            source,
            transformer,
        }
    }

    /// HTTP fetcher plus [`RasterTransformer`].
    pub fn from_config(config: &MediaConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            Arc::new(HttpImageFetcher::new(config)?),
            Arc::new(RasterTransformer::new()),
        ))
    }

    /// Fetches `url` and applies `transform`.
    ///
    /// A failed fetch returns before the transformer is touched.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn process(&self, url: &str, transform: Transform) -> MediaResult<Vec<u8>> {
        let bytes = self.source.fetch(url).await?;
        debug!(len = bytes.len(), ?transform, "Transforming image");

        let transformer = Arc::clone(&self.transformer);
        let output = tokio::task::spawn_blocking(move || transformer.apply(&bytes, transform))
            .await
            .map_err(|e| MediaError::Join(e.to_string()))??;
        Ok(output)
    }
}

impl std::fmt::Debug for ImagePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::assert_ok;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::error::TransformError;
    use crate::transform::tests::sample_png;

    #[derive(Default)]
    struct CountingTransformer {
        calls: AtomicUsize,
    }

    impl ImageTransformer for CountingTransformer {
        fn rotate(&self, bytes: &[u8], _degrees: i32) -> Result<Vec<u8>, TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(bytes.to_vec())
        }

        fn greyscale(&self, bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(bytes.to_vec())
        }
    }

    fn pipeline(transformer: Arc<dyn ImageTransformer>) -> ImagePipeline {
        ImagePipeline::new(
            Arc::new(HttpImageFetcher::new(&MediaConfig::default()).unwrap()),
            transformer,
        )
    }

    #[tokio::test]
    async fn test_http_error_skips_transform() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transformer = Arc::new(CountingTransformer::default());
        let err = pipeline(transformer.clone())
            .process(&format!("{}/img.png", server.uri()), Transform::Greyscale)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Fetch(FetchError::Status(500))));
        assert_eq!(transformer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_rotate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(sample_png()))
            .mount(&server)
            .await;

        let out = assert_ok!(
            pipeline(Arc::new(RasterTransformer))
                .process(&format!("{}/img.png", server.uri()), Transform::Rotate(90))
                .await
        );
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (1, 2));
    }

    #[tokio::test]
    async fn test_transform_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"junk".to_vec()))
            .mount(&server)
            .await;

        let err = pipeline(Arc::new(RasterTransformer))
            .process(&format!("{}/img.png", server.uri()), Transform::Greyscale)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::Transform(TransformError::Decode(_))));
    }
}
