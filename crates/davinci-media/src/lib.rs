//! # Da Vinci Media
//!
//! Image handling for the bot's transform commands: locating the first image
//! on a message, deriving the output extension, fetching the bytes over HTTP
//! and rotating or greyscaling them.

pub mod config;
pub mod error;
pub mod extension;
pub mod fetch;
pub mod locate;
pub mod pipeline;
pub mod transform;

pub use config::MediaConfig;
pub use error::{ExtensionError, FetchError, MediaError, MediaResult, TransformError};
pub use extension::{extension, output_filename};
pub use fetch::{HttpImageFetcher, ImageSource};
pub use locate::{first_image, image_urls};
pub use pipeline::ImagePipeline;
pub use transform::{ImageTransformer, RasterTransformer, Transform, normalize_degrees};
