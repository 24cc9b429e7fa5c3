pub mod image_processing;

use crate::error::AppResult;
use crate::ports::TextExtractor;
use async_trait::async_trait;
use image::DynamicImage;
use tracing::info;

/// Text recognition engine working on decoded images
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> AppResult<String>;
}

/// Decodes and straightens screenshots before handing them to a recognizer
pub struct PreprocessingExtractor<R> {
    recognizer: R,
}

impl<R: TextRecognizer> PreprocessingExtractor<R> {
    pub fn new(recognizer: R) -> Self {
        Self { recognizer }
    }
}

#[async_trait]
impl<R: TextRecognizer> TextExtractor for PreprocessingExtractor<R> {
    async fn extract(&self, image_data: &[u8]) -> AppResult<String> {
        let image = image_processing::preprocess_schedule_image(image_data)?;
        let text = self.recognizer.recognize(&image).await?;

        info!("Recognized {} lines of text", text.lines().count());
        Ok(text)
    }
}
