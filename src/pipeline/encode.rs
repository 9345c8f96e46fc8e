//! Image encoding: raw screenshot bytes → base64 PNG.
//!
//! Multimodal chat APIs take images as base64 data-URIs inside the JSON
//! request body. Every screenshot is decoded and re-encoded as PNG whatever
//! its upload format, so the layout call always sees one image type.

use crate::pipeline::input::Screenshot;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use std::io::Cursor;
use tracing::debug;

/// MIME type of every encoded screenshot.
pub const ENCODED_MIME: &str = "image/png";

/// A screenshot ready to attach to a multimodal request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 (standard alphabet) of the PNG bytes.
    pub base64: String,
    pub mime_type: String,
}

impl EncodedImage {
    /// `data:<mime>;base64,<payload>`
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// Convert into the provider's image attachment.
    ///
    /// `detail: "high"` lets GPT-4-class models tile the full-resolution
    /// screenshot; at `low` small navigation items and footers are lost.
    pub fn to_image_data(&self) -> ImageData {
        ImageData::new(self.base64.clone(), self.mime_type.clone()).with_detail("high")
    }
}

/// Decode a screenshot and re-encode it as a base64 PNG.
pub fn encode_screenshot(shot: &Screenshot) -> Result<EncodedImage, image::ImageError> {
    let img = image::load_from_memory(&shot.bytes)?;

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {} ({}x{}) → {} bytes base64",
        shot.name,
        img.width(),
        img.height(),
        b64.len()
    );

    Ok(EncodedImage {
        base64: b64,
        mime_type: ENCODED_MIME.to_string(),
    })
}
