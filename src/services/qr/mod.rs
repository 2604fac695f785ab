//! QR asset rendering and publishing

mod image_host;

use async_trait::async_trait;
use qrcode::QrCode;
use qrcode::render::svg;

use crate::errors::{QrShortenError, Result};

pub use image_host::ImageHostPublisher;

/// Publishes a QR image for a short URL and returns where it is hosted.
#[async_trait]
pub trait QrPublisher: Send + Sync {
    /// `Ok(None)` means no asset is kept for this link.
    async fn publish(&self, short_url: &str, code: &str) -> Result<Option<String>>;
}

/// 不生成二维码（image_host.enabled = false）
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledQrPublisher;

#[async_trait]
impl QrPublisher for DisabledQrPublisher {
    async fn publish(&self, _short_url: &str, _code: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Encodes `data` as an SVG document at least `size` pixels wide.
pub fn render_qr_svg(data: &str, size: u32) -> Result<String> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| QrShortenError::upstream(format!("QR encoding failed: {}", e)))?;

    Ok(code
        .render::<svg::Color>()
        .min_dimensions(size, size)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build())
}
