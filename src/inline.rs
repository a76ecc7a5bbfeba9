use base64::{engine::general_purpose, Engine};
use image::ImageFormat;

use crate::client::CardClient;
use crate::{CardError, Result};

/// Where the `href` of an [`InlinedAsset`] points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// Content embedded as a `data:` URI, readable without network access.
    Inlined,
    /// Still the remote URL, inlining failed.
    Remote,
}

/// An image reference ready to be placed on the card surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedAsset {
    /// The remote URL the asset was fetched from.
    pub source: String,
    pub href: String,
    pub provenance: Provenance,
}

impl InlinedAsset {
    pub fn remote<S: Into<String>>(source: S) -> Self {
        let source = source.into();
        Self {
            href: source.clone(),
            source,
            provenance: Provenance::Remote,
        }
    }

    /// Embed already fetched image bytes.
    pub fn from_bytes<S: Into<String>>(source: S, bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(CardError::Inline("empty payload".into()));
        }
        let format = image::guess_format(bytes)
            .map_err(|e| CardError::Inline(e.to_string()))?;
        let mime = mime_type(format).ok_or_else(|| {
            CardError::Inline(format!("unsupported image format {format:?}"))
        })?;
        image::load_from_memory_with_format(bytes, format)
            .map_err(|e| CardError::Inline(e.to_string()))?;

        Ok(Self {
            source: source.into(),
            href: format!(
                "data:{mime};base64,{}",
                general_purpose::STANDARD.encode(bytes)
            ),
            provenance: Provenance::Inlined,
        })
    }

    pub fn is_inlined(&self) -> bool {
        self.provenance == Provenance::Inlined
    }
}

fn mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Fetch `url` and embed it as a `data:` URI.
pub async fn inline(client: &CardClient, url: &str) -> Result<InlinedAsset> {
    let parsed = url::Url::parse(url).map_err(|e| CardError::Inline(e.to_string()))?;
    let response = CardClient::send(client.get(parsed))
        .await
        .map_err(|e| CardError::Inline(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CardError::Inline(format!("{url} returned {status}")));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CardError::Inline(e.to_string()))?;
    InlinedAsset::from_bytes(url, &bytes)
}

/// Inline `url`, keeping the remote URL when that fails.
pub async fn inline_or_fallback(client: &CardClient, url: &str) -> InlinedAsset {
    match inline(client, url).await {
        Ok(asset) => asset,
        Err(e) => {
            log::warn!("keeping remote image {url}: {e}");
            InlinedAsset::remote(url)
        }
    }
}
