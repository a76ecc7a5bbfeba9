use std::path::{Path, PathBuf};
use std::sync::Arc;

use resvg::tiny_skia;
use usvg::fontdb;

use crate::render::{AssetPolicy, CardSurface};
use crate::{ExportFailure, Result};

pub const FILENAME_SUFFIX: &str = "-pokemon-card.png";
const FALLBACK_STEM: &str = "github";
const MAX_SCALE: f32 = 8.0;

/// Download name for a card: resolved login, else the typed username, else
/// a generic stem. Empty strings count as absent.
pub fn card_filename(login: Option<&str>, username: Option<&str>) -> String {
    let stem = [login, username]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);
    format!("{stem}{FILENAME_SUFFIX}")
}

/// How the exporter treats images that could not be inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteAssets {
    /// Log a warning and draw the placeholder instead.
    #[default]
    Omit,
    /// Fail the export.
    Reject,
}

/// A rasterized card, ready to be written out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub filename: String,
    pub png: Vec<u8>,
}

impl Export {
    /// Write the PNG into `dir` under its download name.
    pub fn save_in<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.filename);
        std::fs::write(&path, &self.png)?;
        log::debug!("wrote {} bytes to {}", self.png.len(), path.display());
        Ok(path)
    }
}

/// Rasterizes card surfaces into PNG images.
#[derive(Clone)]
pub struct CardExporter {
    fontdb: Arc<fontdb::Database>,
    scale: f32,
    remote: RemoteAssets,
}

impl CardExporter {
    /// Exporter using the fonts installed on this machine.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        log::debug!("loaded {} font faces", db.len());
        Self::with_fonts(db)
    }

    pub fn with_fonts(db: fontdb::Database) -> Self {
        Self {
            fontdb: Arc::new(db),
            scale: 1.0,
            remote: RemoteAssets::default(),
        }
    }

    /// Pixel ratio of the output, clamped to `(0, 8]`.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale.min(MAX_SCALE)
        } else {
            1.0
        };
        self
    }

    pub fn with_remote_assets(mut self, remote: RemoteAssets) -> Self {
        self.remote = remote;
        self
    }

    /// Rasterize `surface` into PNG bytes.
    ///
    /// Fails with [`ExportFailure::NoSurface`] when nothing was rendered yet.
    /// Images that were not inlined never reach the rasterizer.
    pub fn export_png(&self, surface: Option<&CardSurface>) -> Result<Vec<u8>> {
        let surface = surface.ok_or(ExportFailure::NoSurface)?;

        let remote = surface.view.remote_assets();
        if let Some(first) = remote.first() {
            match self.remote {
                RemoteAssets::Reject => {
                    return Err(ExportFailure::RemoteAsset((*first).to_owned()).into())
                }
                RemoteAssets::Omit => {
                    for url in &remote {
                        log::warn!("omitting image that was not inlined: {url}");
                    }
                }
            }
        }

        let svg = surface.svg(AssetPolicy::InlinedOnly);
        let mut options = usvg::Options::default();
        options.fontdb = self.fontdb.clone();
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| ExportFailure::Surface(e.to_string()))?;

        let width = (surface.width() as f32 * self.scale).ceil() as u32;
        let height = (surface.height() as f32 * self.scale).ceil() as u32;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| ExportFailure::Raster(format!("cannot allocate {width}x{height}")))?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut pixmap.as_mut(),
        );

        let png = pixmap
            .encode_png()
            .map_err(|e| ExportFailure::Raster(e.to_string()))?;
        log::debug!("rasterized card into {} bytes", png.len());
        Ok(png)
    }

    /// Rasterize `surface` and name the result for download.
    pub fn export(&self, surface: Option<&CardSurface>) -> Result<Export> {
        let png = self.export_png(surface)?;
        let filename = surface
            .map(|s| s.view.filename.clone())
            .unwrap_or_else(|| card_filename(None, None));
        Ok(Export { filename, png })
    }
}

impl Default for CardExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composer::{CardState, Phase, Slot};
    use crate::inline::tests::png_bytes;
    use crate::inline::InlinedAsset;
    use crate::species::tests::bulbasaur;
    use crate::{CardError, ExportFailure};
    use rstest::rstest;
    use tempdir::TempDir;

    fn exporter() -> CardExporter {
        crate::initialize();
        CardExporter::with_fonts(fontdb::Database::new())
    }

    fn surface_with_sprite(sprite: InlinedAsset) -> CardSurface {
        let state = CardState {
            epoch: 1,
            phase: Phase::Settled,
            username: Some("ash".into()),
            profile: Slot::Failed,
            species: Slot::Ready(bulbasaur()),
            sprite: Some(sprite),
            commits: Slot::Failed,
            error: Some("GitHub user not found".into()),
            ..CardState::default()
        };
        CardSurface::new(state.view())
    }

    #[rstest]
    #[case(Some("octocat"), Some("octo"), "octocat-pokemon-card.png")]
    #[case(None, Some("octo"), "octo-pokemon-card.png")]
    #[case(Some(""), Some("octo"), "octo-pokemon-card.png")]
    #[case(None, None, "github-pokemon-card.png")]
    #[case(Some(""), Some(""), "github-pokemon-card.png")]
    fn filenames(
        #[case] login: Option<&str>,
        #[case] username: Option<&str>,
        #[case] expected: &str,
    ) {
        assert_eq!(card_filename(login, username), expected);
    }

    #[test]
    fn missing_surface_fails() {
        assert!(matches!(
            exporter().export_png(None),
            Err(CardError::Export(ExportFailure::NoSurface))
        ));
    }

    #[test]
    fn inlined_surface_rasterizes() {
        let sprite = InlinedAsset::from_bytes("https://sprites.example/1.png", &png_bytes(16, 16))
            .unwrap();
        let surface = surface_with_sprite(sprite);

        let png = exporter().export_png(Some(&surface)).unwrap();
        assert!(!png.is_empty());

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 720);
        assert_eq!(decoded.height(), 440);
    }

    #[test]
    fn scale_multiplies_pixels() {
        let sprite = InlinedAsset::from_bytes("s", &png_bytes(2, 2)).unwrap();
        let surface = surface_with_sprite(sprite);

        let png = exporter().with_scale(2.0).export_png(Some(&surface)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1440, 880));
    }

    #[test]
    fn remote_assets_are_omitted_or_rejected() {
        let surface = surface_with_sprite(InlinedAsset::remote("https://sprites.example/1.png"));

        assert!(!exporter().export_png(Some(&surface)).unwrap().is_empty());

        let strict = exporter().with_remote_assets(RemoteAssets::Reject);
        assert!(matches!(
            strict.export_png(Some(&surface)),
            Err(CardError::Export(ExportFailure::RemoteAsset(url))) if url == "https://sprites.example/1.png"
        ));
    }

    #[test]
    fn export_is_saved_under_download_name() {
        let sprite = InlinedAsset::from_bytes("s", &png_bytes(2, 2)).unwrap();
        let surface = surface_with_sprite(sprite);
        let export = exporter().export(Some(&surface)).unwrap();
        assert_eq!(export.filename, "ash-pokemon-card.png");

        let dir = TempDir::new("card_export").unwrap();
        let path = export.save_in(dir.path()).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), export.png);
    }
}
