//! Poster compositor: rasterizes every layer onto one poster-sized surface.
//!
//! Layers are painted strictly in list order. Each image decode is awaited
//! before the next layer is drawn, so the paint order never depends on how
//! long a decode takes.

use posterkit_common::error::{PosterError, PosterResult};
use posterkit_layout::resolver::PosterLayout;
use posterkit_poster_model::layer::{ImageSource, Layer, LayerContent};
use posterkit_poster_model::palette::Rgba;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::images::load_layer_image;
use crate::text::{draw_text_layer, FontStore};

/// Compositor settings.
#[derive(Debug, Clone)]
pub struct CompositeOptions {
    /// Raster pixels per layout unit.
    pub scale: f64,

    /// Surface fill before any layer is drawn.
    pub background: Rgba,

    /// Refuse surfaces with more pixels than this.
    pub max_surface_pixels: u64,
}

impl CompositeOptions {
    pub fn new(scale: f64, max_surface_pixels: u64) -> Self {
        Self {
            scale,
            background: Rgba::WHITE,
            max_surface_pixels,
        }
    }
}

/// The composited poster.
pub struct CompositedPoster {
    pub pixmap: Pixmap,

    /// Pixels per layout unit used to build `pixmap`.
    pub scale: f64,

    /// Ids of image layers left blank because they could not be decoded.
    pub skipped_layers: Vec<String>,
}

impl std::fmt::Debug for CompositedPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositedPoster")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("scale", &self.scale)
            .field("skipped_layers", &self.skipped_layers)
            .finish()
    }
}

/// Surface dimensions for a layout at `scale` pixels per unit.
pub fn surface_size(layout: &PosterLayout, scale: f64) -> (u64, u64) {
    let width = (layout.poster_width * scale).round().max(1.0) as u64;
    let height = (layout.poster_height * scale).round().max(1.0) as u64;
    (width, height)
}

/// Fail when the surface would exceed the raster limit.
pub fn check_surface(layout: &PosterLayout, options: &CompositeOptions) -> PosterResult<(u32, u32)> {
    if !(options.scale.is_finite() && options.scale > 0.0) {
        return Err(PosterError::invalid_config(
            "scale",
            options.scale,
            "must be a positive number",
        ));
    }
    let (width, height) = surface_size(layout, options.scale);
    let too_large = || PosterError::SurfaceTooLarge { width, height };
    if width.saturating_mul(height) > options.max_surface_pixels {
        return Err(too_large());
    }
    let width = u32::try_from(width).map_err(|_| too_large())?;
    let height = u32::try_from(height).map_err(|_| too_large())?;
    Ok((width, height))
}

/// Render all layers onto a new surface sized to the poster.
pub async fn composite(
    layout: &PosterLayout,
    layers: &[Layer],
    options: &CompositeOptions,
    fonts: &FontStore,
) -> PosterResult<CompositedPoster> {
    let (width, height) = check_surface(layout, options)?;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| PosterError::render(format!("cannot allocate {width}x{height} surface")))?;
    let bg = options.background;
    pixmap.fill(Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

    tracing::debug!(
        width,
        height,
        scale = options.scale,
        layers = layers.len(),
        "Compositing poster"
    );

    let mut skipped_layers = Vec::new();
    for layer in layers {
        let drawn = match &layer.content {
            LayerContent::Image(source) => draw_image_layer(&mut pixmap, layer, source).await,
            LayerContent::Text(text) => {
                let rect = layer.bounds.to_surface(width as f64, height as f64);
                match draw_text_layer(
                    &mut pixmap,
                    fonts,
                    text,
                    &rect,
                    layer.rotation,
                    layer.opacity,
                    &layer.text_style(),
                ) {
                    Ok(_) => true,
                    Err(err) if !err.is_fatal() => {
                        tracing::warn!(layer_id = %layer.id, error = %err, "Skipping text layer");
                        false
                    }
                    Err(err) => return Err(err),
                }
            }
        };
        if !drawn {
            skipped_layers.push(layer.id.clone());
        }
    }

    Ok(CompositedPoster {
        pixmap,
        scale: options.scale,
        skipped_layers,
    })
}

/// Draw an image layer stretched into its bounds. Returns false when the
/// image could not be decoded.
async fn draw_image_layer(pixmap: &mut Pixmap, layer: &Layer, source: &ImageSource) -> bool {
    let Some(image) = load_layer_image(&layer.id, source).await else {
        return false;
    };

    let rect = layer
        .bounds
        .to_surface(pixmap.width() as f64, pixmap.height() as f64);
    let (cx, cy) = rect.center();
    let sx = rect.width / image.width() as f64;
    let sy = rect.height / image.height() as f64;

    let transform = Transform::from_rotate_at(layer.rotation as f32, cx as f32, cy as f32)
        .pre_translate(rect.x as f32, rect.y as f32)
        .pre_scale(sx as f32, sy as f32);

    let paint = PixmapPaint {
        opacity: layer.opacity.clamp(0.0, 1.0) as f32,
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::tests::solid_png;
    use posterkit_layout::resolver::resolve_layout;
    use posterkit_poster_model::config::PosterConfig;
    use posterkit_poster_model::geometry::FracRect;

    fn layout_100mm() -> PosterLayout {
        // A4 with a 5mm margin, SIZE mode 100x50mm.
        let config = PosterConfig {
            mode: posterkit_poster_model::config::SizingMode::Size,
            target_width: 100.0,
            target_height: 50.0,
            margin: 5.0,
            ..PosterConfig::default()
        };
        resolve_layout(&config).unwrap()
    }

    fn image_layer(id: &str, rgba: [u8; 4], bounds: FracRect) -> Layer {
        let png = solid_png(4, 4, rgba);
        let mut layer = Layer::image(id, ImageSource::from_bytes(&png, "image/png"));
        layer.bounds = bounds;
        layer
    }

    #[test]
    fn test_surface_size_rounds() {
        let layout = layout_100mm();
        assert_eq!(surface_size(&layout, 2.0), (200, 100));
        assert_eq!(surface_size(&layout, 0.333), (33, 17));
    }

    #[test]
    fn test_surface_limit_is_enforced_before_allocation() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(10.0, 1_000);
        let err = check_surface(&layout, &options).unwrap_err();
        assert!(matches!(
            err,
            PosterError::SurfaceTooLarge {
                width: 1000,
                height: 500
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_poster_is_white() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        let out = composite(&layout, &[], &options, &FontStore::empty())
            .await
            .unwrap();
        assert_eq!((out.pixmap.width(), out.pixmap.height()), (100, 50));
        let px = out.pixmap.pixel(50, 25).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 255, 255, 255));
    }

    #[tokio::test]
    async fn test_later_layers_paint_over_earlier() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        let layers = vec![
            image_layer("red", [255, 0, 0, 255], FracRect::new(0.0, 0.0, 0.6, 1.0)),
            image_layer("blue", [0, 0, 255, 255], FracRect::new(0.4, 0.0, 0.6, 1.0)),
        ];
        let out = composite(&layout, &layers, &options, &FontStore::empty())
            .await
            .unwrap();

        let left = out.pixmap.pixel(10, 25).unwrap();
        assert_eq!((left.red(), left.blue()), (255, 0));
        let overlap = out.pixmap.pixel(50, 25).unwrap();
        assert_eq!((overlap.red(), overlap.blue()), (0, 255));
        let right = out.pixmap.pixel(90, 25).unwrap();
        assert_eq!((right.red(), right.blue()), (0, 255));
        assert!(out.skipped_layers.is_empty());
    }

    #[tokio::test]
    async fn test_opacity_blends_with_background() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        let mut layer = image_layer("black", [0, 0, 0, 255], FracRect::FULL);
        layer.opacity = 0.5;
        let out = composite(&layout, &[layer], &options, &FontStore::empty())
            .await
            .unwrap();
        let px = out.pixmap.pixel(50, 25).unwrap();
        assert!((px.red() as i32 - 128).abs() <= 2, "got {}", px.red());
    }

    #[tokio::test]
    async fn test_broken_image_is_skipped_not_fatal() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        let mut broken = Layer::image("broken", ImageSource::from_bytes(b"nope", "image/png"));
        broken.bounds = FracRect::FULL;
        let ok = image_layer("ok", [0, 255, 0, 255], FracRect::new(0.0, 0.0, 0.5, 0.5));

        let out = composite(&layout, &[broken, ok], &options, &FontStore::empty())
            .await
            .unwrap();
        assert_eq!(out.skipped_layers, vec!["broken".to_string()]);
        let px = out.pixmap.pixel(10, 10).unwrap();
        assert_eq!(px.green(), 255);
        let untouched = out.pixmap.pixel(90, 40).unwrap();
        assert_eq!(untouched.red(), 255);
    }

    #[tokio::test]
    async fn test_text_with_control_characters_is_drawn() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        let layers = vec![
            Layer::text("bell", "Bell\u{7}here"),
            Layer::text("feed", "page\u{c}break\u{1b}"),
        ];
        let out = composite(&layout, &layers, &options, &FontStore::empty())
            .await
            .unwrap();
        assert!(out.skipped_layers.is_empty());
    }

    #[tokio::test]
    async fn test_rotation_is_about_layer_center() {
        let layout = layout_100mm();
        let options = CompositeOptions::new(1.0, u64::MAX);
        // A wide strip rotated 90 degrees becomes a tall strip around the same center.
        let mut layer = image_layer("strip", [0, 0, 0, 255], FracRect::new(0.3, 0.45, 0.4, 0.1));
        layer.rotation = 90.0;
        let out = composite(&layout, &[layer], &options, &FontStore::empty())
            .await
            .unwrap();

        let center = out.pixmap.pixel(50, 25).unwrap();
        assert_eq!(center.red(), 0);
        // Former horizontal extent is now white.
        let old_end = out.pixmap.pixel(35, 25).unwrap();
        assert_eq!(old_end.red(), 255);
        // New vertical extent is black.
        let new_end = out.pixmap.pixel(50, 8).unwrap();
        assert_eq!(new_end.red(), 0);
    }
}
