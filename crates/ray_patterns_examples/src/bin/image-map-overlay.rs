use std::sync::Arc;

use glam::{DVec2, DVec3};
use image::{Rgba, RgbaImage};
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_pigment_to_png, PngImageSource, SwatchConfig};

/// A translucent ring on a clear background.
fn ring_image(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let c = f64::from(size) * 0.5;
        let d = ((f64::from(x) + 0.5 - c).hypot(f64::from(y) + 0.5 - c)) / c;
        if (0.55..0.85).contains(&d) {
            Rgba([250, 180, 40, 200])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn main() -> anyhow::Result<()> {
    let source: Arc<dyn ImageSource> = Arc::new(PngImageSource::from_image(ring_image(64)));

    // Shown once over the unit square; elsewhere the granite underneath shows.
    let ring = Arc::new(Pigment::image(ImageMap::new(source).with_once(true)));
    let mut granite = Pigment::with_default_map(Pattern::new(PatternKind::Granite));
    granite.post()?;

    let map = BlendMap::new(
        BlendMapKind::Pigment,
        [(0.0, ring), (1.0, Arc::new(granite))],
    )?;
    let mut overlay = Pigment::patterned(
        Pattern::new(PatternKind::Gradient(DVec3::Y)).with_frequency(0.5),
        map,
    );
    overlay.post()?;
    println!("overlay has filter: {}", overlay.has_filter());

    let mut ctx = ThreadContext::new(RenderSettings::new())?;
    let config = SwatchConfig::new((400, 400), DVec2::splat(1.0));
    render_pigment_to_png(&overlay, &mut ctx, &config, "image-map-overlay.png")?;
    Ok(())
}
