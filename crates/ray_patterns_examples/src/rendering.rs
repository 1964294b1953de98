use std::path::Path;

use anyhow::Context;
use glam::{DVec2, DVec3};
use image::{Rgb, RgbImage, RgbaImage};
use ray_patterns::prelude::*;

/// Region of the X-Y plane rendered into a swatch.
#[derive(Debug, Clone, Copy)]
pub struct SwatchConfig {
    pub size: (u32, u32),
    /// Lower left corner in pattern space.
    pub origin: DVec2,
    /// Width and height in pattern space.
    pub extent: DVec2,
    /// Z coordinate of the sampled plane.
    pub z: f64,
    pub background: [u8; 3],
}

impl SwatchConfig {
    pub fn new(size: (u32, u32), extent: DVec2) -> Self {
        Self {
            size,
            origin: DVec2::ZERO,
            extent,
            z: 0.0,
            background: [236, 238, 242],
        }
    }

    pub fn with_origin(mut self, origin: DVec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    pub fn with_background(mut self, background: [u8; 3]) -> Self {
        self.background = background;
        self
    }

    /// Pattern space point at the centre of pixel `(x, y)`; row 0 is the top row.
    pub fn point(&self, x: u32, y: u32) -> DVec3 {
        let (w, h) = self.size;
        let u = (f64::from(x) + 0.5) / f64::from(w.max(1));
        let v = 1.0 - (f64::from(y) + 0.5) / f64::from(h.max(1));
        let p = self.origin + DVec2::new(u, v) * self.extent;
        DVec3::new(p.x, p.y, self.z)
    }
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Shades every pixel with `shade` and writes the result to `path`.
fn render_to_png<F>(config: &SwatchConfig, path: &str, mut shade: F) -> anyhow::Result<()>
where
    F: FnMut(DVec3) -> anyhow::Result<Option<[u8; 3]>>,
{
    let (w, h) = config.size;
    let mut img = RgbImage::from_pixel(w, h, Rgb(config.background));
    for y in 0..h {
        for x in 0..w {
            if let Some(rgb) = shade(config.point(x, y))? {
                img.put_pixel(x, y, Rgb(rgb));
            }
        }
    }
    img.save(path).with_context(|| format!("writing {path}"))?;
    println!("Saved {path}");
    Ok(())
}

/// Renders the pattern value as greyscale.
pub fn render_pattern_to_png(
    pattern: &Pattern,
    ctx: &mut ThreadContext,
    config: &SwatchConfig,
    path: &str,
) -> anyhow::Result<()> {
    render_to_png(config, path, |p| {
        let v = to_byte(pattern.evaluate(p, None, ctx)?);
        Ok(Some([v, v, v]))
    })
}

/// Renders a pigment; points without a color keep the background.
///
/// Filter and transmit are composited over the background.
pub fn render_pigment_to_png(
    pigment: &Pigment,
    ctx: &mut ThreadContext,
    config: &SwatchConfig,
    path: &str,
) -> anyhow::Result<()> {
    let background = DVec3::new(
        f64::from(config.background[0]),
        f64::from(config.background[1]),
        f64::from(config.background[2]),
    ) / 255.0;
    render_to_png(config, path, |p| {
        let Some(color) = pigment.compute(p, None, ctx)? else {
            return Ok(None);
        };
        let filter = color.filter.clamp(0.0, 1.0);
        let transmit = color.transmit.clamp(0.0, 1.0 - filter);
        let rgb = color.rgb * (1.0 - filter - transmit)
            + background * color.rgb * filter
            + background * transmit;
        Ok(Some([to_byte(rgb.x), to_byte(rgb.y), to_byte(rgb.z)]))
    })
}

/// Renders several pigments side by side into one image, one column each.
pub fn render_swatch_sheet(
    pigments: &[(&str, Pigment)],
    ctx: &mut ThreadContext,
    config: &SwatchConfig,
    path: &str,
) -> anyhow::Result<()> {
    let (w, h) = config.size;
    let count = u32::try_from(pigments.len().max(1))?;
    let mut sheet = RgbImage::from_pixel(w * count, h, Rgb(config.background));
    for (column, (name, pigment)) in pigments.iter().enumerate() {
        let offset = u32::try_from(column)? * w;
        for y in 0..h {
            for x in 0..w {
                let color = pigment
                    .compute(config.point(x, y), None, ctx)
                    .with_context(|| format!("evaluating {name}"))?;
                if let Some(color) = color {
                    sheet.put_pixel(
                        offset + x,
                        y,
                        Rgb([
                            to_byte(color.rgb.x),
                            to_byte(color.rgb.y),
                            to_byte(color.rgb.z),
                        ]),
                    );
                }
            }
        }
    }
    sheet.save(path).with_context(|| format!("writing {path}"))?;
    println!("Saved {path}");
    Ok(())
}

/// A decoded PNG used as an image map. Alpha becomes transmit.
pub struct PngImageSource {
    image: RgbaImage,
    opaque: bool,
}

impl PngImageSource {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("loading {}", path.display()))?
            .to_rgba8();
        Ok(Self::from_image(image))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        let opaque = image.pixels().all(|p| p[3] == u8::MAX);
        Self { image, opaque }
    }
}

impl ImageSource for PngImageSource {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn sample(&self, uv: DVec2) -> TransColor {
        let (w, h) = self.image.dimensions();
        let x = ((uv.x * f64::from(w)) as u32).min(w.saturating_sub(1));
        // PNG rows are stored top-down.
        let y = (((1.0 - uv.y) * f64::from(h)) as u32).min(h.saturating_sub(1));
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        let channel = |c: u8| f64::from(c) / 255.0;
        TransColor::rgbft(channel(r), channel(g), channel(b), 0.0, 1.0 - channel(a))
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }
}
