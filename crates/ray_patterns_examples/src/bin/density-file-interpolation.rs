use glam::DVec2;
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_pattern_to_png, SwatchConfig};

/// A 6x6x1 grid of 16-bit samples forming a soft diagonal ramp with a bright centre.
fn density_bytes() -> Vec<u8> {
    const N: u16 = 6;
    let mut bytes = Vec::new();
    for size in [N, N, 1] {
        bytes.extend_from_slice(&size.to_be_bytes());
    }
    for y in 0..N {
        for x in 0..N {
            let ramp = f64::from(x + y) / f64::from(2 * (N - 1));
            let centre = if (2..4).contains(&x) && (2..4).contains(&y) {
                0.5
            } else {
                0.0
            };
            let v = ((ramp * 0.6 + centre).min(1.0) * f64::from(u16::MAX)) as u16;
            bytes.extend_from_slice(&v.to_be_bytes());
        }
    }
    bytes
}

fn main() -> anyhow::Result<()> {
    let file = DensityFile::from_bytes(&density_bytes())?;
    println!(
        "density grid {:?}, {} byte samples",
        file.size(),
        file.sample_width()
    );

    let mut ctx = ThreadContext::new(RenderSettings::new())?;
    let config = SwatchConfig::new((300, 300), DVec2::ONE).with_z(0.5);
    for (path, interpolation) in [
        ("density-nearest.png", DensityInterpolation::Nearest),
        ("density-trilinear.png", DensityInterpolation::Trilinear),
        ("density-tricubic.png", DensityInterpolation::Tricubic),
    ] {
        let pattern = Pattern::new(PatternKind::DensityFile(
            file.clone().with_interpolation(interpolation),
        ))
        .with_frequency(0.0);
        render_pattern_to_png(&pattern, &mut ctx, &config, path)?;
    }
    Ok(())
}
