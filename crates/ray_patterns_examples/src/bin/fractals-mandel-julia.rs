use glam::DVec2;
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_pigment_to_png, SwatchConfig};

fn main() -> anyhow::Result<()> {
    let mut ctx = ThreadContext::new(RenderSettings::new())?;

    let mut mandel = Pigment::with_default_map(Pattern::new(PatternKind::Fractal(
        FractalParams::mandel(2, 200),
    )));
    mandel.post()?;
    let config = SwatchConfig::new((600, 480), DVec2::new(3.0, 2.4)).with_origin(DVec2::new(-2.1, -1.2));
    render_pigment_to_png(&mandel, &mut ctx, &config, "fractals-mandel.png")?;

    let map = BlendMap::new(
        BlendMapKind::Color,
        [
            (0.0, TransColor::rgb(0.02, 0.02, 0.1)),
            (0.3, TransColor::rgb(0.2, 0.4, 0.9)),
            (0.7, TransColor::rgb(1.0, 0.8, 0.3)),
            (1.0, TransColor::WHITE),
        ],
    )?;
    let julia = Pattern::new(PatternKind::Fractal(
        FractalParams::julia(3, DVec2::new(0.4, 0.0), 120)
            .with_exterior(ExteriorMode::Cycle, 12.0)
            .with_interior(InteriorMode::MinModulus, 1.0),
    ));
    let mut julia = Pigment::patterned(julia, map);
    julia.post()?;
    let config = SwatchConfig::new((480, 480), DVec2::splat(3.0)).with_origin(DVec2::splat(-1.5));
    render_pigment_to_png(&julia, &mut ctx, &config, "fractals-julia3.png")?;

    let mut magnet = Pigment::with_default_map(Pattern::new(PatternKind::Fractal(
        FractalParams::magnet(FractalFamily::Magnet1Mandel, 80),
    )));
    magnet.post()?;
    let config = SwatchConfig::new((480, 480), DVec2::splat(6.0)).with_origin(DVec2::new(-2.0, -3.0));
    render_pigment_to_png(&magnet, &mut ctx, &config, "fractals-magnet1.png")?;
    Ok(())
}
