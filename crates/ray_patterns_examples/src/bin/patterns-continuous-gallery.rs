use glam::{DVec2, DVec3};
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_swatch_sheet, SwatchConfig};

fn main() -> anyhow::Result<()> {
    let turbulence = TurbulenceWarp::new(DVec3::splat(0.6));

    let patterns = [
        ("agate", Pattern::new(PatternKind::agate())),
        ("bozo", Pattern::new(PatternKind::Bozo).with_frequency(1.5)),
        ("granite", Pattern::new(PatternKind::Granite)),
        ("leopard", Pattern::new(PatternKind::Leopard).with_frequency(4.0)),
        (
            "marble",
            Pattern::new(PatternKind::Marble)
                .with_turbulence(turbulence)
                .with_wave(WaveType::Triangle),
        ),
        ("onion", Pattern::new(PatternKind::Onion)),
        ("radial", Pattern::new(PatternKind::Radial).with_frequency(6.0)),
        (
            "spiral1",
            Pattern::new(PatternKind::Spiral1 { arms: 5 }).with_wave(WaveType::Sine),
        ),
        (
            "wood",
            Pattern::new(PatternKind::Wood).with_turbulence(turbulence.with_octaves(3)),
        ),
        ("wrinkles", Pattern::new(PatternKind::Wrinkles).with_wave(WaveType::Cubic)),
    ];

    let mut pigments = Vec::with_capacity(patterns.len());
    for (name, pattern) in patterns {
        let mut pigment = Pigment::with_default_map(pattern);
        pigment.post()?;
        pigments.push((name, pigment));
    }

    let config = SwatchConfig::new((160, 160), DVec2::splat(4.0)).with_origin(DVec2::splat(-2.0));
    let mut ctx = ThreadContext::new(RenderSettings::new())?;
    render_swatch_sheet(&pigments, &mut ctx, &config, "patterns-continuous-gallery.png")?;
    Ok(())
}
