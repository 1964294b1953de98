use glam::{DVec2, DVec3};
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_swatch_sheet, SwatchConfig};

fn main() -> anyhow::Result<()> {
    // Colors are stored in sRGB; the blend modes differ in which space they mix in.
    let settings = RenderSettings::new().with_working_gamma(GammaCurve::Srgb);
    let mut ctx = ThreadContext::new(settings)?;

    let map = BlendMap::new(
        BlendMapKind::Color,
        [
            (0.0, TransColor::rgb(1.0, 0.1, 0.1)),
            (1.0, TransColor::rgb(0.1, 0.3, 1.0)),
        ],
    )?;
    let gradient = Pattern::new(PatternKind::Gradient(DVec3::X));

    let pigments: Vec<(&str, Pigment)> = [
        ("default", BlendMode::Default, GammaCurve::Neutral),
        ("linear", BlendMode::Linear, GammaCurve::Neutral),
        ("gamma-2.5", BlendMode::Gamma, GammaCurve::Power(2.5)),
        ("brightness-srgb", BlendMode::LinearBrightness, GammaCurve::Srgb),
    ]
    .into_iter()
    .map(|(name, mode, gamma)| {
        let pigment =
            Pigment::patterned(gradient.clone(), map.clone()).with_blend_mode(mode, gamma);
        (name, pigment)
    })
    .collect();

    let config = SwatchConfig::new((256, 96), DVec2::new(1.0, 1.0));
    render_swatch_sheet(&pigments, &mut ctx, &config, "pigments-blend-modes.png")?;
    Ok(())
}
