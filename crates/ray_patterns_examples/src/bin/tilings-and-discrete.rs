use std::f64::consts::FRAC_PI_2;

use glam::{DAffine3, DVec2};
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_swatch_sheet, SwatchConfig};

fn main() -> anyhow::Result<()> {
    // Tilings and most discrete patterns live on the X-Z plane; swatches sample X-Y.
    let onto_xz = Warp::Transform(DAffine3::from_rotation_x(-FRAC_PI_2));

    let kinds = [
        ("checker", PatternKind::Checker),
        ("brick", PatternKind::brick()),
        ("hexagon", PatternKind::Hexagon),
        ("square", PatternKind::Square),
        ("triangular", PatternKind::Triangular),
        ("tiling-square", PatternKind::Tiling(TilingKind::Square)),
        ("tiling-hexagon", PatternKind::Tiling(TilingKind::Hexagon)),
        ("tiling-triangle", PatternKind::Tiling(TilingKind::Triangle)),
        ("tiling-lozenge", PatternKind::Tiling(TilingKind::Lozenge)),
    ];

    let mut pigments = Vec::with_capacity(kinds.len());
    for (name, kind) in kinds {
        let scale = if matches!(kind, PatternKind::Brick { .. }) {
            8.0
        } else {
            1.0
        };
        let pattern = Pattern::new(kind).with_warp(onto_xz.clone()).with_warp(Warp::Transform(
            DAffine3::from_scale(glam::DVec3::splat(1.0 / scale)),
        ));
        let mut pigment = Pigment::with_default_map(pattern);
        pigment.post()?;
        pigments.push((name, pigment));
    }

    let config = SwatchConfig::new((160, 160), DVec2::splat(4.0)).with_origin(DVec2::splat(-2.0));
    let mut ctx = ThreadContext::new(RenderSettings::new())?;
    render_swatch_sheet(&pigments, &mut ctx, &config, "tilings-and-discrete.png")?;
    Ok(())
}
