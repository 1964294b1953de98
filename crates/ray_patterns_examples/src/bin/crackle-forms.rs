use glam::{DVec2, DVec3, IVec3};
use ray_patterns::prelude::*;
use ray_patterns_examples::{render_pattern_to_png, SwatchConfig};

fn main() -> anyhow::Result<()> {
    let settings = RenderSettings::new().with_crackle_cache_budget(4 * 1024 * 1024);
    let mut ctx = ThreadContext::new(settings)?;
    let config = SwatchConfig::new((400, 400), DVec2::splat(6.0)).with_z(0.5);

    let variants = [
        ("crackle-default.png", CrackleParams::default()),
        (
            "crackle-facets.png",
            CrackleParams::default().with_form(DVec3::new(1.0, 0.0, 0.0)),
        ),
        (
            "crackle-manhattan.png",
            CrackleParams::default().with_metric(1.0),
        ),
        (
            "crackle-solid.png",
            CrackleParams::default().with_solid(true),
        ),
        (
            "crackle-repeat.png",
            CrackleParams::default().with_repeat(IVec3::new(3, 3, 0)),
        ),
    ];

    for (path, params) in variants {
        let pattern = Pattern::new(PatternKind::Crackle(params));
        pattern.validate()?;
        render_pattern_to_png(&pattern, &mut ctx, &config, path)?;
    }

    let stats = ctx.stats;
    println!(
        "crackle cells: {} lookups, {} hits, {} transient, {} cached ({} bytes)",
        stats.crackle_tests,
        stats.crackle_hits,
        stats.crackle_transient,
        ctx.crackle_cache.len(),
        ctx.crackle_cache.memory_usage()
    );
    Ok(())
}
