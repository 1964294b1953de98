use std::io::Write;
use std::sync::Arc;
use std::thread;

use glam::{DVec3, IVec3};
use ray_patterns::prelude::*;

fn sample_points() -> Vec<DVec3> {
    (0..256)
        .map(|i| {
            let f = i as f64;
            DVec3::new((f * 0.37).sin() * 5.0, (f * 0.11).cos() * 5.0, f * 0.013)
        })
        .collect()
}

fn marble_over_crackle() -> Pigment {
    let marble = Pattern::new(PatternKind::Marble)
        .with_turbulence(TurbulenceWarp::new(DVec3::splat(0.5)))
        .with_wave(WaveType::Sine);
    let mut marble = Pigment::with_default_map(marble);
    marble.post().unwrap();

    let cells = BlendMap::new(
        BlendMapKind::Color,
        [
            (0.0, TransColor::rgb(0.1, 0.1, 0.1)),
            (0.2, TransColor::rgb(0.9, 0.9, 0.8)),
        ],
    )
    .unwrap();
    let crackle = Pigment::patterned(
        Pattern::new(PatternKind::Crackle(
            CrackleParams::default().with_repeat(IVec3::new(6, 0, 6)),
        )),
        cells,
    );

    let map = BlendMap::discrete(BlendMapKind::Pigment, [Arc::new(marble), Arc::new(crackle)])
        .unwrap();
    let mut pigment = Pigment::patterned(Pattern::new(PatternKind::Checker), map);
    pigment.post().unwrap();
    pigment
}

#[test]
fn threads_sharing_a_pigment_agree() {
    let pigment = Arc::new(marble_over_crackle());
    let points = sample_points();

    let mut reference_ctx = ThreadContext::default();
    let reference: Vec<Option<TransColor>> = points
        .iter()
        .map(|&p| pigment.compute(p, None, &mut reference_ctx).unwrap())
        .collect();

    let results: Vec<(Vec<Option<TransColor>>, RenderStats)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|budget_kind| {
                let pigment = Arc::clone(&pigment);
                let points = &points;
                scope.spawn(move || {
                    // Half the threads run without a crackle cache.
                    let budget = if budget_kind % 2 == 0 { 0 } else { 1 << 20 };
                    let settings = RenderSettings::new().with_crackle_cache_budget(budget);
                    let mut ctx = ThreadContext::new(settings).unwrap();
                    let colors = points
                        .iter()
                        .map(|&p| pigment.compute(p, None, &mut ctx).unwrap())
                        .collect();
                    (colors, ctx.stats)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut total = RenderStats::default();
    for (colors, stats) in &results {
        assert_eq!(colors, &reference);
        total.merge(stats);
    }
    assert_eq!(total.crackle_tests, 4 * reference_ctx.stats.crackle_tests);
    assert!(total.crackle_transient > 0);
}

#[test]
fn density_files_load_from_disk_and_drive_pigments() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    // 2x2x2 grid of 8 bit samples, x fastest.
    file.write_all(&[0, 2, 0, 2, 0, 2]).unwrap();
    file.write_all(&[0, 255, 0, 255, 0, 255, 0, 255]).unwrap();
    file.flush().unwrap();

    let density = DensityFile::open(file.path()).unwrap();
    assert_eq!(density.size(), [2, 2, 2]);
    assert_eq!(density.sample_width(), 1);

    let map = BlendMap::new(
        BlendMapKind::Color,
        [(0.0, TransColor::WHITE), (1.0, TransColor::rgb(0.5, 0.25, 1.0))],
    )
    .unwrap();
    let pigment = Arc::new(Pigment::patterned(
        Pattern::new(PatternKind::DensityFile(density)).with_frequency(0.0),
        map,
    ));

    let mut ctx = ThreadContext::default();
    let thin = evaluate_density(&[pigment.clone()], DVec3::new(0.25, 0.5, 0.5), &mut ctx).unwrap();
    let dense = evaluate_density(&[pigment.clone()], DVec3::new(0.75, 0.5, 0.5), &mut ctx).unwrap();
    assert_eq!(thin, DVec3::ONE);
    assert!((dense - DVec3::new(0.5, 0.25, 1.0)).abs().max_element() < 1e-4);

    let both = evaluate_density(&[pigment.clone(), pigment], DVec3::new(0.75, 0.5, 0.5), &mut ctx)
        .unwrap();
    assert!((both - DVec3::new(0.25, 0.0625, 1.0)).abs().max_element() < 1e-4);
}

#[test]
fn truncated_density_files_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[0, 2, 0, 2, 0, 2, 1, 2, 3]).unwrap();
    file.flush().unwrap();
    assert!(matches!(
        DensityFile::open(file.path()),
        Err(Error::DensityFileSize {
            size_x: 2,
            size_y: 2,
            size_z: 2,
            payload: 3
        })
    ));
    assert!(matches!(
        DensityFile::open(file.path().with_extension("missing")),
        Err(Error::Io(_))
    ));
}

#[test]
fn pattern_values_stay_in_range() {
    let kinds = vec![
        PatternKind::agate(),
        PatternKind::Bozo,
        PatternKind::Boxed,
        PatternKind::Cells,
        PatternKind::Dents,
        PatternKind::Granite,
        PatternKind::Leopard,
        PatternKind::Marble,
        PatternKind::Onion,
        PatternKind::quilted(),
        PatternKind::Radial,
        PatternKind::Ripples,
        PatternKind::Spiral2 { arms: 3 },
        PatternKind::Waves,
        PatternKind::Wood,
        PatternKind::Wrinkles,
        PatternKind::Fractal(FractalParams::mandel(2, 30)),
        PatternKind::Crackle(CrackleParams::default().with_metric(1.0)),
    ];
    let waves = [
        WaveType::Ramp,
        WaveType::Sine,
        WaveType::Triangle,
        WaveType::Scallop,
        WaveType::Cubic,
    ];
    let mut ctx = ThreadContext::default();
    for kind in kinds {
        for wave in waves {
            let pattern = Pattern::new(kind.clone()).with_wave(wave);
            for &p in &sample_points() {
                let v = pattern.evaluate(p, None, &mut ctx).unwrap();
                // Folding uses a modulus marginally above 1.
                assert!((0.0..=1.0 + 1e-4).contains(&v), "{kind:?} {wave:?} gave {v} at {p}");
            }
        }
    }
}

#[test]
fn default_maps_cover_every_discrete_label() {
    let kinds = [
        PatternKind::Checker,
        PatternKind::brick(),
        PatternKind::Hexagon,
        PatternKind::Square,
        PatternKind::Triangular,
        PatternKind::Cubic,
    ];
    let mut ctx = ThreadContext::default();
    for kind in kinds {
        let mut pigment = Pigment::with_default_map(Pattern::new(kind));
        pigment.post().unwrap();
        for &p in &sample_points() {
            assert!(pigment.compute(p, None, &mut ctx).unwrap().is_some());
        }
    }
}
