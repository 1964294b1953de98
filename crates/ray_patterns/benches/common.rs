use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::DVec3;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Points on a regular `n x n` grid in the X-Y plane spanning `extent`, shifted off the
/// lattice so no sample lands exactly on a cell boundary.
pub fn grid_points(extent: f64, n: usize, z: f64) -> Vec<DVec3> {
    let step = if n > 0 { extent / n as f64 } else { extent };
    let mut pts = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let x = (i as f64 + 0.37) * step;
            let y = (j as f64 + 0.61) * step;
            pts.push(DVec3::new(x, y, z));
        }
    }
    pts
}
