//! Discrete patterns: each returns an exact integer label as `f64`.
use glam::DVec3;

use crate::noise::EPSILON;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const HALF_SQRT_3: f64 = SQRT_3 / 2.0;

/// Alternating unit cubes, labels 0 and 1.
pub(crate) fn checker(p: DVec3) -> f64 {
    let c = (p + EPSILON).floor();
    let sum = c.x as i64 + c.y as i64 + c.z as i64;
    (sum & 1) as f64
}

/// Brick wall: 0 in the mortar, 1 in the brick.
///
/// Odd courses are offset by half a brick along X and Z.
pub(crate) fn brick(p: DVec3, size: DVec3, mortar: f64) -> f64 {
    fn frac(v: f64) -> f64 {
        let f = v - v.trunc();
        if f < 0.0 {
            f + 1.0
        } else {
            f
        }
    }

    let fudge = EPSILON + mortar;
    let p = p + fudge;
    let mortar_x = mortar / size.x;
    let mortar_z = mortar / size.z;

    if frac(p.y / size.y) <= mortar / size.y {
        return 0.0;
    }
    let course = frac(p.y / size.y * 0.5);
    let even = course <= 0.5;

    if even && frac(p.x / size.x) <= mortar_x {
        return 0.0;
    }
    if !even && frac(p.x / size.x + 0.5) <= mortar_x {
        return 0.0;
    }
    if !even && frac(p.z / size.z) <= mortar_z {
        return 0.0;
    }
    if even && frac(p.z / size.z + 0.5) <= mortar_z {
        return 0.0;
    }
    1.0
}

/// Hexagonal tiling of the X-Z plane with three labels.
pub(crate) fn hexagon(p: DVec3) -> f64 {
    let x = p.x.abs();
    // Mirroring at z = 0 shifts by a full 3-hexagon period so the labels line up.
    let z = if p.z < 0.0 {
        5.196_152_424 - p.z.abs()
    } else {
        p.z
    };

    let xs = (x / 0.5).rem_euclid(6.0);
    let zs = (z / 0.866_025_404).rem_euclid(6.0);
    let xm = (xs.floor() as i64) % 6;
    let zm = (zs.floor() as i64) % 6;

    let label = match xm {
        0 | 5 => match zm {
            0 | 5 => 0,
            1 | 2 => 1,
            _ => 2,
        },
        2 | 3 => match zm {
            0 | 1 => 2,
            2 | 3 => 0,
            _ => 1,
        },
        _ => {
            let mut xl = xs - xm as f64;
            let zl = zs - zm as f64;
            if (xm + zm) % 2 == 1 {
                xl = 1.0 - xl;
            }
            if xl == 0.0 {
                xl = 0.0001;
            }
            let lower = zl / xl < 1.0;
            match (lower, zm) {
                (true, 0 | 3) => 0,
                (true, 2 | 5) => 1,
                (true, _) => 2,
                (false, 0 | 3) => 2,
                (false, 2 | 5) => 0,
                (false, _) => 1,
            }
        }
    };
    (label % 3) as f64
}

/// Six pyramids meeting at the origin, one per axis direction.
pub(crate) fn cubic(p: DVec3) -> f64 {
    let a = p.abs();
    if p.x >= 0.0 && p.x >= a.y && p.x >= a.z {
        0.0
    } else if p.y >= 0.0 && p.y >= a.x && p.y >= a.z {
        1.0
    } else if p.z >= 0.0 && p.z >= a.x && p.z >= a.y {
        2.0
    } else if p.x < 0.0 && p.x <= -a.y && p.x <= -a.z {
        3.0
    } else if p.y < 0.0 && p.y <= -a.x && p.y <= -a.z {
        4.0
    } else {
        5.0
    }
}

/// Unit squares on the X-Z plane, four labels in a 2x2 arrangement.
pub(crate) fn square(p: DVec3) -> f64 {
    let x_odd = (p.x.floor() as i64) & 1 != 0;
    let z_odd = (p.z.floor() as i64) & 1 != 0;
    match (x_odd, z_odd) {
        (true, true) => 2.0,
        (true, false) => 3.0,
        (false, true) => 1.0,
        (false, false) => 0.0,
    }
}

/// Equilateral triangles on the X-Z plane, six labels around each vertex.
pub(crate) fn triangular(p: DVec3) -> f64 {
    let mut xs = p.x - 3.0 * (p.x / 3.0).floor();
    let mut zs = p.z - SQRT_3 * (p.z / SQRT_3).floor();
    let column = xs.floor();
    xs -= column;
    let upper = zs >= HALF_SQRT_3;
    if upper {
        zs = SQRT_3 - zs;
    }
    let k = 1.0 - xs;

    let mut answer = if xs != 0.0 && k != 0.0 {
        let left = zs / xs < SQRT_3;
        let right = zs / k < SQRT_3;
        match (left, right) {
            (true, true) => 0.0,
            (false, true) => 1.0,
            (true, false) => 3.0,
            (false, false) => 0.0,
        }
    } else {
        1.0
    };

    answer = if (answer as i64) & 1 != 0 {
        (answer + 2.0 * column) % 6.0
    } else {
        (6.0 + answer - 2.0 * column) % 6.0
    };
    if upper {
        answer = 5.0 - answer;
    }
    answer
}
