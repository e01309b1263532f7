//! scan conversion: generic polygon fill via Bresenham edge walking, plus a
//! dedicated flat-top/flat-bottom triangle converter.

use std::collections::BTreeMap;

use crate::scanline::Scanline;

/// trace the closed edge path of `points` pixel-by-pixel, bucket edge pixels by
/// row, and emit one scanline per row spanning that row's min/max x.
///
/// approximate fill: correct for convex-ish shapes, which is all the shape
/// variants feed it. callers clip the result with [`Scanline::filter`].
pub fn polygon(points: &[(i32, i32)]) -> Vec<Scanline> {
    profiling::scope!("raster::polygon");

    let mut rows: BTreeMap<i32, (i32, i32)> = BTreeMap::new();

    for i in 0..points.len() {
        let p1 = points[i];
        let p2 = if i + 1 >= points.len() {
            points[0]
        } else {
            points[i + 1]
        };

        bresenham(p1.0, p1.1, p2.0, p2.1, |x, y| {
            rows.entry(y)
                .and_modify(|(min, max)| {
                    *min = (*min).min(x);
                    *max = (*max).max(x);
                })
                .or_insert((x, x));
        });
    }

    rows.into_iter()
        .map(|(y, (min, max))| Scanline::new(y as f32, min as f32, max as f32))
        .collect()
}

/// walk the line from (x1, y1) to (x2, y2), invoking `plot` for every pixel
/// including both endpoints.
fn bresenham(mut x1: i32, mut y1: i32, x2: i32, y2: i32, mut plot: impl FnMut(i32, i32)) {
    let dx = x2 - x1;
    let ix = dx.signum();
    let dx = dx.abs() * 2;

    let dy = y2 - y1;
    let iy = dy.signum();
    let dy = dy.abs() * 2;

    plot(x1, y1);

    if dx >= dy {
        let mut error = dy - (dx >> 1);

        while x1 != x2 {
            if error >= 0 && (error != 0 || ix > 0) {
                error -= dx;
                y1 += iy;
            }

            error += dy;
            x1 += ix;
            plot(x1, y1);
        }
    } else {
        let mut error = dx - (dy >> 1);

        while y1 != y2 {
            if error >= 0 && (error != 0 || iy > 0) {
                error -= dy;
                x1 += ix;
            }

            error += dx;
            y1 += iy;
            plot(x1, y1);
        }
    }
}

/// exact O(height) triangle scan conversion. vertices are sorted by y, the
/// triangle is split at the middle vertex's row by interpolating the long
/// edge, and the two flat-top/flat-bottom halves are scanned row by row.
pub fn triangle(
    mut x1: f32,
    mut y1: f32,
    mut x2: f32,
    mut y2: f32,
    mut x3: f32,
    mut y3: f32,
) -> Vec<Scanline> {
    profiling::scope!("raster::triangle");

    if y1 > y3 {
        std::mem::swap(&mut x1, &mut x3);
        std::mem::swap(&mut y1, &mut y3);
    }
    if y1 > y2 {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }
    if y2 > y3 {
        std::mem::swap(&mut x2, &mut x3);
        std::mem::swap(&mut y2, &mut y3);
    }

    if y2 == y3 {
        flat_bottom(x1, y1, x2, y2, x3, y3)
    } else if y1 == y2 {
        flat_top(x1, y1, x2, y2, x3, y3)
    } else {
        // split the long edge (v1 -> v3) at the middle vertex's row
        let x4 = (x1 + ((y2 - y1) / (y3 - y1)) * (x3 - x1)).trunc();
        let y4 = y2;

        let mut lines = flat_bottom(x1, y1, x2, y2, x4, y4);
        lines.extend(flat_top(x2, y2, x4, y4, x3, y3));
        lines
    }
}

/// apex at (x1, y1), flat edge along y2 == y3.
fn flat_bottom(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> Vec<Scanline> {
    let mut lines = Vec::new();

    let s1 = (x2 - x1) / (y2 - y1);
    let s2 = (x3 - x1) / (y3 - y1);
    let mut ax = x1;
    let mut bx = x1;

    let mut y = y1;
    while y <= y2 {
        let (a, b) = (ax, bx);
        ax += s1;
        bx += s2;
        lines.push(Scanline::new(y, a, b));
        y += 1.0;
    }

    lines
}

/// flat edge along y1 == y2, apex at (x3, y3). walks bottom-up.
fn flat_top(x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> Vec<Scanline> {
    let mut lines = Vec::new();

    let s1 = (x3 - x1) / (y3 - y1);
    let s2 = (x3 - x2) / (y3 - y2);
    let mut ax = x3;
    let mut bx = x3;

    let mut y = y3;
    while y >= y1 {
        ax -= s1;
        bx -= s2;
        lines.push(Scanline::new(y, ax, bx));
        y -= 1.0;
    }

    lines
}
