//! pixel-level energy math: mean color, optimal blend color, full and
//! incremental difference scoring, and the scanline copy/composite primitives.
//!
//! the score is `sqrt(mean squared per-channel error over 3 channels) / 255`,
//! always in [0, 1]. [`difference_partial`] must agree with a full
//! [`difference`] recompute on the same inputs; that equivalence is the
//! correctness anchor for the whole incremental path.

use crate::bitmap::Bitmap;
use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::scanline::Scanline;

/// per-channel integer-truncated average of the image; alpha fixed at 255.
pub fn mean_color(image: &Bitmap) -> Rgba {
    let mut r = 0u64;
    let mut g = 0u64;
    let mut b = 0u64;

    for px in image.data().chunks_exact(4) {
        r += px[0] as u64;
        g += px[1] as u64;
        b += px[2] as u64;
    }

    let count = image.width() as u64 * image.height() as u64;
    Rgba::new(
        (r / count) as u8,
        (g / count) as u8,
        (b / count) as u8,
        255,
    )
}

/// closed-form optimal flat color for blending over `lines` at the given
/// alpha: per channel, average `(target - current) * (255 / alpha) + current`
/// over the covered pixels, clamped to [0, 255] and truncated.
///
/// lines must already be clipped to the canvas.
pub fn compute_color(target: &Bitmap, current: &Bitmap, lines: &[Scanline], alpha: u8) -> Rgba {
    profiling::scope!("core::compute_color");

    let data_t = target.data();
    let data_c = current.data();
    let a = 255.0 / alpha as f64;

    let mut count = 0u64;
    let mut r = 0.0f64;
    let mut g = 0.0f64;
    let mut b = 0.0f64;

    for line in lines {
        for x in line.x1..=line.x2 {
            let o = target.offset(x, line.y);

            let tr = data_t[o] as f64;
            let tg = data_t[o + 1] as f64;
            let tb = data_t[o + 2] as f64;

            let cr = data_c[o] as f64;
            let cg = data_c[o + 1] as f64;
            let cb = data_c[o + 2] as f64;

            r += (tr - cr) * a + cr;
            g += (tg - cg) * a + cg;
            b += (tb - cb) * a + cb;

            count += 1;
        }
    }

    if count == 0 {
        return Rgba::new(0, 0, 0, alpha);
    }

    let n = count as f64;
    Rgba::new(
        (r / n).clamp(0.0, 255.0) as u8,
        (g / n).clamp(0.0, 255.0) as u8,
        (b / n).clamp(0.0, 255.0) as u8,
        alpha,
    )
}

/// full RMS distance over all pixels and the three color channels,
/// normalized by 255.
pub fn difference(a: &Bitmap, b: &Bitmap) -> Result<f64> {
    profiling::scope!("core::difference");

    let data_a = a.data();
    let data_b = b.data();
    if data_a.len() != data_b.len() {
        return Err(Error::ImageMismatch {
            left: data_a.len(),
            right: data_b.len(),
        });
    }

    let mut sum = 0.0f64;
    for (pa, pb) in data_a.chunks_exact(4).zip(data_b.chunks_exact(4)) {
        let dr = pa[0] as f64 - pb[0] as f64;
        let dg = pa[1] as f64 - pb[1] as f64;
        let db = pa[2] as f64 - pb[2] as f64;
        sum += dr * dr + dg * dg + db * db;
    }

    let n = a.width() as f64 * a.height() as f64 * 3.0;
    Ok((sum / n).sqrt() / 255.0)
}

/// incremental rescore touching only the pixels under `lines`.
///
/// reconstructs the sum of squares implied by `score`, swaps out `before`'s
/// contribution under the lines for `after`'s, and renormalizes. O(affected
/// pixels) instead of O(canvas).
pub fn difference_partial(
    target: &Bitmap,
    before: &Bitmap,
    after: &Bitmap,
    score: f64,
    lines: &[Scanline],
) -> Result<f64> {
    profiling::scope!("core::difference_partial");

    let data_t = target.data();
    let data_b = before.data();
    let data_a = after.data();
    if data_t.len() != data_b.len() || data_t.len() != data_a.len() {
        return Err(Error::ImageMismatch {
            left: data_t.len(),
            right: data_b.len().max(data_a.len()),
        });
    }

    let n = target.width() as f64 * target.height() as f64 * 3.0;
    let mut sum = (score * 255.0).powi(2) * n;

    for line in lines {
        for x in line.x1..=line.x2 {
            let o = target.offset(x, line.y);

            let tr = data_t[o] as f64;
            let tg = data_t[o + 1] as f64;
            let tb = data_t[o + 2] as f64;

            let dr1 = tr - data_b[o] as f64;
            let dg1 = tg - data_b[o + 1] as f64;
            let db1 = tb - data_b[o + 2] as f64;

            let dr2 = tr - data_a[o] as f64;
            let dg2 = tg - data_a[o + 1] as f64;
            let db2 = tb - data_a[o + 2] as f64;

            sum -= dr1 * dr1 + dg1 * dg1 + db1 * db1;
            sum += dr2 * dr2 + dg2 * dg2 + db2 * db2;
        }
    }

    // rounding can push the reconstructed sum a hair below zero
    Ok((sum.max(0.0) / n).sqrt() / 255.0)
}

/// copy the covered row segments (inclusive of both span ends) from `src`
/// into `dst`, snapshotting just the pixels a candidate will touch.
pub fn copy_lines(dst: &mut Bitmap, src: &Bitmap, lines: &[Scanline]) -> Result<()> {
    if dst.data().len() != src.data().len() {
        return Err(Error::ImageMismatch {
            left: dst.data().len(),
            right: src.data().len(),
        });
    }

    for line in lines {
        let o1 = src.offset(line.x1, line.y);
        let o2 = src.offset(line.x2, line.y) + 4;
        dst.data[o1..o2].copy_from_slice(&src.data()[o1..o2]);
    }

    Ok(())
}

/// standard "over" composite of a flat color onto the covered pixels,
/// integer-truncated per channel. the canvas alpha channel is left as-is.
pub fn draw_lines(image: &mut Bitmap, color: Rgba, lines: &[Scanline]) {
    profiling::scope!("core::draw_lines");

    let sr = color.r as f64;
    let sg = color.g as f64;
    let sb = color.b as f64;
    let ma = color.a as f64 / 255.0;
    let base = 1.0 - ma;

    for line in lines {
        for x in line.x1..=line.x2 {
            let o = image.offset(x, line.y);

            let dr = image.data[o] as f64;
            let dg = image.data[o + 1] as f64;
            let db = image.data[o + 2] as f64;

            image.data[o] = (dr * base + sr * ma) as u8;
            image.data[o + 1] = (dg * base + sg * ma) as u8;
            image.data[o + 2] = (db * base + sb * ma) as u8;
        }
    }
}
