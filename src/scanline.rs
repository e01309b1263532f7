/// a horizontal run of pixels: row `y`, columns `x1..=x2`.
///
/// scanlines are the unit of rasterized coverage. the constructor enforces
/// `x1 <= x2`; [`Scanline::filter`] clips a batch against canvas bounds before
/// any pixel access, so downstream code can index without further checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scanline {
    pub y: i32,
    pub x1: i32,
    pub x2: i32,
}

impl Scanline {
    /// build a span from possibly-unordered fractional endpoints.
    /// coordinates truncate toward zero.
    #[inline]
    pub fn new(y: f32, x1: f32, x2: f32) -> Self {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        Self {
            y: y as i32,
            x1: x1 as i32,
            x2: x2 as i32,
        }
    }

    /// clip a batch of spans to a `width` x `height` canvas:
    /// - rows outside `[0, height)` are dropped
    /// - spans entirely outside `[0, width)` are dropped
    /// - surviving endpoints are clamped into `[0, width-1]`
    /// - spans that end up with `x1 >= x2` are dropped (single-pixel-wide
    ///   spans are discarded; single-row spans in y are kept)
    pub fn filter(lines: Vec<Scanline>, width: u32, height: u32) -> Vec<Scanline> {
        let w = width as i32;
        let h = height as i32;

        lines
            .into_iter()
            .filter_map(|mut line| {
                if line.y < 0 || line.y >= h {
                    return None;
                }
                if line.x1 >= w || line.x2 < 0 {
                    return None;
                }

                line.x1 = line.x1.clamp(0, w - 1);
                line.x2 = line.x2.clamp(0, w - 1);

                (line.x1 < line.x2).then_some(line)
            })
            .collect()
    }
}
