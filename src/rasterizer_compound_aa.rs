//! Compound anti-aliased rasterizer.
//!
//! Every edge carries a left and a right style index, so one pass over a
//! subshape produces coverage for all of its fill styles at once. Shared
//! edges between two fills are rasterized once and add coverage to one
//! style while subtracting it from the other, which keeps adjacent fills
//! seamless.
//!
//! Coordinates are device pixels in `f64`, stored as 24.8 fixed point.

use crate::basics::{
    iround, PointD, WindingRule, POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT,
};
use crate::gamma::{gamma_table, GammaFunction, GammaNone};
use crate::scanline_u::Scanline;

// ============================================================================
// CellStyleAa
// ============================================================================

/// Accumulated cover and area of one pixel cell for one (left, right)
/// style pair. A style of -1 means no fill.
#[derive(Debug, Clone, Copy)]
pub struct CellStyleAa {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
    pub left: i32,
    pub right: i32,
}

impl CellStyleAa {
    #[inline]
    fn initial(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn not_equal(&self, ex: i32, ey: i32, style: &CellStyleAa) -> bool {
        ex != self.x || ey != self.y || self.left != style.left || self.right != style.right
    }
}

impl Default for CellStyleAa {
    fn default() -> Self {
        Self {
            x: i32::MAX,
            y: i32::MAX,
            cover: 0,
            area: 0,
            left: -1,
            right: -1,
        }
    }
}

/// Order in which the styles of one scanline are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOrder {
    /// Highest style index first.
    Direct,
    /// Lowest style index first.
    Inverse,
}

// ============================================================================
// Cell engine
// ============================================================================

const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;
const SUBPIXEL_SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const SUBPIXEL_MASK: i32 = POLY_SUBPIXEL_MASK as i32;

#[derive(Debug, Clone, Copy, Default)]
struct SortedY {
    start: u32,
    num: u32,
}

struct CellsEngine {
    cells: Vec<CellStyleAa>,
    sorted_cells: Vec<u32>,
    sorted_y: Vec<SortedY>,
    curr_cell: CellStyleAa,
    style_cell: CellStyleAa,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
}

impl CellsEngine {
    fn new() -> Self {
        Self {
            cells: Vec::new(),
            sorted_cells: Vec::new(),
            sorted_y: Vec::new(),
            curr_cell: CellStyleAa::default(),
            style_cell: CellStyleAa::default(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
        }
    }

    fn reset(&mut self) {
        self.cells.clear();
        self.sorted_cells.clear();
        self.sorted_y.clear();
        self.curr_cell.initial();
        self.style_cell.initial();
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
    }

    fn set_styles(&mut self, left: i32, right: i32) {
        self.style_cell.left = left;
        self.style_cell.right = right;
    }

    /// Indices into `cells` of row `y`, sorted by x.
    fn scanline_cells(&self, y: i32) -> &[u32] {
        let sy = &self.sorted_y[(y - self.min_y) as usize];
        &self.sorted_cells[sy.start as usize..(sy.start + sy.num) as usize]
    }

    #[inline]
    fn add_curr_cell(&mut self) {
        if self.curr_cell.area | self.curr_cell.cover != 0 {
            self.cells.push(self.curr_cell);
        }
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if self.curr_cell.not_equal(x, y, &self.style_cell) {
            self.add_curr_cell();
            self.curr_cell.left = self.style_cell.left;
            self.curr_cell.right = self.style_cell.right;
            self.curr_cell.x = x;
            self.curr_cell.y = y;
            self.curr_cell.cover = 0;
            self.curr_cell.area = 0;
        }
    }

    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let fx1 = x1 & SUBPIXEL_MASK;
        let fx2 = x2 & SUBPIXEL_MASK;

        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }

        if ex1 == ex2 {
            let delta = y2 - y1;
            self.curr_cell.cover += delta;
            self.curr_cell.area += (fx1 + fx2) * delta;
            return;
        }

        let mut p = (SUBPIXEL_SCALE - fx1) as i64 * (y2 - y1) as i64;
        let mut first = SUBPIXEL_SCALE;
        let mut incr = 1;
        let mut dx = x2 as i64 - x1 as i64;
        if dx < 0 {
            p = fx1 as i64 * (y2 - y1) as i64;
            first = 0;
            incr = -1;
            dx = -dx;
        }

        let mut delta = (p / dx) as i32;
        let mut modulo = p % dx;
        if modulo < 0 {
            delta -= 1;
            modulo += dx;
        }

        self.curr_cell.cover += delta;
        self.curr_cell.area += (fx1 + first) * delta;

        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut y1 = y1 + delta;

        if ex != ex2 {
            p = SUBPIXEL_SCALE as i64 * (y2 - y1 + delta) as i64;
            let mut lift = (p / dx) as i32;
            let mut rem = p % dx;
            if rem < 0 {
                lift -= 1;
                rem += dx;
            }
            modulo -= dx;

            while ex != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.curr_cell.cover += delta;
                self.curr_cell.area += SUBPIXEL_SCALE * delta;
                y1 += delta;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }
        delta = y2 - y1;
        self.curr_cell.cover += delta;
        self.curr_cell.area += (fx2 + SUBPIXEL_SCALE - first) * delta;
    }

    fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let ex1 = x1 >> POLY_SUBPIXEL_SHIFT;
        let ex2 = x2 >> POLY_SUBPIXEL_SHIFT;
        let mut ey1 = y1 >> POLY_SUBPIXEL_SHIFT;
        let ey2 = y2 >> POLY_SUBPIXEL_SHIFT;
        let fy1 = y1 & SUBPIXEL_MASK;
        let fy2 = y2 & SUBPIXEL_MASK;

        self.min_x = self.min_x.min(ex1).min(ex2);
        self.max_x = self.max_x.max(ex1).max(ex2);
        self.min_y = self.min_y.min(ey1).min(ey2);
        self.max_y = self.max_y.max(ey1).max(ey2);

        self.set_curr_cell(ex1, ey1);

        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let mut incr = 1;

        // Vertical line: one cell per row, no hline splitting.
        if dx == 0 {
            let two_fx = (x1 - (ex1 << POLY_SUBPIXEL_SHIFT)) << 1;
            let mut first = SUBPIXEL_SCALE;
            if dy < 0 {
                first = 0;
                incr = -1;
            }
            let mut delta = first - fy1;
            self.curr_cell.cover += delta;
            self.curr_cell.area += two_fx * delta;
            ey1 += incr;
            self.set_curr_cell(ex1, ey1);

            delta = first + first - SUBPIXEL_SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.curr_cell.cover = delta;
                self.curr_cell.area = area;
                ey1 += incr;
                self.set_curr_cell(ex1, ey1);
            }
            delta = fy2 - SUBPIXEL_SCALE + first;
            self.curr_cell.cover += delta;
            self.curr_cell.area += two_fx * delta;
            return;
        }

        let mut p = (SUBPIXEL_SCALE - fy1) as i64 * dx;
        let mut first = SUBPIXEL_SCALE;
        let mut dy_abs = dy;
        if dy < 0 {
            p = fy1 as i64 * dx;
            first = 0;
            incr = -1;
            dy_abs = -dy;
        }

        let mut delta = (p / dy_abs) as i32;
        let mut modulo = p % dy_abs;
        if modulo < 0 {
            delta -= 1;
            modulo += dy_abs;
        }

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);
        ey1 += incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);

        if ey1 != ey2 {
            p = SUBPIXEL_SCALE as i64 * dx;
            let mut lift = (p / dy_abs) as i32;
            let mut rem = p % dy_abs;
            if rem < 0 {
                lift -= 1;
                rem += dy_abs;
            }
            modulo -= dy_abs;

            while ey1 != ey2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy_abs;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey1);
            }
        }
        self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }

    /// Bucket cells by row, then sort each row by x.
    fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }
        self.add_curr_cell();
        self.curr_cell.initial();
        if self.cells.is_empty() {
            return;
        }

        self.sorted_cells.clear();
        self.sorted_cells.resize(self.cells.len(), 0);
        self.sorted_y.clear();
        self.sorted_y
            .resize((self.max_y - self.min_y + 1) as usize, SortedY::default());

        for cell in &self.cells {
            self.sorted_y[(cell.y - self.min_y) as usize].start += 1;
        }
        let mut start = 0u32;
        for sy in &mut self.sorted_y {
            let count = sy.start;
            sy.start = start;
            start += count;
        }
        for (i, cell) in self.cells.iter().enumerate() {
            let sy = &mut self.sorted_y[(cell.y - self.min_y) as usize];
            self.sorted_cells[(sy.start + sy.num) as usize] = i as u32;
            sy.num += 1;
        }

        let cells = &self.cells;
        for sy in &self.sorted_y {
            let row = &mut self.sorted_cells[sy.start as usize..(sy.start + sy.num) as usize];
            row.sort_unstable_by_key(|&idx| cells[idx as usize].x);
        }
        self.sorted = true;
    }
}

// ============================================================================
// Clipping
// ============================================================================

#[inline]
fn upscale(v: f64) -> i32 {
    iround(v * POLY_SUBPIXEL_SCALE as f64)
}

/// Clip box in device pixels: x1, y1, x2, y2.
#[derive(Debug, Clone, Copy)]
struct ClipBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl ClipBox {
    /// Cut the segment at the box's vertical edges and clamp each piece
    /// into the box horizontally. The parts left or right of the box
    /// collapse onto its border, so the coverage they contribute to the
    /// cells inside is kept. Rows above and below are dropped.
    fn clip_line(&self, engine: &mut CellsEngine, a: PointD, b: PointD) {
        let mut ts = [0.0, 1.0, 1.0, 1.0];
        let mut n = 1;
        if a.x != b.x {
            for &bx in &[self.x1, self.x2] {
                let t = (bx - a.x) / (b.x - a.x);
                if t > 0.0 && t < 1.0 {
                    ts[n] = t;
                    n += 1;
                }
            }
        }
        ts[n] = 1.0;
        ts[1..=n].sort_unstable_by(|p, q| p.partial_cmp(q).unwrap_or(std::cmp::Ordering::Equal));

        let at = |t: f64| {
            PointD::new(
                (a.x + (b.x - a.x) * t).max(self.x1).min(self.x2),
                a.y + (b.y - a.y) * t,
            )
        };
        let mut p = at(0.0);
        for &t in &ts[1..=n] {
            let q = at(t);
            self.clip_line_y(engine, p, q);
            p = q;
        }
    }

    fn clip_line_y(&self, engine: &mut CellsEngine, mut a: PointD, mut b: PointD) {
        if (a.y <= self.y1 && b.y <= self.y1) || (a.y >= self.y2 && b.y >= self.y2) {
            return;
        }
        if a.y != b.y {
            let dxdy = (b.x - a.x) / (b.y - a.y);
            for &bound in &[self.y1, self.y2] {
                if (a.y < bound) != (b.y < bound) && a.y != bound && b.y != bound {
                    let x = a.x + (bound - a.y) * dxdy;
                    let outside_a = if bound == self.y1 { a.y < bound } else { a.y > bound };
                    if outside_a {
                        a = PointD::new(x, bound);
                    } else {
                        b = PointD::new(x, bound);
                    }
                }
            }
        }
        engine.line(upscale(a.x), upscale(a.y), upscale(b.x), upscale(b.y));
    }
}

// ============================================================================
// RasterizerCompoundAa
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct StyleInfo {
    start_cell: u32,
    num_cells: u32,
    last_x: i32,
}

impl Default for StyleInfo {
    fn default() -> Self {
        Self {
            start_cell: 0,
            num_cells: 0,
            last_x: i32::MIN,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct CellInfo {
    x: i32,
    area: i32,
    cover: i32,
}

const AA_SHIFT: u32 = 8;
const AA_SCALE: u32 = 1 << AA_SHIFT;
const AA_MASK: u32 = AA_SCALE - 1;
const AA_SCALE2: u32 = AA_SCALE * 2;
const AA_MASK2: u32 = AA_SCALE2 - 1;

pub struct RasterizerCompoundAa {
    outline: CellsEngine,
    winding_rule: WindingRule,
    layer_order: LayerOrder,
    gamma: [u8; AA_SCALE as usize],
    styles: Vec<StyleInfo>,
    /// Active style table; entry 0 is the "no fill" style.
    ast: Vec<u32>,
    /// Active style bitmask.
    asm: Vec<u8>,
    cells: Vec<CellInfo>,
    min_style: i32,
    max_style: i32,
    start: PointD,
    last: PointD,
    scan_y: i32,
    sl_start: i32,
    sl_len: u32,
    clip_box: Option<ClipBox>,
}

impl RasterizerCompoundAa {
    pub fn new() -> Self {
        Self {
            outline: CellsEngine::new(),
            winding_rule: WindingRule::NonZero,
            layer_order: LayerOrder::Direct,
            gamma: gamma_table(&GammaNone),
            styles: Vec::new(),
            ast: Vec::new(),
            asm: Vec::new(),
            cells: Vec::new(),
            min_style: i32::MAX,
            max_style: i32::MIN,
            start: PointD::new(0.0, 0.0),
            last: PointD::new(0.0, 0.0),
            scan_y: i32::MAX,
            sl_start: 0,
            sl_len: 0,
            clip_box: None,
        }
    }

    /// Drop all cells and styles. Clipping, winding rule and gamma stay.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.min_style = i32::MAX;
        self.max_style = i32::MIN;
        self.scan_y = i32::MAX;
        self.sl_start = 0;
        self.sl_len = 0;
    }

    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        self.clip_box = Some(ClipBox {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        });
    }

    pub fn winding_rule(&mut self, rule: WindingRule) {
        self.winding_rule = rule;
    }

    pub fn layer_order(&mut self, order: LayerOrder) {
        self.layer_order = order;
    }

    pub fn gamma<G: GammaFunction>(&mut self, f: &G) {
        self.gamma = gamma_table(f);
    }

    /// Styles of the edges added from now on. Negative means no fill.
    pub fn styles(&mut self, left: i32, right: i32) {
        self.outline.set_styles(left, right);
        for &s in &[left, right] {
            if s >= 0 {
                self.min_style = self.min_style.min(s);
                self.max_style = self.max_style.max(s);
            }
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        if self.outline.sorted {
            self.reset();
        }
        self.start = PointD::new(x, y);
        self.last = self.start;
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        let p = PointD::new(x, y);
        match self.clip_box {
            Some(clip) => clip.clip_line(&mut self.outline, self.last, p),
            None => self.outline.line(
                upscale(self.last.x),
                upscale(self.last.y),
                upscale(x),
                upscale(y),
            ),
        }
        self.last = p;
    }

    /// Line back to the last `move_to_d` point.
    pub fn close_polygon(&mut self) {
        if self.last != self.start {
            let s = self.start;
            self.line_to_d(s.x, s.y);
        }
    }

    /// Feed an open polyline with the current styles.
    pub fn add_polyline(&mut self, points: &[PointD]) {
        if let Some((first, rest)) = points.split_first() {
            self.move_to_d(first.x, first.y);
            for p in rest {
                self.line_to_d(p.x, p.y);
            }
        }
    }

    pub fn min_x(&self) -> i32 {
        self.outline.min_x
    }
    pub fn min_y(&self) -> i32 {
        self.outline.min_y
    }
    pub fn max_x(&self) -> i32 {
        self.outline.max_x
    }
    pub fn max_y(&self) -> i32 {
        self.outline.max_y
    }
    pub fn min_style(&self) -> i32 {
        self.min_style
    }
    pub fn max_style(&self) -> i32 {
        self.max_style
    }

    /// Sort the cells and position on the first row. False when nothing
    /// styled was added.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.outline.sort_cells();
        if self.outline.cells.is_empty() || self.max_style < self.min_style {
            return false;
        }
        self.scan_y = self.outline.min_y;
        let num_styles = (self.max_style - self.min_style + 2) as usize;
        self.styles.resize(num_styles, StyleInfo::default());
        true
    }

    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        let mut cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
        if self.winding_rule == WindingRule::EvenOdd {
            cover &= AA_MASK2 as i32;
            if cover > AA_SCALE as i32 {
                cover = AA_SCALE2 as i32 - cover;
            }
        }
        self.gamma[cover.min(AA_MASK as i32) as usize] as u32
    }

    /// Advance to the next row holding styled cells and split its cells
    /// per style. Returns the number of styles on that row, 0 when done.
    pub fn sweep_styles(&mut self) -> u32 {
        loop {
            if self.scan_y > self.outline.max_y {
                return 0;
            }
            let row = self.outline.scanline_cells(self.scan_y);
            let num_cells = row.len();
            let num_styles = (self.max_style - self.min_style + 2) as usize;

            self.cells.clear();
            self.cells.resize(num_cells * 2, CellInfo::default());
            self.ast.clear();
            self.asm.clear();
            self.asm.resize((num_styles + 7) >> 3, 0);

            if num_cells > 0 {
                self.asm[0] |= 1;
                self.ast.push(0);
                self.styles[0] = StyleInfo::default();

                let cells = &self.outline.cells;
                let first_x = cells[row[0] as usize].x;
                let last_x = cells[row[num_cells - 1] as usize].x;
                self.sl_start = first_x;
                self.sl_len = (last_x - first_x + 1) as u32;

                // Count cells per style.
                for &idx in row {
                    let c = &cells[idx as usize];
                    for &s in &[c.left, c.right] {
                        let id = style_slot(s, self.min_style);
                        let (nbyte, mask) = (id >> 3, 1u8 << (id & 7));
                        if self.asm[nbyte] & mask == 0 {
                            self.ast.push(id as u32);
                            self.asm[nbyte] |= mask;
                            self.styles[id] = StyleInfo::default();
                        }
                        self.styles[id].start_cell += 1;
                    }
                }

                // Counts to start offsets.
                let mut start_cell = 0u32;
                for &si in &self.ast {
                    let style = &mut self.styles[si as usize];
                    let v = style.start_cell;
                    style.start_cell = start_cell;
                    start_cell += v;
                }

                // Left styles gain the cell's coverage, right styles lose it.
                for &idx in row {
                    let c = &cells[idx as usize];
                    for &(s, sign) in &[(c.left, 1), (c.right, -1)] {
                        let style = &mut self.styles[style_slot(s, self.min_style)];
                        if c.x == style.last_x {
                            let ci = &mut self.cells[(style.start_cell + style.num_cells - 1) as usize];
                            ci.area += sign * c.area;
                            ci.cover += sign * c.cover;
                        } else {
                            self.cells[(style.start_cell + style.num_cells) as usize] = CellInfo {
                                x: c.x,
                                area: sign * c.area,
                                cover: sign * c.cover,
                            };
                            style.last_x = c.x;
                            style.num_cells += 1;
                        }
                    }
                }
            }

            if self.ast.len() > 1 {
                break;
            }
            self.scan_y += 1;
        }
        self.scan_y += 1;

        let active = &mut self.ast[1..];
        match self.layer_order {
            LayerOrder::Direct => active.sort_unstable_by(|a, b| b.cmp(a)),
            LayerOrder::Inverse => active.sort_unstable(),
        }
        (self.ast.len() - 1) as u32
    }

    /// Style index of the `style_idx`th active style of the current row.
    #[inline]
    pub fn style(&self, style_idx: u32) -> u32 {
        (self.ast[style_idx as usize + 1] as i32 + self.min_style - 1) as u32
    }

    pub fn scanline_start(&self) -> i32 {
        self.sl_start
    }

    pub fn scanline_length(&self) -> u32 {
        self.sl_len
    }

    /// Emit the coverage of the `style_idx`th active style of the row last
    /// swept by `sweep_styles`. False when it covers nothing.
    pub fn sweep_scanline<SL: Scanline>(&self, sl: &mut SL, style_idx: u32) -> bool {
        let scan_y = self.scan_y - 1;
        if scan_y > self.outline.max_y {
            return false;
        }
        sl.reset_spans();

        let st = &self.styles[self.ast[style_idx as usize + 1] as usize];
        let cells = &self.cells[st.start_cell as usize..(st.start_cell + st.num_cells) as usize];
        let mut cover = 0i32;
        for (i, cell) in cells.iter().enumerate() {
            let x = cell.x;
            cover += cell.cover;
            let next_x = cells.get(i + 1).map(|c| c.x);

            let mut span_from = x;
            if cell.area != 0 {
                let alpha = self.calculate_alpha((cover << (POLY_SUBPIXEL_SHIFT + 1)) - cell.area);
                sl.add_cell(x, alpha);
                span_from = x + 1;
            }
            if let Some(next_x) = next_x {
                if next_x > span_from {
                    let alpha = self.calculate_alpha(cover << (POLY_SUBPIXEL_SHIFT + 1));
                    if alpha > 0 {
                        sl.add_span(span_from, (next_x - span_from) as u32, alpha);
                    }
                }
            }
        }

        if sl.num_spans() == 0 {
            return false;
        }
        sl.finalize(scan_y);
        true
    }
}

#[inline]
fn style_slot(style: i32, min_style: i32) -> usize {
    if style < 0 {
        0
    } else {
        (style - min_style + 1) as usize
    }
}

impl Default for RasterizerCompoundAa {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamma::GammaPower;
    use crate::scanline_u::ScanlineU8;

    fn rect(ras: &mut RasterizerCompoundAa, x1: f64, y1: f64, x2: f64, y2: f64) {
        ras.move_to_d(x1, y1);
        ras.line_to_d(x2, y1);
        ras.line_to_d(x2, y2);
        ras.line_to_d(x1, y2);
        ras.close_polygon();
    }

    /// Coverage per (style, x) for every row, as (y, style, x, cover).
    fn sweep_all(ras: &mut RasterizerCompoundAa) -> Vec<(i32, u32, i32, u8)> {
        let mut out = Vec::new();
        if !ras.rewind_scanlines() {
            return out;
        }
        let mut sl = ScanlineU8::new();
        sl.reset(ras.min_x(), ras.max_x());
        loop {
            let n = ras.sweep_styles();
            if n == 0 {
                break;
            }
            for i in 0..n {
                if ras.sweep_scanline(&mut sl, i) {
                    for span in sl.spans() {
                        for (k, &c) in sl.covers(span).iter().enumerate() {
                            out.push((sl.y(), ras.style(i), span.x + k as i32, c));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn test_empty_rasterizer() {
        let mut ras = RasterizerCompoundAa::new();
        assert!(!ras.rewind_scanlines());
        // Unstyled edges do not count.
        rect(&mut ras, 0.0, 0.0, 4.0, 4.0);
        assert!(!ras.rewind_scanlines());
    }

    #[test]
    fn test_pixel_aligned_rect_is_fully_covered() {
        let mut ras = RasterizerCompoundAa::new();
        ras.styles(0, -1);
        rect(&mut ras, 1.0, 1.0, 4.0, 3.0);
        let cov = sweep_all(&mut ras);
        assert_eq!(cov.len(), 6);
        assert!(cov.iter().all(|&(_, s, _, c)| s == 0 && c == 255));
        assert_eq!(cov.iter().map(|c| c.0).min(), Some(1));
        assert_eq!(cov.iter().map(|c| c.2).max(), Some(3));
    }

    #[test]
    fn test_half_pixel_edge() {
        let mut ras = RasterizerCompoundAa::new();
        ras.styles(0, -1);
        rect(&mut ras, 0.5, 0.0, 2.0, 1.0);
        let cov = sweep_all(&mut ras);
        assert_eq!(cov, vec![(0, 0, 0, 128), (0, 0, 1, 255)]);
    }

    #[test]
    fn test_shared_edge_between_styles() {
        // Two abutting rectangles sharing x = 2, drawn as one outline per
        // side with the shared edge carrying both styles.
        let mut ras = RasterizerCompoundAa::new();
        ras.styles(0, -1);
        ras.move_to_d(2.0, 0.0);
        ras.line_to_d(0.0, 0.0);
        ras.line_to_d(0.0, 1.0);
        ras.line_to_d(2.0, 1.0);
        ras.styles(-1, 1);
        ras.move_to_d(2.0, 0.0);
        ras.line_to_d(4.0, 0.0);
        ras.line_to_d(4.0, 1.0);
        ras.line_to_d(2.0, 1.0);
        ras.styles(1, 0);
        ras.move_to_d(2.0, 0.0);
        ras.line_to_d(2.0, 1.0);

        let cov = sweep_all(&mut ras);
        let style_at = |x: i32| {
            cov.iter()
                .filter(|c| c.2 == x && c.3 == 255)
                .map(|c| c.1)
                .collect::<Vec<_>>()
        };
        assert_eq!(style_at(0), vec![0]);
        assert_eq!(style_at(1), vec![0]);
        assert_eq!(style_at(2), vec![1]);
        assert_eq!(style_at(3), vec![1]);
    }

    #[test]
    fn test_layer_order() {
        let mut ras = RasterizerCompoundAa::new();
        ras.styles(3, -1);
        rect(&mut ras, 0.0, 0.0, 1.0, 1.0);
        ras.styles(5, -1);
        rect(&mut ras, 0.0, 0.0, 1.0, 1.0);
        assert!(ras.rewind_scanlines());
        assert_eq!(ras.sweep_styles(), 2);
        assert_eq!((ras.style(0), ras.style(1)), (5, 3));

        ras.layer_order(LayerOrder::Inverse);
        assert!(ras.rewind_scanlines());
        assert_eq!(ras.sweep_styles(), 2);
        assert_eq!((ras.style(0), ras.style(1)), (3, 5));
    }

    #[test]
    fn test_winding_rules() {
        let mut nonzero = RasterizerCompoundAa::new();
        nonzero.styles(0, -1);
        rect(&mut nonzero, 0.0, 0.0, 3.0, 1.0);
        rect(&mut nonzero, 1.0, 0.0, 2.0, 1.0);
        let cov = sweep_all(&mut nonzero);
        assert!(cov.iter().any(|c| c.2 == 1 && c.3 == 255));

        let mut even_odd = RasterizerCompoundAa::new();
        even_odd.winding_rule(WindingRule::EvenOdd);
        even_odd.styles(0, -1);
        rect(&mut even_odd, 0.0, 0.0, 3.0, 1.0);
        rect(&mut even_odd, 1.0, 0.0, 2.0, 1.0);
        let cov = sweep_all(&mut even_odd);
        assert!(cov.iter().all(|c| c.2 != 1 || c.3 == 0));
        assert!(cov.iter().any(|c| c.2 == 0 && c.3 == 255));
    }

    #[test]
    fn test_clipping_keeps_coverage_of_offscreen_edges() {
        // The left edge lies outside the clip box. The coverage it starts
        // must still reach the visible cells.
        let mut ras = RasterizerCompoundAa::new();
        ras.clip_box(0.0, 0.0, 4.0, 4.0);
        ras.styles(0, -1);
        rect(&mut ras, -10.0, -10.0, 2.0, 2.0);
        let cov = sweep_all(&mut ras);
        assert!(cov.iter().all(|c| c.0 >= 0 && c.0 < 4 && c.2 >= 0 && c.2 < 4));
        let full: Vec<_> = cov.iter().filter(|c| c.3 == 255).map(|c| (c.0, c.2)).collect();
        assert_eq!(full, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_fully_outside_is_empty() {
        let mut ras = RasterizerCompoundAa::new();
        ras.clip_box(0.0, 0.0, 4.0, 4.0);
        ras.styles(0, -1);
        rect(&mut ras, 0.0, 10.0, 2.0, 12.0);
        assert!(sweep_all(&mut ras).iter().all(|c| c.3 == 0));
    }

    #[test]
    fn test_gamma_table_applies() {
        let mut ras = RasterizerCompoundAa::new();
        ras.gamma(&GammaPower::new(0.5));
        ras.styles(0, -1);
        rect(&mut ras, 0.75, 0.0, 1.0, 1.0);
        let cov = sweep_all(&mut ras);
        // A quarter pixel of coverage, brightened by the curve.
        assert_eq!(cov.len(), 1);
        assert!(cov[0].3 > 100, "{:?}", cov);
    }
}
