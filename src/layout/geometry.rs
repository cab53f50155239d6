//! Ellipse geometry shared by the repulsion force and leader-line routing.
//!
//! All functions are pure. Ellipses are axis-aligned and described by their
//! semi-axes: `w` (half width) and `h` (half height).

/// An axis-aligned ellipse footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Half width.
    pub w: f64,
    /// Half height.
    pub h: f64,
}

impl Ellipse {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    /// Height-to-width ratio.
    #[inline]
    pub fn aspect(self) -> f64 {
        self.h / self.w
    }

    /// True unless both semi-axes are positive. A degenerate ellipse has no
    /// boundary direction, so it neither contains points nor repels.
    #[inline]
    pub fn is_degenerate(self) -> bool {
        !(self.w > 0.0 && self.h > 0.0)
    }

    /// Whether `(px, py)`, relative to the center, lies inside or on the boundary.
    pub fn contains(self, px: f64, py: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        (px * px) / (self.w * self.w) + (py * py) / (self.h * self.h) <= 1.0
    }
}

/// How far apart two ellipses are along the line joining their centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Center distance minus both boundary distances. Negative means overlap.
    pub gap: f64,
    /// How strongly the pair pushes, relative to a pair of circles.
    pub force_ratio: f64,
    /// Euclidean center distance.
    pub distance: f64,
}

/// Distance from an ellipse's center to its boundary along `y = g * x`.
///
/// Substituting the line into `x²/w² + y²/h² = 1` gives
/// `x = w·h / sqrt(h² + g²·w²)`.
pub fn ellipse_boundary_distance(ellipse: Ellipse, g: f64) -> f64 {
    let Ellipse { w, h } = ellipse;
    let x = w * h / (h * h + g * g * w * w).sqrt();
    let y = g * x;
    (x * x + y * y).sqrt()
}

/// Decompose the center delta `(dx, dy)` between ellipses `a` and `b` into a
/// signed gap and a force ratio.
///
/// Returns `None` when the centers coincide; there is no direction to push in.
pub fn separation(a: Ellipse, b: Ellipse, dx: f64, dy: f64) -> Option<Separation> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    if dx == 0.0 {
        let distance = dy.abs();
        return Some(Separation {
            gap: distance - a.h - b.h,
            force_ratio: (a.aspect() + b.aspect()) / 2.0,
            distance,
        });
    }

    if dy == 0.0 {
        let distance = dx.abs();
        return Some(Separation {
            gap: distance - a.w - b.w,
            force_ratio: 1.0,
            distance,
        });
    }

    let g = dy / dx;
    let da = ellipse_boundary_distance(a, g);
    let db = ellipse_boundary_distance(b, g);
    let distance = (dx * dx + dy * dy).sqrt();

    Some(Separation {
        gap: distance - da - db,
        force_ratio: (da / a.w + db / b.w) / 2.0,
        distance,
    })
}

/// Where the line from `source` to `target` crosses the boundary of an
/// ellipse with semi-axes `(rx, ry)` centered on `target`.
///
/// The returned point lies on the side of the ellipse facing `source`.
pub fn link_target_by_ellipse(source: (f64, f64), target: (f64, f64), rx: f64, ry: f64) -> (f64, f64) {
    let (sx, sy) = source;
    let (tx, ty) = target;

    if rx <= 0.0 || ry <= 0.0 {
        return target;
    }

    let dx = (sx - tx).abs();
    let dy = (sy - ty).abs();

    // Vertical line: tan(t) is undefined, the answer is the top/bottom vertex.
    if dx == 0.0 {
        let ny = if sy > ty { ty + ry } else { ty - ry };
        return (tx, ny);
    }

    let tan = (dy / dx).atan().tan();
    let tan2 = tan * tan;

    let ex = rx * ry / (ry * ry + rx * rx * tan2).sqrt();
    let ey = rx * ry / (rx * rx + ry * ry / tan2).sqrt();

    let nx = if sx > tx { tx + ex } else { tx - ex };
    let ny = if sy > ty { ty + ey } else { ty - ey };
    (nx, ny)
}
