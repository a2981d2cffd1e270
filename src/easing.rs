//! Easing curves for timeline tweens.
//!
//! Every curve maps normalized progress in [0, 1] to an interpolation
//! weight with `ease(0) = 0` and `ease(1) = 1`. Power curves follow the
//! usual web animation naming: `powerN` is a polynomial of degree `N + 1`,
//! so `PowerIn(2)` is a cubic ease-in.

/// Easing curve applied to a tween's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    /// Constant speed
    #[default]
    Linear,
    /// Slow start, fast end (acceleration)
    PowerIn(u8),
    /// Fast start, slow end (deceleration)
    PowerOut(u8),
    /// Slow start and end
    PowerInOut(u8),
    /// CSS-style cubic bezier with control points (x1, y1), (x2, y2)
    Bezier(f32, f32, f32, f32),
}

impl Ease {
    /// Eased weight for progress `t`; `t` is clamped to [0, 1].
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Ease::Linear => t,
            Ease::PowerIn(n) => t.powi(n as i32 + 1),
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Ease::PowerInOut(n) => {
                let k = n as i32 + 1;
                if t < 0.5 {
                    (2.0 * t).powi(k) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(k) / 2.0
                }
            }
            Ease::Bezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
        }
    }
}

/// Solve the bezier for parameter `u` with x(u) = t by Newton-Raphson,
/// then return y(u).
fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let mut guess = t;
    for _ in 0..8 {
        let x = bezier_1d(guess, x1, x2);
        let dx = bezier_derivative(guess, x1, x2);
        if dx.abs() < 1e-6 {
            break;
        }
        guess = (guess - (x - t) / dx).clamp(0.0, 1.0);
    }
    bezier_1d(guess, y1, y2)
}

/// 1D cubic bezier with P0 = 0 and P3 = 1.
#[inline]
fn bezier_1d(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_derivative(t: f32, p1: f32, p2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Ease; 8] = [
        Ease::Linear,
        Ease::PowerIn(1),
        Ease::PowerIn(2),
        Ease::PowerOut(2),
        Ease::PowerOut(3),
        Ease::PowerInOut(1),
        Ease::PowerInOut(2),
        Ease::Bezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn endpoints_are_fixed() {
        for ease in ALL {
            assert!(ease.apply(0.0).abs() < 1e-5, "{ease:?}");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-5, "{ease:?}");
        }
    }

    #[test]
    fn progress_is_clamped() {
        for ease in ALL {
            assert_eq!(ease.apply(-3.0), ease.apply(0.0));
            assert_eq!(ease.apply(7.0), ease.apply(1.0));
        }
    }

    #[test]
    fn power2_in_is_cubic() {
        assert!((Ease::PowerIn(2).apply(0.5) - 0.125).abs() < 1e-6);
        assert!((Ease::PowerOut(2).apply(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn in_accelerates_out_decelerates() {
        for n in 1..=4 {
            assert!(Ease::PowerIn(n).apply(0.3) < 0.3);
            assert!(Ease::PowerOut(n).apply(0.3) > 0.3);
        }
    }

    #[test]
    fn in_out_is_symmetric() {
        let e = Ease::PowerInOut(2);
        assert!((e.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((e.apply(0.2) + e.apply(0.8) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn curves_are_monotonic() {
        for ease in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!(v + 1e-5 >= prev, "{ease:?} dips at {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn linear_bezier_is_identity() {
        let e = Ease::Bezier(0.0, 0.0, 1.0, 1.0);
        for i in 0..=10 {
            let t = i as f32 / 10.0;
            assert!((e.apply(t) - t).abs() < 1e-3);
        }
    }
}
