use std::{f32::consts::PI, fmt, str::FromStr};

use pixproc_image::ImageError;

/// A one dimensional reconstruction filter used for resampling.
///
/// `weight` is evaluated at the distance, in source pixels, between a tap and
/// the sample centre. It must be zero outside `[-radius, radius]`.
pub trait Resampler: Send + Sync {
    /// Half width of the filter support.
    fn radius(&self) -> f32;

    /// Filter response at `x`.
    fn weight(&self, x: f32) -> f32;

    /// Whether the filter picks a single nearest pixel, allowing a direct
    /// lookup instead of weighted sums.
    fn is_nearest(&self) -> bool {
        false
    }
}

#[inline]
fn sinc(x: f32) -> f32 {
    if x.abs() < f32::EPSILON {
        return 1.0;
    }
    let x = x * PI;
    x.sin() / x
}

/// Picks the closest source pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NearestNeighbor;

impl Resampler for NearestNeighbor {
    fn radius(&self) -> f32 {
        1.0
    }

    fn weight(&self, x: f32) -> f32 {
        if (-0.5..0.5).contains(&x) {
            1.0
        } else {
            0.0
        }
    }

    fn is_nearest(&self) -> bool {
        true
    }
}

/// Averages the source pixels covered by each destination pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxFilter;

impl Resampler for BoxFilter {
    fn radius(&self) -> f32 {
        0.5
    }

    fn weight(&self, x: f32) -> f32 {
        if x > -0.5 && x <= 0.5 {
            1.0
        } else {
            0.0
        }
    }
}

/// Linear interpolation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Triangle;

impl Resampler for Triangle {
    fn radius(&self) -> f32 {
        1.0
    }

    fn weight(&self, x: f32) -> f32 {
        (1.0 - x.abs()).max(0.0)
    }
}

/// Windowed sinc with `radius` lobes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lanczos {
    radius: f32,
}

impl Lanczos {
    /// Two lobes.
    pub const LANCZOS2: Lanczos = Lanczos { radius: 2.0 };
    /// Three lobes.
    pub const LANCZOS3: Lanczos = Lanczos { radius: 3.0 };
    /// Five lobes.
    pub const LANCZOS5: Lanczos = Lanczos { radius: 5.0 };
    /// Eight lobes.
    pub const LANCZOS8: Lanczos = Lanczos { radius: 8.0 };

    /// Create a Lanczos filter with the given number of lobes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] if `radius` is not a positive number.
    pub fn new(radius: f32) -> Result<Self, ImageError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ImageError::InvalidArgument(format!(
                "lanczos radius must be > 0, got {radius}"
            )));
        }
        Ok(Self { radius })
    }
}

impl Default for Lanczos {
    fn default() -> Self {
        Self::LANCZOS3
    }
}

impl Resampler for Lanczos {
    fn radius(&self) -> f32 {
        self.radius
    }

    fn weight(&self, x: f32) -> f32 {
        if x.abs() < self.radius {
            sinc(x) * sinc(x / self.radius)
        } else {
            0.0
        }
    }
}

/// Mitchell-Netravali family of cubic splines, parameterised by `b` and `c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spline {
    b: f32,
    c: f32,
}

impl Spline {
    /// Catmull-Rom cubic, `b = 0, c = 0.5`.
    pub const BICUBIC: Spline = Spline { b: 0.0, c: 0.5 };
    /// Smooth cubic B-spline, `b = 1, c = 0`.
    pub const SPLINE: Spline = Spline { b: 1.0, c: 0.0 };
    /// Mitchell-Netravali, `b = c = 1/3`.
    pub const MITCHELL_NETRAVALI: Spline = Spline {
        b: 1.0 / 3.0,
        c: 1.0 / 3.0,
    };
    /// Robidoux cubic.
    pub const ROBIDOUX: Spline = Spline {
        b: 0.378_215_76,
        c: 0.310_892_12,
    };
    /// Hermite cubic, `b = c = 0`.
    pub const HERMITE: Spline = Spline { b: 0.0, c: 0.0 };

    /// Create a cubic spline with custom parameters.
    pub fn new(b: f32, c: f32) -> Self {
        Self { b, c }
    }
}

impl Resampler for Spline {
    fn radius(&self) -> f32 {
        2.0
    }

    fn weight(&self, x: f32) -> f32 {
        let (b, c) = (self.b, self.c);
        let x = x.abs();
        let x2 = x * x;
        let x3 = x2 * x;

        if x < 1.0 {
            ((12.0 - 9.0 * b - 6.0 * c) * x3
                + (-18.0 + 12.0 * b + 6.0 * c) * x2
                + (6.0 - 2.0 * b))
                / 6.0
        } else if x < 2.0 {
            ((-b - 6.0 * c) * x3
                + (6.0 * b + 30.0 * c) * x2
                + (-12.0 * b - 48.0 * c) * x
                + (8.0 * b + 24.0 * c))
                / 6.0
        } else {
            0.0
        }
    }
}

/// Sinc windowed by a parabola, three lobes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Welch;

impl Resampler for Welch {
    fn radius(&self) -> f32 {
        3.0
    }

    fn weight(&self, x: f32) -> f32 {
        let x = x.abs();
        if x < 3.0 {
            sinc(x) * (1.0 - x * x / 9.0)
        } else {
            0.0
        }
    }
}

/// Runtime selection of a built-in resampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeFilter {
    /// See [`NearestNeighbor`].
    NearestNeighbor,
    /// See [`BoxFilter`].
    Box,
    /// See [`Triangle`].
    Triangle,
    /// [`Lanczos`] with two lobes.
    Lanczos2,
    /// [`Lanczos`] with three lobes.
    Lanczos3,
    /// [`Lanczos`] with five lobes.
    Lanczos5,
    /// [`Lanczos`] with eight lobes.
    Lanczos8,
    /// [`Spline::BICUBIC`].
    #[default]
    Bicubic,
    /// [`Spline::SPLINE`].
    Spline,
    /// [`Spline::MITCHELL_NETRAVALI`].
    MitchellNetravali,
    /// [`Spline::ROBIDOUX`].
    Robidoux,
    /// [`Spline::HERMITE`].
    Hermite,
    /// See [`Welch`].
    Welch,
}

impl ResizeFilter {
    /// Every built-in filter.
    pub const ALL: [ResizeFilter; 13] = [
        ResizeFilter::NearestNeighbor,
        ResizeFilter::Box,
        ResizeFilter::Triangle,
        ResizeFilter::Lanczos2,
        ResizeFilter::Lanczos3,
        ResizeFilter::Lanczos5,
        ResizeFilter::Lanczos8,
        ResizeFilter::Bicubic,
        ResizeFilter::Spline,
        ResizeFilter::MitchellNetravali,
        ResizeFilter::Robidoux,
        ResizeFilter::Hermite,
        ResizeFilter::Welch,
    ];

    fn resampler(&self) -> &'static dyn Resampler {
        match self {
            ResizeFilter::NearestNeighbor => &NearestNeighbor,
            ResizeFilter::Box => &BoxFilter,
            ResizeFilter::Triangle => &Triangle,
            ResizeFilter::Lanczos2 => &Lanczos::LANCZOS2,
            ResizeFilter::Lanczos3 => &Lanczos::LANCZOS3,
            ResizeFilter::Lanczos5 => &Lanczos::LANCZOS5,
            ResizeFilter::Lanczos8 => &Lanczos::LANCZOS8,
            ResizeFilter::Bicubic => &Spline::BICUBIC,
            ResizeFilter::Spline => &Spline::SPLINE,
            ResizeFilter::MitchellNetravali => &Spline::MITCHELL_NETRAVALI,
            ResizeFilter::Robidoux => &Spline::ROBIDOUX,
            ResizeFilter::Hermite => &Spline::HERMITE,
            ResizeFilter::Welch => &Welch,
        }
    }
}

impl Resampler for ResizeFilter {
    fn radius(&self) -> f32 {
        self.resampler().radius()
    }

    fn weight(&self, x: f32) -> f32 {
        self.resampler().weight(x)
    }

    fn is_nearest(&self) -> bool {
        self.resampler().is_nearest()
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResizeFilter::NearestNeighbor => "nearest",
            ResizeFilter::Box => "box",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::Lanczos2 => "lanczos2",
            ResizeFilter::Lanczos3 => "lanczos3",
            ResizeFilter::Lanczos5 => "lanczos5",
            ResizeFilter::Lanczos8 => "lanczos8",
            ResizeFilter::Bicubic => "bicubic",
            ResizeFilter::Spline => "spline",
            ResizeFilter::MitchellNetravali => "mitchell",
            ResizeFilter::Robidoux => "robidoux",
            ResizeFilter::Hermite => "hermite",
            ResizeFilter::Welch => "welch",
        };
        f.write_str(name)
    }
}

impl FromStr for ResizeFilter {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_ascii_lowercase();
        ResizeFilter::ALL
            .into_iter()
            .find(|filter| filter.to_string() == s)
            .ok_or_else(|| ImageError::InvalidArgument(format!("unknown resize filter '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn interpolating_filters() {
        // filters that reproduce the samples exactly at integer offsets
        let interpolating: [&dyn Resampler; 6] = [
            &Triangle,
            &Lanczos::LANCZOS2,
            &Lanczos::LANCZOS3,
            &Spline::BICUBIC,
            &Spline::HERMITE,
            &Welch,
        ];
        for filter in interpolating {
            assert_relative_eq!(filter.weight(0.0), 1.0);
            assert_relative_eq!(filter.weight(1.0), 0.0, epsilon = 1e-6);
            assert_relative_eq!(filter.weight(-2.0), 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_outside_support() {
        for filter in ResizeFilter::ALL {
            let r = filter.radius();
            assert_eq!(filter.weight(r + 0.01), 0.0, "{filter}");
            assert_eq!(filter.weight(-r - 0.01), 0.0, "{filter}");
        }
    }

    #[test]
    fn spline_b_spline_values() {
        assert_relative_eq!(Spline::SPLINE.weight(0.0), 4.0 / 6.0);
        assert_relative_eq!(Spline::SPLINE.weight(1.0), 1.0 / 6.0);
        assert_relative_eq!(Spline::MITCHELL_NETRAVALI.weight(0.0), 8.0 / 9.0, epsilon = 1e-6);
    }

    #[test]
    fn lanczos_radius() {
        assert_eq!(Lanczos::new(4.0).map(|l| l.radius()).ok(), Some(4.0));
        assert!(Lanczos::new(0.0).is_err());
        assert!(Lanczos::new(f32::NAN).is_err());
    }

    #[test]
    fn filter_names() -> Result<(), ImageError> {
        for filter in ResizeFilter::ALL {
            assert_eq!(filter.to_string().parse::<ResizeFilter>()?, filter);
        }
        assert!(ResizeFilter::NearestNeighbor.is_nearest());
        assert!(!ResizeFilter::Bicubic.is_nearest());
        assert!("gaussian".parse::<ResizeFilter>().is_err());
        Ok(())
    }
}
