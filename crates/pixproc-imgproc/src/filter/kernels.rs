use pixproc_image::ImageError;

/// A square convolution kernel with an odd side length.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] if `size` is even or zero, or if
    /// `weights` does not hold `size * size` values.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self, ImageError> {
        if size % 2 == 0 {
            return Err(ImageError::InvalidArgument(format!(
                "kernel size must be odd, got {size}"
            )));
        }
        if weights.len() != size * size {
            return Err(ImageError::InvalidChannelShape(weights.len(), size * size));
        }
        Ok(Self { size, weights })
    }

    fn from_3x3(rows: [[f32; 3]; 3]) -> Self {
        Self {
            size: 3,
            weights: rows.concat(),
        }
    }

    fn from_5x5(rows: [[f32; 5]; 5]) -> Self {
        Self {
            size: 5,
            weights: rows.concat(),
        }
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the centre tap to the border.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Row-major weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Iterate over `(dx, dy, weight)` offsets from the centre tap.
    pub fn taps(&self) -> impl Iterator<Item = (isize, isize, f32)> + '_ {
        let r = self.radius() as isize;
        let size = self.size;
        self.weights
            .iter()
            .enumerate()
            .map(move |(i, &w)| ((i % size) as isize - r, (i / size) as isize - r, w))
    }
}

/// Horizontal and vertical Sobel kernels.
pub fn sobel() -> (Kernel, Kernel) {
    (
        Kernel::from_3x3([[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]]),
        Kernel::from_3x3([[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]]),
    )
}

/// Horizontal and vertical Kirsch compass kernels.
pub fn kirsch() -> (Kernel, Kernel) {
    (
        Kernel::from_3x3([[5.0, 5.0, 5.0], [-3.0, 0.0, -3.0], [-3.0, -3.0, -3.0]]),
        Kernel::from_3x3([[5.0, -3.0, -3.0], [5.0, 0.0, -3.0], [5.0, -3.0, -3.0]]),
    )
}

/// Horizontal and vertical Prewitt kernels.
pub fn prewitt() -> (Kernel, Kernel) {
    (
        Kernel::from_3x3([[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]]),
        Kernel::from_3x3([[1.0, 1.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -1.0, -1.0]]),
    )
}

/// Horizontal and vertical Scharr kernels.
pub fn scharr() -> (Kernel, Kernel) {
    (
        Kernel::from_3x3([[-3.0, 0.0, 3.0], [-10.0, 0.0, 10.0], [-3.0, 0.0, 3.0]]),
        Kernel::from_3x3([[3.0, 10.0, 3.0], [0.0, 0.0, 0.0], [-3.0, -10.0, -3.0]]),
    )
}

/// 3x3 Laplacian.
pub fn laplacian_3x3() -> Kernel {
    Kernel::from_3x3([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])
}

/// 5x5 Laplacian.
pub fn laplacian_5x5() -> Kernel {
    let mut weights = vec![-1.0; 25];
    weights[12] = 24.0;
    Kernel {
        size: 5,
        weights,
    }
}

/// 5x5 Laplacian of Gaussian.
pub fn laplacian_of_gaussian() -> Kernel {
    Kernel::from_5x5([
        [0.0, 0.0, -1.0, 0.0, 0.0],
        [0.0, -1.0, -2.0, -1.0, 0.0],
        [-1.0, -2.0, 16.0, -2.0, -1.0],
        [0.0, -1.0, -2.0, -1.0, 0.0],
        [0.0, 0.0, -1.0, 0.0, 0.0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_validation() {
        assert!(matches!(
            Kernel::new(2, vec![0.0; 4]),
            Err(ImageError::InvalidArgument(_))
        ));
        assert!(matches!(
            Kernel::new(3, vec![0.0; 8]),
            Err(ImageError::InvalidChannelShape(8, 9))
        ));
    }

    #[test]
    fn kernels_are_zero_sum() {
        let (sx, sy) = sobel();
        let (kx, ky) = kirsch();
        let singles = [laplacian_3x3(), laplacian_5x5(), laplacian_of_gaussian()];
        for k in [&sx, &sy, &kx, &ky].into_iter().chain(singles.iter()) {
            assert_eq!(k.weights().iter().sum::<f32>(), 0.0);
        }
    }

    #[test]
    fn taps_are_centred() {
        let (sx, _) = sobel();
        let taps = sx.taps().collect::<Vec<_>>();
        assert_eq!(taps[0], (-1, -1, -1.0));
        assert_eq!(taps[5], (1, 0, 2.0));
        assert_eq!(laplacian_5x5().taps().nth(12), Some((0, 0, 24.0)));
    }
}
