use pixproc_image::ImageError;

use super::kernels::Resampler;

/// Precomputed filter taps for resampling one axis.
///
/// For every destination index the table holds the contributing source
/// indices with their normalised weights. Indices are clamped into
/// `[0, source_extent)`, so border pixels are repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    source_extent: usize,
    windows: Vec<Vec<(usize, f32)>>,
}

impl WeightTable {
    /// Compute the taps for mapping `source_extent` pixels onto `dest_extent`.
    ///
    /// When downscaling, the kernel is stretched by the scale ratio so every
    /// source pixel contributes. A window whose weights sum to zero falls back
    /// to the single nearest source pixel.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidArgument`] if either extent is zero.
    pub fn compute<R: Resampler + ?Sized>(
        source_extent: usize,
        dest_extent: usize,
        kernel: &R,
    ) -> Result<Self, ImageError> {
        if source_extent == 0 || dest_extent == 0 {
            return Err(ImageError::InvalidArgument(format!(
                "cannot resample {source_extent} pixels onto {dest_extent}"
            )));
        }

        let ratio = source_extent as f32 / dest_extent as f32;
        let scale = ratio.max(1.0);
        let support = kernel.radius() * scale;
        let last = (source_extent - 1) as isize;

        let windows = (0..dest_extent)
            .map(|d| {
                let center = (d as f32 + 0.5) * ratio - 0.5;
                let left = (center - support).ceil() as isize;
                let right = (center + support).floor() as isize;

                let mut taps = (left..=right)
                    .map(|s| {
                        let w = kernel.weight((center - s as f32) / scale);
                        (s.clamp(0, last) as usize, w)
                    })
                    .filter(|&(_, w)| w != 0.0)
                    .collect::<Vec<_>>();

                let sum = taps.iter().map(|&(_, w)| w).sum::<f32>();
                if sum.abs() < f32::EPSILON {
                    let nearest = (center.round() as isize).clamp(0, last) as usize;
                    return vec![(nearest, 1.0)];
                }
                taps.iter_mut().for_each(|(_, w)| *w /= sum);
                taps
            })
            .collect::<Vec<_>>();

        log::debug!(
            "weight table {source_extent} -> {dest_extent}: support {support:.2}, {} taps",
            windows.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            source_extent,
            windows,
        })
    }

    /// Number of source pixels.
    pub fn source_extent(&self) -> usize {
        self.source_extent
    }

    /// Number of destination pixels.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether the table has no destination pixels.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The `(source_index, weight)` taps of destination index `d`.
    ///
    /// # Panics
    ///
    /// Panics if `d >= self.len()`.
    pub fn window(&self, d: usize) -> &[(usize, f32)] {
        &self.windows[d]
    }

    /// Iterate over all windows in destination order.
    pub fn windows(&self) -> impl Iterator<Item = &[(usize, f32)]> {
        self.windows.iter().map(Vec::as_slice)
    }
}
