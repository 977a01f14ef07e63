use std::{
    ops::Range,
    sync::atomic::{AtomicUsize, Ordering},
};

use pixproc_image::{Image, ImageError, PackedPixel, Rectangle};
use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

impl From<ParallelError> for ImageError {
    fn from(e: ParallelError) -> Self {
        ImageError::InvalidArgument(e.to_string())
    }
}

/// Controls how row-parallel operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Check the strategy before any work is dispatched.
    pub fn validate(&self) -> Result<(), ParallelError> {
        match self {
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            _ => Ok(()),
        }
    }
}

/// Progress report for one finished destination row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowProgress {
    /// Index of the row that was just written.
    pub row: usize,
    /// Number of rows finished so far, this one included.
    pub completed: usize,
    /// Number of rows the operation writes in total.
    pub total: usize,
}

/// Receives a [`RowProgress`] once per completed destination row.
///
/// Rows finish on worker threads, so calls may arrive concurrently and out
/// of row order. Every `completed` value from 1 to `total` is reported
/// exactly once.
pub trait ProgressObserver: Sync {
    /// Called after `progress.row` has been fully written.
    fn row_completed(&self, progress: RowProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(RowProgress) + Sync,
{
    fn row_completed(&self, progress: RowProgress) {
        self(progress)
    }
}

struct RowTracker<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    completed: AtomicUsize,
    total: usize,
}

impl<'a> RowTracker<'a> {
    fn new(observer: Option<&'a dyn ProgressObserver>, total: usize) -> Self {
        Self {
            observer,
            completed: AtomicUsize::new(0),
            total,
        }
    }

    fn row_done(&self, row: usize) {
        if let Some(observer) = self.observer {
            let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
            observer.row_completed(RowProgress {
                row,
                completed,
                total: self.total,
            });
        }
    }
}

/// Run `op` over consecutive rows of `width` elements.
///
/// `op` receives the row index relative to the start of `data`. Rows are
/// disjoint, so no synchronisation is needed between them.
pub fn par_rows_mut<T, F>(
    data: &mut [T],
    width: usize,
    strategy: ExecutionStrategy,
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    strategy.validate()?;
    if width == 0 || data.is_empty() {
        return Ok(());
    }

    let run = |(i, row): (usize, &mut [T])| op(i, row);

    match strategy {
        ExecutionStrategy::Serial => {
            data.chunks_exact_mut(width).enumerate().for_each(run);
        }
        ExecutionStrategy::Parallel => {
            data.par_chunks_exact_mut(width).enumerate().for_each(run);
        }
        ExecutionStrategy::Fixed(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;
            log::debug!("built a local pool with {n} threads");

            pool.install(|| {
                data.par_chunks_exact_mut(width).enumerate().for_each(run);
            });
        }
    }
    Ok(())
}

/// Run `op` over a range of destination rows, reporting each finished row.
///
/// `op` receives the absolute row index and the full-width row slice.
///
/// # Errors
///
/// Returns [`ImageError::OutOfRange`] if `rows` extends below the image, or
/// an invalid argument error for an invalid [`ExecutionStrategy`].
pub fn for_each_row<P, F>(
    dst: &mut Image<P>,
    rows: Range<usize>,
    strategy: ExecutionStrategy,
    observer: Option<&dyn ProgressObserver>,
    op: F,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    F: Fn(usize, &mut [P]) + Send + Sync,
{
    strategy.validate()?;
    if rows.is_empty() {
        return Ok(());
    }
    if rows.end > dst.height() {
        return Err(ImageError::OutOfRange {
            x: 0,
            y: rows.end,
            width: dst.width(),
            height: dst.height(),
        });
    }

    let width = dst.width();
    let start = rows.start;
    let tracker = RowTracker::new(observer, rows.len());
    let data = &mut dst.as_slice_mut()[rows.start * width..rows.end * width];

    par_rows_mut(data, width, strategy, |i, row| {
        op(start + i, row);
        tracker.row_done(start + i);
    })?;

    Ok(())
}

/// Apply a per-pixel function over a rectangle, in parallel by rows.
///
/// Every destination pixel inside `target_rect` (clipped to `dst`) whose
/// coordinates also fall inside `source_rect` (clipped to `src`) is replaced
/// by `f(x, y, src[x, y])`. Other destination pixels are left untouched.
///
/// # Example
///
/// ```
/// use pixproc_image::{Image, ImageSize, Rectangle, Rgba32};
/// use pixproc_imgproc::parallel::par_apply;
///
/// let size = ImageSize { width: 4, height: 4 };
/// let src = Image::from_size_val(size, Rgba32::RED);
/// let mut dst = Image::new(size);
///
/// let rect = Rectangle::new(1, 1, 2, 2);
/// par_apply(&src, &mut dst, rect, rect, |_, _, p| p, None).unwrap();
///
/// assert_eq!(dst.get(1, 1).unwrap(), Rgba32::RED);
/// assert_eq!(dst.get(0, 0).unwrap(), Rgba32::TRANSPARENT);
/// ```
pub fn par_apply<P, F>(
    src: &Image<P>,
    dst: &mut Image<P>,
    source_rect: Rectangle,
    target_rect: Rectangle,
    f: F,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    F: Fn(usize, usize, P) -> P + Send + Sync,
{
    par_apply_with(
        ExecutionStrategy::default(),
        src,
        dst,
        source_rect,
        target_rect,
        f,
        observer,
    )
}

/// Same as [`par_apply`] with an explicit [`ExecutionStrategy`].
pub fn par_apply_with<P, F>(
    strategy: ExecutionStrategy,
    src: &Image<P>,
    dst: &mut Image<P>,
    source_rect: Rectangle,
    target_rect: Rectangle,
    f: F,
    observer: Option<&dyn ProgressObserver>,
) -> Result<(), ImageError>
where
    P: PackedPixel,
    F: Fn(usize, usize, P) -> P + Send + Sync,
{
    let target = target_rect.intersect(&dst.bounds());
    let source = source_rect.intersect(&src.bounds());
    let pixels = src.read();

    for_each_row(
        dst,
        target.y..target.bottom(),
        strategy,
        observer,
        |y, row| {
            for x in target.x..target.right() {
                if source.contains(x, y) {
                    row[x] = f(x, y, pixels.get_unchecked(x, y));
                }
            }
        },
    )
}

/// Check that two images have the same size.
pub(crate) fn check_same_size<P: PackedPixel, Q: PackedPixel>(
    src: &Image<P>,
    dst: &Image<Q>,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixproc_image::{ImageSize, Rgba32};
    use std::sync::Mutex;

    fn ramp(size: ImageSize) -> Result<Image<Rgba32>, ImageError> {
        let data = (0..size.area())
            .map(|i| Rgba32::new(i as u8, 0, 0, 255))
            .collect();
        Image::from_vec(size, data)
    }

    #[test]
    fn rows_serial() -> Result<(), ParallelError> {
        let mut data = vec![0; 6];
        par_rows_mut(&mut data, 2, ExecutionStrategy::Serial, |y, row| {
            row.fill(y * 10)
        })?;
        assert_eq!(data, vec![0, 0, 10, 10, 20, 20]);
        Ok(())
    }

    #[test]
    fn rows_fixed() -> Result<(), ParallelError> {
        let mut data = vec![0; 8];
        par_rows_mut(&mut data, 4, ExecutionStrategy::Fixed(2), |y, row| {
            row.iter_mut().enumerate().for_each(|(x, v)| *v = y * 4 + x)
        })?;
        assert_eq!(data, (0..8).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn rows_fixed_zero_threads() {
        let mut data = vec![0; 4];
        let res = par_rows_mut(&mut data, 2, ExecutionStrategy::Fixed(0), |_, _| {});
        assert!(matches!(res, Err(ParallelError::InvalidThreadCount(0))));
    }

    #[test]
    fn apply_restricted_to_rectangles() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 4,
            height: 3,
        };
        let src = ramp(size)?;
        let mut dst = Image::from_size_val(size, Rgba32::BLUE);

        par_apply(
            &src,
            &mut dst,
            Rectangle::new(0, 0, 2, 3),
            Rectangle::new(1, 1, 3, 2),
            |x, y, p| Rgba32::new(p.r(), x as u8, y as u8, 255),
            None,
        )?;

        // inside both rectangles
        assert_eq!(dst.get(1, 1)?, Rgba32::new(5, 1, 1, 255));
        assert_eq!(dst.get(1, 2)?, Rgba32::new(9, 1, 2, 255));
        // inside the target but outside the source
        assert_eq!(dst.get(2, 1)?, Rgba32::BLUE);
        // outside the target
        assert_eq!(dst.get(0, 0)?, Rgba32::BLUE);
        Ok(())
    }

    #[test]
    fn observer_fires_once_per_row() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 5,
            height: 7,
        };
        let src = ramp(size)?;
        let mut dst = Image::new(size);
        let seen = Mutex::new(Vec::new());
        let observer = |p: RowProgress| {
            if let Ok(mut seen) = seen.lock() {
                seen.push(p);
            }
        };

        par_apply(
            &src,
            &mut dst,
            src.bounds(),
            Rectangle::new(0, 2, 5, 4),
            |_, _, p| p,
            Some(&observer),
        )?;

        let seen = seen.into_inner().unwrap_or_default();
        let mut rows = seen.iter().map(|p| p.row).collect::<Vec<_>>();
        let mut completed = seen.iter().map(|p| p.completed).collect::<Vec<_>>();
        rows.sort();
        completed.sort();
        assert_eq!(rows, vec![2, 3, 4, 5]);
        assert_eq!(completed, vec![1, 2, 3, 4]);
        assert!(seen.iter().all(|p| p.total == 4));
        Ok(())
    }

    #[test]
    fn rows_out_of_range() {
        let mut dst = Image::<Rgba32>::new(ImageSize {
            width: 2,
            height: 2,
        });
        let res = for_each_row(&mut dst, 0..3, ExecutionStrategy::Serial, None, |_, _| {});
        assert!(matches!(res, Err(ImageError::OutOfRange { .. })));
    }

    #[test]
    fn invalid_strategy_is_an_argument_error() {
        let mut dst = Image::<Rgba32>::new(ImageSize {
            width: 2,
            height: 2,
        });
        let res = for_each_row(&mut dst, 0..2, ExecutionStrategy::Fixed(0), None, |_, _| {});
        assert!(matches!(res, Err(ImageError::InvalidArgument(_))));
    }
}
