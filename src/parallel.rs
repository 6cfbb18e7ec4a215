use std::thread;
use std::sync::{ Mutex, PoisonError };
use std::sync::atomic::{ AtomicUsize, Ordering };

use crate::consts::SPARE_THREADS;

/// Hands out pixels to worker threads, row by row, each exactly once.
///
/// Taking the next pixel is the only step that needs a lock.
#[derive(Debug)]
pub struct PixelCursor {
    width: usize,
    height: usize,
    next: Mutex<(usize, usize)>,
}

impl PixelCursor {
    pub fn new(width: usize, height: usize) -> PixelCursor {
        PixelCursor { width, height, next: Mutex::new((0, 0)) }
    }

    /// The next pixel as `(col, row)`, or `None` once all are handed out.
    pub fn next_pixel(&self) -> Option<(usize, usize)> {
        // The cursor is never left half-updated, so poison is harmless.
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let (col, row) = *next;

        if self.width == 0 || row >= self.height {
            return None;
        }

        *next = if col + 1 == self.width { (0, row + 1) } else { (col + 1, row) };
        Some((col, row))
    }
}

/// Counts finished pixels for progress reports.
#[derive(Debug)]
pub struct Progress {
    done: AtomicUsize,
    total: usize,
}

impl Progress {
    pub fn new(total: usize) -> Progress {
        Progress { done: AtomicUsize::new(0), total }
    }

    /// Marks one more pixel finished.
    pub fn tick(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Whole percent finished. An empty job is 100% done.
    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }

        self.done().min(self.total) * 100 / self.total
    }
}

/// How many render threads to use.
///
/// `threads == 0` picks automatically: every core but `SPARE_THREADS`, and
/// at least one. Anything else is taken as given.
pub fn worker_count(threads: usize) -> usize {
    if threads > 0 {
        return threads;
    }

    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(SPARE_THREADS)
        .max(1)
}

/* Tests */

#[test]
fn cursor_walks_rows() {
    let cursor = PixelCursor::new(2, 2);

    assert_eq!(cursor.next_pixel(), Some((0, 0)));
    assert_eq!(cursor.next_pixel(), Some((1, 0)));
    assert_eq!(cursor.next_pixel(), Some((0, 1)));
    assert_eq!(cursor.next_pixel(), Some((1, 1)));
    assert_eq!(cursor.next_pixel(), None);
    assert_eq!(cursor.next_pixel(), None);

    assert_eq!(PixelCursor::new(0, 5).next_pixel(), None);
    assert_eq!(PixelCursor::new(5, 0).next_pixel(), None);
}

#[test]
fn cursor_hands_out_each_pixel_once() {
    let cursor = PixelCursor::new(37, 23);
    let progress = Progress::new(37 * 23);
    let seen: Vec<AtomicUsize> = (0..37 * 23).map(|_| AtomicUsize::new(0)).collect();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                while let Some((col, row)) = cursor.next_pixel() {
                    seen[row * 37 + col].fetch_add(1, Ordering::Relaxed);
                    progress.tick();
                }
            });
        }
    });

    assert!(seen.iter().all(|n| n.load(Ordering::Relaxed) == 1));
    assert_eq!(progress.done(), 37 * 23);
    assert_eq!(progress.percent(), 100);
}

#[test]
fn progress_percent() {
    let p = Progress::new(8);
    assert_eq!(p.percent(), 0);

    for _ in 0..3 {
        p.tick();
    }
    assert_eq!(p.percent(), 37);

    assert_eq!(Progress::new(0).percent(), 100);
}

#[test]
fn worker_count_defaults() {
    assert!(worker_count(0) >= 1);
    assert_eq!(worker_count(1), 1);
    assert_eq!(worker_count(7), 7);
}
