use histobar_common::{HistobarError, Result, DEFAULT_AUTO_BUCKETS};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// An inclusive `[from, to]` bucket and the number of samples that landed in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    from: i64,
    to: i64,
    count: u64,
}

impl Category {
    fn new(from: i64, to: i64) -> Self {
        Self { from, to, count: 0 }
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn contains(&self, value: i64) -> bool {
        self.from <= value && value <= self.to
    }

    fn increment(&mut self) {
        self.count += 1;
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} = {}", self.from, self.to, self.count)
    }
}

/// Samples bucketed into contiguous categories. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    min: i64,
    max: i64,
    categories: Vec<Category>,
    highest: Option<usize>,
}

impl Histogram {
    /// Ten equal-width categories spanning the samples' min..max.
    pub fn new(samples: &[i64]) -> Result<Self> {
        HistogramBuilder::new(samples).build()
    }

    /// One category per consecutive pair of (sorted) boundaries.
    pub fn with_boundaries(samples: &[i64], boundaries: &[i64]) -> Result<Self> {
        HistogramBuilder::new(samples)
            .boundaries(boundaries.to_vec())
            .build()
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// First category holding the maximum count; `None` when there are no categories.
    pub fn highest_count(&self) -> Option<&Category> {
        self.highest.map(|i| &self.categories[i])
    }

    pub(crate) fn highest_index(&self) -> Option<usize> {
        self.highest
    }

    pub fn total_count(&self) -> u64 {
        self.categories.iter().map(Category::count).sum()
    }
}

pub struct HistogramBuilder<'a> {
    samples: &'a [i64],
    boundaries: Option<Vec<i64>>,
    auto_buckets: u32,
}

impl<'a> HistogramBuilder<'a> {
    pub fn new(samples: &'a [i64]) -> Self {
        Self {
            samples,
            boundaries: None,
            auto_buckets: DEFAULT_AUTO_BUCKETS,
        }
    }

    pub fn boundaries(mut self, boundaries: Vec<i64>) -> Self {
        self.boundaries = Some(boundaries);
        self
    }

    /// Divisor for the auto-mode step. Values below 1 are treated as 1.
    pub fn auto_buckets(mut self, buckets: u32) -> Self {
        self.auto_buckets = buckets.max(1);
        self
    }

    pub fn build(self) -> Result<Histogram> {
        let mode = if self.boundaries.is_some() { "boundaries" } else { "auto" };
        let (min, max, mut categories) = match self.boundaries {
            None => {
                let (min, max) = min_max(self.samples).ok_or(HistobarError::EmptyInput("samples"))?;
                (min, max, auto_categories(min, max, self.auto_buckets))
            }
            Some(mut boundaries) => {
                boundaries.sort_unstable();
                boundaries.dedup();
                let (min, max) =
                    min_max(&boundaries).ok_or(HistobarError::EmptyInput("category boundaries"))?;
                (min, max, boundary_categories(&boundaries))
            }
        };

        let mut highest = None;
        if !categories.is_empty() {
            for &sample in self.samples {
                match categories.iter_mut().find(|c| c.contains(sample)) {
                    Some(category) => category.increment(),
                    None => trace!(sample, "sample outside every category, dropped"),
                }
            }
            highest = first_max(&categories);
        }

        debug!(
            mode,
            min,
            max,
            categories = categories.len(),
            samples = self.samples.len(),
            "histogram built"
        );
        Ok(Histogram {
            min,
            max,
            categories,
            highest,
        })
    }
}

fn min_max(values: &[i64]) -> Option<(i64, i64)> {
    let min = values.iter().copied().min()?;
    let max = values.iter().copied().max()?;
    Some((min, max))
}

// Runs in i128 so that spans close to the full i64 range cannot overflow.
// `step` of 0 yields one category per unit, so narrow spans get more than `buckets` categories.
fn auto_categories(min: i64, max: i64, buckets: u32) -> Vec<Category> {
    let (lo, hi) = (i128::from(min), i128::from(max));
    let step = (hi - lo) / i128::from(buckets.max(1));
    let mut categories = Vec::new();
    let mut from = lo;
    loop {
        let to = (from + step).min(i128::from(i64::MAX));
        categories.push(Category::new(from as i64, to as i64));
        if to >= hi {
            break;
        }
        from = to + 1;
    }
    categories
}

// Expects sorted, deduplicated boundaries.
fn boundary_categories(boundaries: &[i64]) -> Vec<Category> {
    boundaries
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let from = if i == 0 { pair[0] } else { pair[0] + 1 };
            Category::new(from, pair[1])
        })
        .collect()
}

fn first_max(categories: &[Category]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in categories.iter().enumerate() {
        match best {
            Some(b) if categories[b].count >= c.count => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(h: &Histogram) -> Vec<(i64, i64)> {
        h.categories().iter().map(|c| (c.from(), c.to())).collect()
    }

    fn counts(h: &Histogram) -> Vec<u64> {
        h.categories().iter().map(Category::count).collect()
    }

    #[test]
    fn narrow_span_gets_one_category_per_unit() {
        let h = Histogram::new(&[1, 2, 2, 3, 3, 3]).unwrap();
        assert_eq!((h.min(), h.max()), (1, 3));
        assert_eq!(ranges(&h), vec![(1, 1), (2, 2), (3, 3)]);
        assert_eq!(counts(&h), vec![1, 2, 3]);
        let top = h.highest_count().unwrap();
        assert_eq!((top.from(), top.to(), top.count()), (3, 3, 3));
    }

    #[test]
    fn single_value_gives_single_category() {
        let h = Histogram::new(&[7, 7, 7]).unwrap();
        assert_eq!(ranges(&h), vec![(7, 7)]);
        assert_eq!(counts(&h), vec![3]);
    }

    #[test]
    fn wide_span_uses_ten_steps() {
        let samples: Vec<i64> = (0..=100).collect();
        let h = Histogram::new(&samples).unwrap();
        assert_eq!(h.categories().len(), 10);
        assert_eq!(h.categories()[0].from(), 0);
        assert_eq!(h.categories()[0].to(), 10);
        assert_eq!(h.categories()[1].from(), 11);
        assert_eq!(h.categories()[9].to(), 109);
        assert_eq!(h.total_count(), 101);
    }

    #[test]
    fn last_auto_category_may_overshoot_max() {
        let h = Histogram::new(&[0, 25]).unwrap();
        let last = h.categories().last().unwrap();
        assert_eq!((last.from(), last.to()), (24, 26));
    }

    #[test]
    fn auto_categories_are_contiguous_and_cover_span() {
        for samples in [vec![-37, 4, 1000], vec![5, 6], vec![-3, -3], vec![i64::MIN, i64::MAX]] {
            let h = Histogram::new(&samples).unwrap();
            let cats = h.categories();
            assert_eq!(cats[0].from(), h.min());
            assert!(cats.last().unwrap().to() >= h.max());
            for pair in cats.windows(2) {
                assert_eq!(pair[0].to() + 1, pair[1].from());
            }
            assert_eq!(h.total_count(), samples.len() as u64);
        }
    }

    #[test]
    fn custom_bucket_divisor() {
        let samples: Vec<i64> = (0..=20).collect();
        let h = HistogramBuilder::new(&samples).auto_buckets(2).build().unwrap();
        assert_eq!(ranges(&h), vec![(0, 10), (11, 21)]);
        assert_eq!(counts(&h), vec![11, 10]);
    }

    #[test]
    fn empty_samples_in_auto_mode_fail() {
        assert!(matches!(Histogram::new(&[]), Err(HistobarError::EmptyInput("samples"))));
    }

    #[test]
    fn boundaries_form_inclusive_ranges() {
        let h = Histogram::with_boundaries(&[5, 15, 10, 25], &[0, 10, 20]).unwrap();
        assert_eq!(ranges(&h), vec![(0, 10), (11, 20)]);
        assert_eq!(counts(&h), vec![2, 1]);
        assert_eq!((h.min(), h.max()), (0, 20));
        assert_eq!(h.total_count(), 3);
    }

    #[test]
    fn boundaries_are_sorted_and_deduplicated() {
        let h = Histogram::with_boundaries(&[], &[20, 0, 10, 10]).unwrap();
        assert_eq!(ranges(&h), vec![(0, 10), (11, 20)]);
        assert!(h.categories().iter().all(|c| c.from() <= c.to()));
    }

    #[test]
    fn single_boundary_has_no_categories() {
        let h = Histogram::with_boundaries(&[1, 2, 3], &[5]).unwrap();
        assert!(h.is_empty());
        assert!(h.highest_count().is_none());
        assert_eq!((h.min(), h.max()), (5, 5));
    }

    #[test]
    fn empty_boundaries_fail() {
        assert!(matches!(
            Histogram::with_boundaries(&[1], &[]),
            Err(HistobarError::EmptyInput("category boundaries"))
        ));
    }

    #[test]
    fn ties_pick_first_category() {
        let h = Histogram::with_boundaries(&[1, 2, 15, 16], &[0, 10, 20]).unwrap();
        assert_eq!(h.highest_count().unwrap().from(), 0);
    }

    #[derive(Clone)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn build_event_records_mode() {
        let captured = CaptureWriter(Default::default());
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            Histogram::new(&[1, 2]).unwrap();
            Histogram::with_boundaries(&[1], &[0, 10]).unwrap();
        });
        let out = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let events: Vec<&str> = out.lines().filter(|l| l.contains("histogram built")).collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].contains("mode=\"auto\""));
        assert!(events[1].contains("mode=\"boundaries\""));
    }

    #[test]
    fn category_display() {
        let h = Histogram::with_boundaries(&[3], &[0, 10]).unwrap();
        assert_eq!(h.categories()[0].to_string(), "0-10 = 1");
    }
}
