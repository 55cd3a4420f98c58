// Booking-limit engine: holds the ordered fare classes of a cabin and derives
// their nested protections, booking limits and aggregate revenue figures

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::bucket::{Bucket, FareClass};
use crate::cursor::PairCursor;

// Error types for the holder
#[derive(Error, Debug)]
pub enum HolderError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Cumulated protection decreases at class {rank}: {current} < {previous}")]
    DataInvariant {
        rank: usize,
        previous: f64,
        current: f64,
    },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),
}

pub const DEFAULT_CABIN_CAPACITY: f64 = 100.0;

// Holder configuration options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HolderConfig {
    pub cabin_capacity: f64,
    // Pre-allocation only, the number of buckets may exceed it
    pub bucket_capacity_hint: Option<usize>,
    // Reject decreasing cumulated protections instead of computing negative protections
    pub validate_monotonicity: bool,
}

impl Default for HolderConfig {
    fn default() -> Self {
        Self {
            cabin_capacity: DEFAULT_CABIN_CAPACITY,
            bucket_capacity_hint: None,
            validate_monotonicity: false,
        }
    }
}

/// Ordered list of buckets/classes of one cabin.
///
/// Insertion order is the fare-class rank: the first bucket is the highest
/// yield, most protected class. The holder owns its buckets and overwrites
/// their protection and cumulated booking limit on every recalculation.
#[derive(Debug, Clone)]
pub struct BucketHolder<B = Bucket> {
    cabin_capacity: f64,
    validate_monotonicity: bool,
    buckets: Vec<B>,
    cursor: Option<PairCursor>,
    tagged: Option<usize>,
    total_mean_demand: f64,
    demand_factor: f64,
    optimal_revenue: f64,
}

impl<B: FareClass> Default for BucketHolder<B> {
    fn default() -> Self {
        Self::build(HolderConfig::default())
    }
}

impl<B: FareClass> BucketHolder<B> {
    pub fn new(cabin_capacity: f64) -> Result<Self, HolderError> {
        Self::with_config(HolderConfig {
            cabin_capacity,
            ..Default::default()
        })
    }

    pub fn with_config(config: HolderConfig) -> Result<Self, HolderError> {
        if !config.cabin_capacity.is_finite() || config.cabin_capacity < 0.0 {
            return Err(HolderError::ConfigError(format!(
                "cabin capacity must be a finite, non-negative number of seats, got {}",
                config.cabin_capacity
            )));
        }

        Ok(Self::build(config))
    }

    fn build(config: HolderConfig) -> Self {
        let buckets = match config.bucket_capacity_hint {
            Some(hint) => Vec::with_capacity(hint),
            None => Vec::new(),
        };

        Self {
            cabin_capacity: config.cabin_capacity,
            validate_monotonicity: config.validate_monotonicity,
            buckets,
            cursor: None,
            tagged: None,
            total_mean_demand: 0.0,
            demand_factor: 0.0,
            optimal_revenue: 0.0,
        }
    }

    pub fn cabin_capacity(&self) -> f64 {
        self.cabin_capacity
    }

    pub fn total_mean_demand(&self) -> f64 {
        self.total_mean_demand
    }

    // Ratio between total mean demand and capacity
    pub fn demand_factor(&self) -> f64 {
        self.demand_factor
    }

    // Sum, for each bucket/class, of the price times the protection
    pub fn optimal_revenue(&self) -> f64 {
        self.optimal_revenue
    }

    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> std::slice::Iter<'_, B> {
        self.buckets.iter()
    }

    pub fn into_buckets(self) -> Vec<B> {
        self.buckets
    }

    pub fn add_bucket(&mut self, bucket: B) {
        self.buckets.push(bucket);
    }

    /// Set the current cursor on the first bucket and the next cursor on the
    /// second one (or on the first as well when there is only one bucket).
    /// An empty holder leaves the cursors untouched.
    pub fn begin(&mut self) {
        if let Some(cursor) = PairCursor::begin(self.buckets.len()) {
            self.cursor = Some(cursor);
        }
    }

    /// Move both cursors one bucket forward; each holds on the last bucket.
    pub fn iterate(&mut self) {
        let len = self.buckets.len();
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.iterate(len);
        }
    }

    // None until begin() has run on a non-empty holder
    pub fn current_bucket(&self) -> Option<&B> {
        self.buckets.get(self.cursor?.current())
    }

    pub fn current_bucket_mut(&mut self) -> Option<&mut B> {
        let index = self.cursor?.current();
        self.buckets.get_mut(index)
    }

    pub fn next_bucket(&self) -> Option<&B> {
        self.buckets.get(self.cursor?.next())
    }

    pub fn next_bucket_mut(&mut self) -> Option<&mut B> {
        let index = self.cursor?.next();
        self.buckets.get_mut(index)
    }

    // Remember the current cursor position
    pub fn tag(&mut self) {
        self.tagged = self.cursor.map(|c| c.current());
    }

    pub fn tagged_bucket(&self) -> Option<&B> {
        self.tagged.and_then(|index| self.buckets.get(index))
    }

    /// Cumulated protection of the bucket preceding the current one, or 0.0
    /// when the current bucket is the first one.
    pub fn previous_cumulated_protection(&self) -> f64 {
        match self.cursor {
            Some(c) if c.current() > 0 => self
                .buckets
                .get(c.current() - 1)
                .map_or(0.0, |b| b.cumulated_protection()),
            _ => 0.0,
        }
    }

    /// Derive, from the cumulated protections, the protection and the
    /// cumulated booking limit of every bucket.
    ///
    /// Bucket(1) gets the whole capacity as booking limit. For j in 1..n-1,
    /// Bucket(j+1) gets `capacity - y(j)` as booking limit and `y(j+1) - y(j)`
    /// as protection, walking the holder with the current/next cursor pair.
    pub fn calculate_protection_and_booking_limits(&mut self) -> Result<(), HolderError> {
        if self.buckets.is_empty() {
            return Err(HolderError::Precondition(
                "cannot compute protections with no buckets".to_string(),
            ));
        }
        if self.validate_monotonicity {
            self.check_monotonicity()?;
        }

        let nb_of_classes = self.buckets.len();
        let capacity = self.cabin_capacity;

        self.begin();
        if let Some(first) = self.current_bucket_mut() {
            first.set_cumulated_booking_limit(capacity);
            let y1 = first.cumulated_protection();
            first.set_protection(y1);
        }

        for j in 1..nb_of_classes {
            let yjm1 = match self.current_bucket() {
                Some(current) => current.cumulated_protection(),
                None => break,
            };
            let Some(next) = self.next_bucket_mut() else {
                break;
            };

            next.set_cumulated_booking_limit(capacity - yjm1);
            let yj = next.cumulated_protection();
            next.set_protection(yj - yjm1);

            if yj < yjm1 {
                warn!(
                    class = j + 1,
                    previous = yjm1,
                    current = yj,
                    "cumulated protection decreases, protection is negative"
                );
            }
            trace!(
                class = j + 1,
                booking_limit = capacity - yjm1,
                protection = yj - yjm1,
                "bucket updated"
            );

            self.iterate();
        }

        Ok(())
    }

    fn check_monotonicity(&self) -> Result<(), HolderError> {
        for (j, pair) in self.buckets.windows(2).enumerate() {
            let previous = pair[0].cumulated_protection();
            let current = pair[1].cumulated_protection();
            if current < previous {
                return Err(HolderError::DataInvariant {
                    rank: j + 2,
                    previous,
                    current,
                });
            }
        }
        Ok(())
    }

    /// Re-calculate the total mean demand, demand factor and optimal revenue.
    /// Relies on protections already computed; a zero capacity leaves the
    /// demand factor as it was.
    pub fn calculate_mean_demand_and_optimal_revenue(&mut self) {
        self.total_mean_demand = 0.0;
        self.optimal_revenue = 0.0;

        for bucket in &self.buckets {
            self.total_mean_demand += bucket.mean();
            self.optimal_revenue += bucket.average_yield() * bucket.protection();
        }

        if self.cabin_capacity != 0.0 {
            self.demand_factor = self.total_mean_demand / self.cabin_capacity;
        }
    }

    pub fn recalculate(&mut self) -> Result<(), HolderError> {
        debug!(
            cabin_capacity = self.cabin_capacity,
            classes = self.buckets.len(),
            "recalculating booking limits"
        );

        self.calculate_protection_and_booking_limits()?;
        self.calculate_mean_demand_and_optimal_revenue();

        debug!(
            total_mean_demand = self.total_mean_demand,
            demand_factor = self.demand_factor,
            optimal_revenue = self.optimal_revenue,
            "recalculation done"
        );
        Ok(())
    }

    // Cumulated booking limits, in class order
    pub fn booking_limits(&self) -> Vec<f64> {
        self.buckets
            .iter()
            .map(|b| b.cumulated_booking_limit())
            .collect()
    }

    pub fn lowest_average_yield(&mut self) -> Result<f64, HolderError> {
        let nb_of_buckets = self.buckets.len();
        if nb_of_buckets == 0 {
            return Err(HolderError::Precondition(
                "cannot compute the lowest average yield with no buckets".to_string(),
            ));
        }

        self.begin();
        let mut lowest = self
            .current_bucket()
            .map_or(f64::INFINITY, |b| b.average_yield());

        for _ in 1..nb_of_buckets {
            if let Some(next) = self.next_bucket() {
                lowest = lowest.min(next.average_yield());
            }
            self.iterate();
        }

        Ok(lowest)
    }
}
