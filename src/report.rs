// Report projections of a bucket holder: the CSV-style text report and a JSON snapshot
use std::fmt;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::bucket::{Bucket, FareClass};
use crate::bucket_holder::{BucketHolder, HolderConfig, HolderError};

// JSON input: the holder configuration and the buckets in class order
#[derive(Debug, Deserialize)]
pub struct HolderInput {
    #[serde(flatten)]
    pub config: HolderConfig,
    #[serde(default)]
    pub buckets: Vec<Bucket>,
}

// JSON output: aggregates and per-class results
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HolderSnapshot {
    pub cabin_capacity: f64,
    pub total_mean_demand: f64,
    pub demand_factor: f64,
    pub optimal_revenue: f64,
    pub classes: Vec<ClassSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassSnapshot {
    pub rank: usize,
    pub upper_yield: f64,
    pub average_yield: f64,
    pub mean: f64,
    pub standard_deviation: f64,
    pub protection: f64,
    pub cumulated_protection: f64,
    pub cumulated_booking_limit: f64,
}

impl<B: FareClass> From<&BucketHolder<B>> for HolderSnapshot {
    fn from(holder: &BucketHolder<B>) -> Self {
        let classes = holder
            .buckets()
            .enumerate()
            .map(|(rank, bucket)| ClassSnapshot {
                rank,
                upper_yield: bucket.upper_yield(),
                average_yield: bucket.average_yield(),
                mean: bucket.mean(),
                standard_deviation: bucket.standard_deviation(),
                protection: bucket.protection(),
                cumulated_protection: bucket.cumulated_protection(),
                cumulated_booking_limit: bucket.cumulated_booking_limit(),
            })
            .collect();

        HolderSnapshot {
            cabin_capacity: holder.cabin_capacity(),
            total_mean_demand: holder.total_mean_demand(),
            demand_factor: holder.demand_factor(),
            optimal_revenue: holder.optimal_revenue(),
            classes,
        }
    }
}

impl BucketHolder<Bucket> {
    /// Build a holder from a JSON document such as
    /// `{ "cabin_capacity": 100.0, "buckets": [{ "average_yield": 200.0, ... }] }`.
    /// Missing configuration fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, HolderError> {
        let input: HolderInput =
            serde_json::from_str(json).map_err(|e| HolderError::JsonParseError(e.to_string()))?;

        let mut holder = Self::with_config(input.config)?;
        for bucket in input.buckets {
            holder.add_bucket(bucket);
        }
        Ok(holder)
    }
}

impl<B: FareClass> BucketHolder<B> {
    pub fn snapshot(&self) -> HolderSnapshot {
        HolderSnapshot::from(self)
    }

    pub fn to_json_snapshot(&self) -> Result<String, HolderError> {
        serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| HolderError::JsonParseError(e.to_string()))
    }

    // Short description: capacity, total mean demand, demand factor, optimal revenue
    pub fn summary(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.cabin_capacity(),
            self.total_mean_demand(),
            self.demand_factor(),
            self.optimal_revenue()
        )
    }

    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<(), HolderError> {
        write!(out, "{}", self)?;
        out.flush()?;
        Ok(())
    }

    // Display on standard output
    pub fn display(&self) -> Result<(), HolderError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_report(&mut handle)
    }
}

// CSV output: header, one row per class (0-based rank) and a summary row
impl<B: FareClass> fmt::Display for BucketHolder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Class; Price; Mean; Std Dev; Protection; Cum. Protection; Cum. Bkg Limit;"
        )?;

        for (j, bucket) in self.buckets().enumerate() {
            writeln!(
                f,
                "{}; {}; {}; {}; {}; {}; {}",
                j,
                bucket.upper_yield(),
                bucket.mean(),
                bucket.standard_deviation(),
                bucket.protection(),
                bucket.cumulated_protection(),
                bucket.cumulated_booking_limit()
            )?;
        }

        writeln!(
            f,
            "Cabin Capacity = {}; Total Mean Demand = {}; Demand Factor = {}; Optimal Revenue = {}",
            self.cabin_capacity(),
            self.total_mean_demand(),
            self.demand_factor(),
            self.optimal_revenue()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JSON: &str = r#"{
        "cabin_capacity": 100.0,
        "buckets": [
            {
                "upper_yield": 220.0,
                "average_yield": 200.0,
                "mean": 25.0,
                "standard_deviation": 5.0,
                "cumulated_protection": 30.0
            },
            {
                "upper_yield": 110.0,
                "average_yield": 100.0,
                "mean": 50.0,
                "standard_deviation": 10.0,
                "cumulated_protection": 80.0
            }
        ]
    }"#;

    fn sample_holder() -> BucketHolder {
        let mut holder = BucketHolder::from_json(SAMPLE_JSON).unwrap();
        holder.recalculate().unwrap();
        holder
    }

    #[test]
    fn test_csv_report() {
        let holder = sample_holder();

        let expected = "Class; Price; Mean; Std Dev; Protection; Cum. Protection; Cum. Bkg Limit;\n\
                        0; 220; 25; 5; 30; 30; 100\n\
                        1; 110; 50; 10; 50; 80; 70\n\
                        Cabin Capacity = 100; Total Mean Demand = 75; Demand Factor = 0.75; Optimal Revenue = 11000\n";
        assert_eq!(holder.to_string(), expected);
    }

    #[test]
    fn test_report_of_empty_holder() {
        let holder: BucketHolder = BucketHolder::default();
        let report = holder.to_string();

        assert_eq!(report.lines().count(), 2);
        assert!(report.starts_with("Class; Price;"));
        assert!(report.contains("Cabin Capacity = 100; Total Mean Demand = 0"));
    }

    #[test]
    fn test_write_report_matches_display() {
        let holder = sample_holder();
        let mut buffer = Vec::new();
        holder.write_report(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), holder.to_string());
    }

    #[test]
    fn test_report_has_no_side_effects() {
        let holder = sample_holder();
        let before = holder.snapshot();
        let _ = holder.to_string();
        let _ = holder.summary();

        assert_eq!(before, holder.snapshot());
    }

    #[test]
    fn test_summary() {
        let holder = sample_holder();
        assert_eq!(holder.summary(), "100, 75, 0.75, 11000");
    }

    #[test]
    fn test_from_json_defaults() {
        let holder = BucketHolder::from_json(r#"{ "buckets": [{ "mean": 3.0 }] }"#).unwrap();

        assert_eq!(holder.cabin_capacity(), 100.0);
        assert_eq!(holder.size(), 1);
    }

    #[test]
    fn test_from_json_errors() {
        let invalid = BucketHolder::from_json("{ not json");
        assert!(matches!(invalid, Err(HolderError::JsonParseError(_))));

        let negative = BucketHolder::from_json(r#"{ "cabin_capacity": -5.0 }"#);
        assert!(matches!(negative, Err(HolderError::ConfigError(_))));
    }

    #[test]
    fn test_from_json_with_validation() {
        let json = r#"{
            "validate_monotonicity": true,
            "buckets": [
                { "cumulated_protection": 40.0 },
                { "cumulated_protection": 10.0 }
            ]
        }"#;
        let mut holder = BucketHolder::from_json(json).unwrap();

        assert!(matches!(
            holder.recalculate(),
            Err(HolderError::DataInvariant { rank: 2, .. })
        ));
    }

    #[test]
    fn test_json_snapshot() {
        let holder = sample_holder();
        let json = holder.to_json_snapshot().unwrap();
        let snapshot: HolderSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot.optimal_revenue, 11000.0);
        assert_eq!(snapshot.classes.len(), 2);
        assert_eq!(snapshot.classes[1].rank, 1);
        assert_eq!(snapshot.classes[1].protection, 50.0);
        assert_eq!(snapshot.classes[1].cumulated_booking_limit, 70.0);
    }
}
