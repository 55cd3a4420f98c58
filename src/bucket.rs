// Fare-class bucket: one priced category of seats in a cabin
use serde::{Deserialize, Serialize};

// Capability interface the holder needs from a bucket/class.
// The statistical inputs are read-only, the holder only writes protection
// and cumulated booking limit.
pub trait FareClass {
    fn average_yield(&self) -> f64;
    fn upper_yield(&self) -> f64;
    fn mean(&self) -> f64;
    fn standard_deviation(&self) -> f64;

    // Seats protected for this class and all higher-yield classes
    fn cumulated_protection(&self) -> f64;

    fn protection(&self) -> f64;
    fn set_protection(&mut self, protection: f64);

    fn cumulated_booking_limit(&self) -> f64;
    fn set_cumulated_booking_limit(&mut self, cumulated_booking_limit: f64);
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Bucket {
    pub upper_yield: f64,
    pub average_yield: f64,
    pub mean: f64,
    pub standard_deviation: f64,
    pub cumulated_protection: f64,
    pub protection: f64,
    pub cumulated_booking_limit: f64,
}

impl Bucket {
    pub fn new(upper_yield: f64, average_yield: f64, mean: f64, standard_deviation: f64) -> Self {
        Self {
            upper_yield,
            average_yield,
            mean,
            standard_deviation,
            ..Default::default()
        }
    }

    // Set by the external optimiser (e.g. EMSR) before the holder recalculates
    pub fn with_cumulated_protection(mut self, cumulated_protection: f64) -> Self {
        self.cumulated_protection = cumulated_protection;
        self
    }
}

impl FareClass for Bucket {
    fn average_yield(&self) -> f64 {
        self.average_yield
    }

    fn upper_yield(&self) -> f64 {
        self.upper_yield
    }

    fn mean(&self) -> f64 {
        self.mean
    }

    fn standard_deviation(&self) -> f64 {
        self.standard_deviation
    }

    fn cumulated_protection(&self) -> f64 {
        self.cumulated_protection
    }

    fn protection(&self) -> f64 {
        self.protection
    }

    fn set_protection(&mut self, protection: f64) {
        self.protection = protection;
    }

    fn cumulated_booking_limit(&self) -> f64 {
        self.cumulated_booking_limit
    }

    fn set_cumulated_booking_limit(&mut self, cumulated_booking_limit: f64) {
        self.cumulated_booking_limit = cumulated_booking_limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bucket_has_no_derived_values() {
        let bucket = Bucket::new(250.0, 200.0, 25.0, 5.0).with_cumulated_protection(30.0);

        assert_eq!(bucket.upper_yield(), 250.0);
        assert_eq!(bucket.average_yield(), 200.0);
        assert_eq!(bucket.cumulated_protection(), 30.0);
        assert_eq!(bucket.protection(), 0.0);
        assert_eq!(bucket.cumulated_booking_limit(), 0.0);
    }

    #[test]
    fn test_deserialize_partial_bucket() {
        let json = r#"{ "average_yield": 120.5, "mean": 12.0, "cumulated_protection": 8.0 }"#;
        let bucket: Bucket = serde_json::from_str(json).unwrap();

        assert_eq!(bucket.average_yield, 120.5);
        assert_eq!(bucket.mean, 12.0);
        assert_eq!(bucket.cumulated_protection, 8.0);
        assert_eq!(bucket.upper_yield, 0.0);
        assert_eq!(bucket.standard_deviation, 0.0);
    }
}
