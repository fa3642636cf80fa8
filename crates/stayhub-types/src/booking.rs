use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// BookingStatus
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    /// Holds its date range against new overlapping reservations
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

// ============================================================================
// StayRange - half-open [check_in, check_out) interval of nights
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    /// Builds a range, rejecting empty or inverted intervals
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, String> {
        if check_in >= check_out {
            return Err(format!(
                "Check-out ({}) must be after check-in ({})",
                check_out, check_in
            ));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Half-open overlap: [a,b) and [c,d) overlap iff a < d && c < b.
    /// Back-to-back stays (one checks out the day the next checks in) do not overlap.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

// ============================================================================
// Booking
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub listing_id: Uuid,
    /// The guest who made the reservation
    pub user_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn range(&self) -> StayRange {
        StayRange {
            check_in: self.check_in,
            check_out: self.check_out,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

/// Validated booking request, ready for the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub listing_id: Uuid,
    pub guest_id: Uuid,
    pub range: StayRange,
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn range(a: &str, b: &str) -> StayRange {
        StayRange::new(date(a), date(b)).unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let existing = range("2024-06-01", "2024-06-05");

        assert!(existing.overlaps(&range("2024-06-04", "2024-06-08")));
        assert!(!existing.overlaps(&range("2024-06-05", "2024-06-08")));
        assert!(!existing.overlaps(&range("2024-05-28", "2024-06-01")));
        assert!(existing.overlaps(&range("2024-06-02", "2024-06-03")));
        assert!(existing.overlaps(&range("2024-05-01", "2024-07-01")));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = range("2024-06-01", "2024-06-05");
        let b = range("2024-06-03", "2024-06-10");
        assert_eq!(a.overlaps(&b), b.overlaps(&a));
    }

    #[test]
    fn test_overlap_matches_shared_nights_on_random_ranges() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use std::collections::HashSet;

        let base = date("2024-01-01");
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let random_range = |rng: &mut StdRng| {
            let check_in = base + chrono::Days::new(rng.gen_range(0..60));
            let check_out = check_in + chrono::Days::new(rng.gen_range(1..10));
            StayRange::new(check_in, check_out).unwrap()
        };
        let nights = |r: &StayRange| -> HashSet<NaiveDate> {
            r.check_in.iter_days().take_while(|d| *d < r.check_out).collect()
        };

        for _ in 0..2000 {
            let a = random_range(&mut rng);
            let b = random_range(&mut rng);
            let shares_a_night = !nights(&a).is_disjoint(&nights(&b));
            assert_eq!(a.overlaps(&b), shares_a_night, "{:?} vs {:?}", a, b);
            assert_eq!(nights(&a).len() as i64, a.nights());
        }
    }

    #[test]
    fn test_range_rejects_empty_and_inverted() {
        assert!(StayRange::new(date("2024-06-05"), date("2024-06-05")).is_err());
        assert!(StayRange::new(date("2024-06-05"), date("2024-06-01")).is_err());
        assert_eq!(range("2024-06-01", "2024-06-05").nights(), 4);
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
