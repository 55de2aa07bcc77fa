//! Age bucketing and the age-group distribution

use std::fmt;

use crate::data::CustomerRecord;

/// Fixed age bins. Declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AgeGroup {
    Adults,
    MiddleAgeAdults,
    OlderAdults,
    /// Missing age or any age outside the three ranges
    Other,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Adults,
        AgeGroup::MiddleAgeAdults,
        AgeGroup::OlderAdults,
        AgeGroup::Other,
    ];

    /// Groups backed by a numeric range
    pub const BINNED: [AgeGroup; 3] = [
        AgeGroup::Adults,
        AgeGroup::MiddleAgeAdults,
        AgeGroup::OlderAdults,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Adults => "Adults (18-39)",
            AgeGroup::MiddleAgeAdults => "Middle Age Adults (40-59)",
            AgeGroup::OlderAdults => "Older Adults (60-87)",
            AgeGroup::Other => "Other",
        }
    }

    /// Position in reporting order, used as the group key in data frames
    pub fn code(self) -> u32 {
        match self {
            AgeGroup::Adults => 0,
            AgeGroup::MiddleAgeAdults => 1,
            AgeGroup::OlderAdults => 2,
            AgeGroup::Other => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<AgeGroup> {
        AgeGroup::ALL.into_iter().find(|group| group.code() == code)
    }

    /// Inclusive `(lo, hi)` bounds, `None` for `Other`
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            AgeGroup::Adults => Some((18.0, 39.0)),
            AgeGroup::MiddleAgeAdults => Some((40.0, 59.0)),
            AgeGroup::OlderAdults => Some((60.0, 87.0)),
            AgeGroup::Other => None,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an age to its bin
pub fn classify(age: Option<f64>) -> AgeGroup {
    let Some(age) = age else {
        return AgeGroup::Other;
    };

    AgeGroup::BINNED
        .into_iter()
        .find(|group| {
            group
                .range()
                .is_some_and(|(lo, hi)| lo <= age && age <= hi)
        })
        .unwrap_or(AgeGroup::Other)
}

/// A loaded record paired with its derived age group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentedCustomer<'a> {
    pub age_group: AgeGroup,
    pub record: &'a CustomerRecord,
}

/// Attach an age group to every record without touching the records
pub fn segment(records: &[CustomerRecord]) -> Vec<SegmentedCustomer<'_>> {
    records
        .iter()
        .map(|record| SegmentedCustomer {
            age_group: classify(record.age),
            record,
        })
        .collect()
}

/// Share of one age group in the dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeGroupShare {
    pub age_group: AgeGroup,
    pub count: usize,
    pub percentage: f64,
}

/// Percentage of customers per age group, all four groups always present
#[derive(Debug, Clone, PartialEq)]
pub struct AgeDistribution {
    pub total: usize,
    pub shares: Vec<AgeGroupShare>,
}

impl AgeDistribution {
    pub fn from_segments(segments: &[SegmentedCustomer<'_>]) -> Self {
        let total = segments.len();
        let shares = AgeGroup::ALL
            .into_iter()
            .map(|age_group| {
                let count = segments
                    .iter()
                    .filter(|s| s.age_group == age_group)
                    .count();
                let percentage = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64 * 100.0
                };
                AgeGroupShare {
                    age_group,
                    count,
                    percentage,
                }
            })
            .collect();

        Self { total, shares }
    }

    pub fn share(&self, age_group: AgeGroup) -> Option<&AgeGroupShare> {
        self.shares.iter().find(|s| s.age_group == age_group)
    }

    pub fn percentage(&self, age_group: AgeGroup) -> f64 {
        self.share(age_group).map_or(0.0, |s| s.percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_age(age: Option<f64>) -> CustomerRecord {
        CustomerRecord {
            age,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(Some(18.0)), AgeGroup::Adults);
        assert_eq!(classify(Some(39.0)), AgeGroup::Adults);
        assert_eq!(classify(Some(40.0)), AgeGroup::MiddleAgeAdults);
        assert_eq!(classify(Some(59.0)), AgeGroup::MiddleAgeAdults);
        assert_eq!(classify(Some(60.0)), AgeGroup::OlderAdults);
        assert_eq!(classify(Some(87.0)), AgeGroup::OlderAdults);
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify(None), AgeGroup::Other);
        assert_eq!(classify(Some(17.0)), AgeGroup::Other);
        assert_eq!(classify(Some(88.0)), AgeGroup::Other);
        assert_eq!(classify(Some(-5.0)), AgeGroup::Other);
        assert_eq!(classify(Some(1_000.0)), AgeGroup::Other);
        assert_eq!(classify(Some(39.5)), AgeGroup::Other);
    }

    #[test]
    fn test_every_binned_age_maps_to_one_group() {
        for age in 18..=87 {
            let group = classify(Some(age as f64));
            assert_ne!(group, AgeGroup::Other, "age {} fell outside the bins", age);

            let matching = AgeGroup::BINNED
                .iter()
                .filter(|g| {
                    let (lo, hi) = g.range().unwrap();
                    lo <= age as f64 && age as f64 <= hi
                })
                .count();
            assert_eq!(matching, 1, "age {} matched {} ranges", age, matching);
        }
    }

    #[test]
    fn test_distribution_sums_to_hundred() {
        let records = vec![
            record_with_age(Some(25.0)),
            record_with_age(Some(45.0)),
            record_with_age(Some(70.0)),
            record_with_age(None),
            record_with_age(Some(30.0)),
            record_with_age(Some(12.0)),
        ];
        let segments = segment(&records);
        let distribution = AgeDistribution::from_segments(&segments);

        assert_eq!(distribution.total, 6);
        assert_eq!(distribution.shares.len(), 4);
        let sum: f64 = distribution.shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((distribution.percentage(AgeGroup::Adults) - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(distribution.share(AgeGroup::Other).unwrap().count, 2);
    }

    #[test]
    fn test_distribution_reports_empty_groups() {
        let records = vec![record_with_age(Some(25.0)), record_with_age(Some(26.0))];
        let distribution = AgeDistribution::from_segments(&segment(&records));

        assert_eq!(distribution.percentage(AgeGroup::Adults), 100.0);
        assert_eq!(distribution.percentage(AgeGroup::MiddleAgeAdults), 0.0);
        assert_eq!(distribution.percentage(AgeGroup::OlderAdults), 0.0);
        assert_eq!(distribution.percentage(AgeGroup::Other), 0.0);
    }

    #[test]
    fn test_distribution_of_empty_dataset() {
        let distribution = AgeDistribution::from_segments(&[]);
        assert_eq!(distribution.total, 0);
        assert!(distribution.shares.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn test_code_round_trip_keeps_order() {
        let codes: Vec<u32> = AgeGroup::ALL.iter().map(|g| g.code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3]);
        assert_eq!(AgeGroup::from_code(2), Some(AgeGroup::OlderAdults));
        assert_eq!(AgeGroup::from_code(4), None);
    }

    #[test]
    fn test_segment_preserves_records() {
        let records = vec![record_with_age(Some(50.0))];
        let segments = segment(&records);
        assert_eq!(segments[0].age_group, AgeGroup::MiddleAgeAdults);
        assert!(std::ptr::eq(segments[0].record, &records[0]));
    }
}
