//! Categorical accumulator kernels
//!
//! Count maps for `str`/`bool`, count maps with lexicographic extremes for
//! `date`, and per-element frequencies for `arr`. All merges are pointwise
//! sums, so they commute and reordering observations never changes the
//! result.

use fxhash::FxHashMap;

/// Value-frequency accumulator for `str` and `bool` observations
///
/// Boolean observations are normalized to `"true"`/`"false"` keys before
/// they reach this kernel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountAcc {
    pub counts: FxHashMap<String, u64>,
}

impl CountAcc {
    /// Initialize from a single value
    pub fn init(value: String) -> Self {
        let mut acc = Self::default();
        acc.update(value);
        acc
    }

    /// Increment the count for a value, inserting with 1 if absent
    pub fn update(&mut self, value: String) {
        *self.counts.entry(value).or_insert(0) += 1;
    }

    /// Pointwise sum of count maps
    pub fn merge(&mut self, other: CountAcc) {
        for (value, n) in other.counts {
            *self.counts.entry(value).or_insert(0) += n;
        }
    }
}

/// Date accumulator: a count map plus lexicographic min/max
///
/// ISO `YYYY-MM-DD` strings compare lexicographically in chronological
/// order, so the extremes are plain string comparisons.
#[derive(Debug, Clone, PartialEq)]
pub struct DateAcc {
    pub counts: FxHashMap<String, u64>,
    pub min: String,
    pub max: String,
}

impl DateAcc {
    /// Initialize from a single date
    pub fn init(date: String) -> Self {
        let mut counts = FxHashMap::default();
        counts.insert(date.clone(), 1);
        Self {
            counts,
            min: date.clone(),
            max: date,
        }
    }

    /// Count one date and widen the extremes
    pub fn update(&mut self, date: String) {
        if date < self.min {
            self.min = date.clone();
        }
        if date > self.max {
            self.max = date.clone();
        }
        *self.counts.entry(date).or_insert(0) += 1;
    }

    /// Pointwise sum of counts, widened extremes
    pub fn merge(&mut self, other: DateAcc) {
        for (date, n) in other.counts {
            *self.counts.entry(date).or_insert(0) += n;
        }
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
    }
}

/// Array accumulator: number of arrays observed plus element frequencies
///
/// Duplicate elements within one array are counted multiply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArrAcc {
    pub count: u64,
    pub counts: FxHashMap<String, u64>,
}

impl ArrAcc {
    /// Initialize from a single array observation
    pub fn init(elements: &[String]) -> Self {
        let mut acc = Self::default();
        acc.update(elements);
        acc
    }

    /// Count one array and its elements
    pub fn update(&mut self, elements: &[String]) {
        self.count += 1;
        for elem in elements {
            *self.counts.entry(elem.clone()).or_insert(0) += 1;
        }
    }

    /// Pointwise sum of array count and element frequencies
    pub fn merge(&mut self, other: ArrAcc) {
        self.count += other.count;
        for (elem, n) in other.counts {
            *self.counts.entry(elem).or_insert(0) += n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_acc_increments() {
        let mut acc = CountAcc::init("apple".to_string());
        acc.update("banana".to_string());
        acc.update("apple".to_string());

        assert_eq!(acc.counts.get("apple"), Some(&2));
        assert_eq!(acc.counts.get("banana"), Some(&1));
    }

    #[test]
    fn test_count_acc_merge_pointwise() {
        let mut a = CountAcc::init("tech".to_string());
        a.update("tech".to_string());
        let mut b = CountAcc::init("finance".to_string());
        b.update("tech".to_string());

        a.merge(b);
        assert_eq!(a.counts.get("tech"), Some(&3));
        assert_eq!(a.counts.get("finance"), Some(&1));
    }

    #[test]
    fn test_count_acc_order_independent() {
        let mut forward = CountAcc::default();
        let mut backward = CountAcc::default();
        let values = ["a", "b", "a", "c", "a", "b"];
        for v in values {
            forward.update(v.to_string());
        }
        for v in values.iter().rev() {
            backward.update(v.to_string());
        }
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_date_acc_tracks_extremes() {
        let mut acc = DateAcc::init("2024-01-15".to_string());
        acc.update("2023-06-01".to_string());
        acc.update("2024-01-15".to_string());

        assert_eq!(acc.min, "2023-06-01");
        assert_eq!(acc.max, "2024-01-15");
        assert_eq!(acc.counts.get("2024-01-15"), Some(&2));
        assert_eq!(acc.counts.get("2023-06-01"), Some(&1));
    }

    #[test]
    fn test_date_acc_merge() {
        let mut a = DateAcc::init("2024-01-15".to_string());
        a.update("2024-01-15".to_string());
        let mut b = DateAcc::init("2023-06-01".to_string());
        b.update("2024-03-01".to_string());

        a.merge(b);
        assert_eq!(a.min, "2023-06-01");
        assert_eq!(a.max, "2024-03-01");
        assert_eq!(a.counts.get("2024-01-15"), Some(&2));
    }

    #[test]
    fn test_arr_acc_counts_duplicates_within_one_array() {
        let acc = ArrAcc::init(&["x".to_string(), "x".to_string(), "y".to_string()]);
        assert_eq!(acc.count, 1);
        assert_eq!(acc.counts.get("x"), Some(&2));
        assert_eq!(acc.counts.get("y"), Some(&1));
    }

    #[test]
    fn test_arr_acc_three_arrays() {
        let mut acc = ArrAcc::init(&["1".to_string(), "2".to_string()]);
        acc.update(&["2".to_string(), "3".to_string()]);
        acc.update(&["3".to_string(), "4".to_string()]);

        assert_eq!(acc.count, 3);
        assert_eq!(acc.counts.get("1"), Some(&1));
        assert_eq!(acc.counts.get("2"), Some(&2));
        assert_eq!(acc.counts.get("3"), Some(&2));
        assert_eq!(acc.counts.get("4"), Some(&1));
    }

    #[test]
    fn test_arr_acc_merge() {
        let mut a = ArrAcc::init(&["1".to_string(), "2".to_string()]);
        let mut b = ArrAcc::init(&["2".to_string(), "3".to_string()]);
        b.update(&["3".to_string(), "4".to_string()]);

        a.merge(b);
        assert_eq!(a.count, 3);
        assert_eq!(a.counts.get("2"), Some(&2));
        assert_eq!(a.counts.get("3"), Some(&2));
    }
}
