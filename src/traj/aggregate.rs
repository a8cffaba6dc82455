use std::collections::BTreeMap;

use super::point::Point;

// ---------------------------------------------------------------------------
// VarAggregates: per-variable min / max / total
// ---------------------------------------------------------------------------

/// Per-variable minimum, maximum and running total.
///
/// Built once from a trajectory's points, or merged from the aggregates of
/// several trajectories. There is no way to patch an existing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarAggregates {
    min: BTreeMap<String, f64>,
    max: BTreeMap<String, f64>,
    total: BTreeMap<String, f64>,
}

impl VarAggregates {
    /// One linear pass over `points`. Min/max are seeded from the first point.
    ///
    /// Every point must carry exactly one value per entry of `vars`, which the
    /// loader guarantees.
    pub(crate) fn from_points(vars: &[String], points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };

        let mut min = first.values().to_vec();
        let mut max = first.values().to_vec();
        let mut total = vec![0.0; vars.len()];

        for point in points {
            for (idx, &val) in point.values().iter().enumerate() {
                if val < min[idx] {
                    min[idx] = val;
                }
                if val > max[idx] {
                    max[idx] = val;
                }
                total[idx] += val;
            }
        }

        let keyed = |vals: Vec<f64>| -> BTreeMap<String, f64> {
            vars.iter().cloned().zip(vals).collect()
        };

        VarAggregates {
            min: keyed(min),
            max: keyed(max),
            total: keyed(total),
        }
    }

    /// Merge member aggregates: min of mins, max of maxes, sum of totals.
    /// The first part mentioning a variable seeds it.
    pub fn merge<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a VarAggregates>,
    {
        let mut merged = VarAggregates::default();
        for part in parts {
            for (var, &val) in &part.min {
                merged
                    .min
                    .entry(var.clone())
                    .and_modify(|m| {
                        if val < *m {
                            *m = val;
                        }
                    })
                    .or_insert(val);
            }
            for (var, &val) in &part.max {
                merged
                    .max
                    .entry(var.clone())
                    .and_modify(|m| {
                        if val > *m {
                            *m = val;
                        }
                    })
                    .or_insert(val);
            }
            for (var, &val) in &part.total {
                *merged.total.entry(var.clone()).or_insert(0.0) += val;
            }
        }
        merged
    }

    pub fn min(&self, var: &str) -> Option<f64> {
        self.min.get(var).copied()
    }

    pub fn max(&self, var: &str) -> Option<f64> {
        self.max.get(var).copied()
    }

    pub fn total(&self, var: &str) -> Option<f64> {
        self.total.get(var).copied()
    }

    pub fn min_vals(&self) -> &BTreeMap<String, f64> {
        &self.min
    }

    pub fn max_vals(&self) -> &BTreeMap<String, f64> {
        &self.max
    }

    pub fn total_vals(&self) -> &BTreeMap<String, f64> {
        &self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_empty()
    }
}
