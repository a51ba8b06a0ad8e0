//! 1-D projection profiles for gap analysis.

use std::collections::HashMap;

use crate::geometry::Rect;

/// Default histogram bin width in points.
pub const DEFAULT_BIN_WIDTH: f64 = 1.0;

/// Histogram of element extents along one axis.
///
/// Horizontal profiles project rectangles onto the x-axis using
/// `[left, right]`; vertical profiles use `[top, bottom]`. Bins are
/// fixed-width; counts record how many extents overlap each bin.
#[derive(Debug, Clone)]
pub struct ProjectionProfile {
    bin_width: f64,
    counts: HashMap<i64, u32>,
}

impl ProjectionProfile {
    /// Project rectangle x-extents with the default bin width.
    pub fn horizontal<'a, I>(rects: I) -> Self
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        let mut profile = Self::empty(DEFAULT_BIN_WIDTH);
        for r in rects {
            profile.add_extent(r.left, r.right());
        }
        profile
    }

    /// Project rectangle y-extents with the default bin width.
    pub fn vertical<'a, I>(rects: I) -> Self
    where
        I: IntoIterator<Item = &'a Rect>,
    {
        let mut profile = Self::empty(DEFAULT_BIN_WIDTH);
        for r in rects {
            profile.add_extent(r.top, r.bottom());
        }
        profile
    }

    fn empty(bin_width: f64) -> Self {
        Self {
            bin_width,
            counts: HashMap::new(),
        }
    }

    fn add_extent(&mut self, start: f64, end: f64) {
        if end <= start {
            return;
        }
        let first = (start / self.bin_width).floor() as i64;
        let last = (end / self.bin_width).ceil() as i64 - 1;
        for bin in first..=last.max(first) {
            *self.counts.entry(bin).or_insert(0) += 1;
        }
    }

    /// Contiguous zero-count intervals of width at least `min_gap`,
    /// swept from the minimum occupied bin to the maximum.
    pub fn find_gaps(&self, min_gap: f64) -> Vec<(f64, f64)> {
        let Some(&first) = self.counts.keys().min() else {
            return Vec::new();
        };
        let last = *self.counts.keys().max().unwrap_or(&first);

        let mut gaps = Vec::new();
        let mut gap_start: Option<i64> = None;
        for bin in first..=last {
            let occupied = self.counts.contains_key(&bin);
            match (occupied, gap_start) {
                (false, None) => gap_start = Some(bin),
                (true, Some(start)) => {
                    let lo = start as f64 * self.bin_width;
                    let hi = bin as f64 * self.bin_width;
                    if hi - lo >= min_gap {
                        gaps.push((lo, hi));
                    }
                    gap_start = None;
                }
                _ => {}
            }
        }
        gaps
    }

    /// Centers of the gaps found by [`find_gaps`](Self::find_gaps).
    pub fn gap_midpoints(&self, min_gap: f64) -> Vec<f64> {
        self.find_gaps(min_gap)
            .into_iter()
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }
}

/// Group 1-D positions into clusters of consecutive values no farther
/// apart than `tolerance`. Input order does not matter; clusters come
/// back sorted ascending.
pub fn cluster_positions(values: &[f64], tolerance: f64) -> Vec<Vec<f64>> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster) if value - cluster[cluster.len() - 1] <= tolerance => {
                cluster.push(value);
            }
            _ => clusters.push(vec![value]),
        }
    }
    clusters
}

/// Arithmetic mean of a cluster.
pub fn cluster_mean(cluster: &[f64]) -> f64 {
    if cluster.is_empty() {
        return 0.0;
    }
    cluster.iter().sum::<f64>() / cluster.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(left: f64, width: f64) -> Rect {
        Rect::new(0.0, left, width, 10.0)
    }

    #[test]
    fn empty_profile_has_no_gaps() {
        let profile = ProjectionProfile::horizontal(std::iter::empty());
        assert!(profile.find_gaps(1.0).is_empty());
    }

    #[test]
    fn single_extent_has_no_gaps() {
        let rects = [strip(10.0, 20.0)];
        let profile = ProjectionProfile::horizontal(rects.iter());
        assert!(profile.find_gaps(1.0).is_empty());
    }

    #[test]
    fn gap_between_two_extents() {
        let rects = [strip(10.0, 20.0), strip(80.0, 20.0)];
        let profile = ProjectionProfile::horizontal(rects.iter());
        let gaps = profile.find_gaps(10.0);
        assert_eq!(gaps, vec![(30.0, 80.0)]);
        assert_eq!(profile.gap_midpoints(10.0), vec![55.0]);
    }

    #[test]
    fn narrow_gap_is_filtered_by_min_gap() {
        let rects = [strip(0.0, 10.0), strip(15.0, 10.0)];
        let profile = ProjectionProfile::horizontal(rects.iter());
        assert_eq!(profile.find_gaps(10.0), Vec::<(f64, f64)>::new());
        assert_eq!(profile.find_gaps(5.0).len(), 1);
    }

    #[test]
    fn leading_and_trailing_space_is_not_a_gap() {
        // Sweep runs only between the min and max occupied bins
        let rects = [strip(100.0, 20.0), strip(200.0, 20.0)];
        let profile = ProjectionProfile::horizontal(rects.iter());
        let gaps = profile.find_gaps(10.0);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0], (120.0, 200.0));
    }

    #[test]
    fn vertical_projection_uses_y_extents() {
        let rects = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(50.0, 0.0, 10.0, 10.0),
        ];
        let profile = ProjectionProfile::vertical(rects.iter());
        assert_eq!(profile.find_gaps(10.0), vec![(10.0, 50.0)]);
    }

    #[test]
    fn overlapping_extents_leave_no_gap() {
        let rects = [strip(0.0, 30.0), strip(20.0, 30.0), strip(40.0, 30.0)];
        let profile = ProjectionProfile::horizontal(rects.iter());
        assert!(profile.find_gaps(1.0).is_empty());
    }

    #[test]
    fn clustering_groups_nearby_positions() {
        let clusters = cluster_positions(&[55.2, 125.0, 54.8, 55.0, 124.6], 5.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].len(), 2);
        assert!((cluster_mean(&clusters[0]) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn clustering_chains_within_tolerance() {
        // Each neighbor is within tolerance even though the ends are not
        let clusters = cluster_positions(&[0.0, 4.0, 8.0, 20.0], 5.0);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], vec![0.0, 4.0, 8.0]);
    }

    #[test]
    fn clustering_empty_input() {
        assert!(cluster_positions(&[], 5.0).is_empty());
    }
}
