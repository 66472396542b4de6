//! Classification methods used by [`crate::AdaptiveHorizon`] to partition
//! a macro period's unit samples into `num_block` blocks.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::ops::RangeInclusive;

/// Fixed seed for k-means initialization, per the classification
/// post-condition contract: two runs over the same `X` must produce the
/// same blocks.
const KMEANS_SEED: u64 = 1000;
const KMEANS_MAX_ITERS: usize = 100;

/// How a macro period's unit samples are partitioned into blocks.
#[derive(Debug, Clone)]
pub enum ClassifyMethod {
    /// Sort samples by value and cut at the given quantile breakpoints
    /// (strictly increasing, each in `(0, 1)`); `breakpoints.len() + 1`
    /// must equal `num_block`.
    Percentile(Vec<f64>),
    /// 1-D k-means with a fixed seed, re-run to convergence or
    /// [`KMEANS_MAX_ITERS`] iterations, whichever comes first.
    KMeans,
}

impl ClassifyMethod {
    /// Assign each sample in `x` a block label in `0..num_block`. The
    /// union of the returned labels' unit indices is guaranteed to be
    /// `0..x.len()` and every block guaranteed non-empty (the classifier's
    /// post-condition).
    pub fn classify(&self, x: &[f64], num_block: usize) -> Vec<usize> {
        match self {
            ClassifyMethod::Percentile(breakpoints) => percentile_classify(x, num_block, breakpoints),
            ClassifyMethod::KMeans => kmeans_classify(x, num_block),
        }
    }
}

fn percentile_classify(x: &[f64], num_block: usize, breakpoints: &[f64]) -> Vec<usize> {
    let n = x.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(std::cmp::Ordering::Equal));

    let mut rank_label = vec![0usize; n];
    for (rank, &idx) in order.iter().enumerate() {
        let frac = (rank as f64 + 0.5) / n as f64;
        let mut label = breakpoints.iter().filter(|&&bp| frac >= bp).count();
        if label >= num_block {
            label = num_block - 1;
        }
        rank_label[idx] = label;
    }
    ensure_every_block_nonempty(rank_label, num_block)
}

fn kmeans_classify(x: &[f64], num_block: usize) -> Vec<usize> {
    let n = x.len();
    if n == 0 || num_block == 0 {
        return vec![];
    }
    if num_block >= n {
        return (0..n).collect();
    }

    let mut rng = StdRng::seed_from_u64(KMEANS_SEED);
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut rng);
    let mut centroids: Vec<f64> = indices[..num_block].iter().map(|&i| x[i]).collect();

    let mut labels = vec![0usize; n];
    for _ in 0..KMEANS_MAX_ITERS {
        let mut changed = false;
        for (i, &v) in x.iter().enumerate() {
            let (best, _) = centroids
                .iter()
                .enumerate()
                .map(|(k, c)| (k, (v - c).abs()))
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
                .unwrap();
            if labels[i] != best {
                changed = true;
                labels[i] = best;
            }
        }
        if !changed {
            break;
        }
        for k in 0..num_block {
            let members: Vec<f64> = x
                .iter()
                .zip(labels.iter())
                .filter(|&(_, &lbl)| lbl == k)
                .map(|(&v, _)| v)
                .collect();
            if !members.is_empty() {
                centroids[k] = members.iter().sum::<f64>() / members.len() as f64;
            }
        }
    }

    ensure_every_block_nonempty(labels, num_block)
}

/// If k-means (or a pathological percentile split) collapses onto fewer
/// than `num_block` distinct labels, split the largest surviving label's
/// members evenly, handing the back half to each missing label in turn.
/// For a fully degenerate input (all samples identical) this produces an
/// even split across blocks, matching the classifier's documented
/// recovery path.
fn ensure_every_block_nonempty(mut labels: Vec<usize>, num_block: usize) -> Vec<usize> {
    loop {
        let mut counts = vec![0usize; num_block];
        for &l in &labels {
            counts[l] += 1;
        }
        let missing: Vec<usize> = (0..num_block).filter(|&k| counts[k] == 0).collect();
        if missing.is_empty() {
            return labels;
        }
        let target = missing[0];
        let (largest, _) = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, &c)| c)
            .unwrap();
        let members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == largest)
            .map(|(i, _)| i)
            .collect();
        let half = members.len() / 2;
        for &idx in &members[half..] {
            labels[idx] = target;
        }
    }
}

/// Run-length-encode a label array into per-block contiguous unit ranges.
/// `num_block` in the returned `Vec` order corresponds to block index.
pub fn labels_to_ranges(labels: &[usize], num_block: usize) -> Vec<Vec<RangeInclusive<u32>>> {
    let mut ranges: Vec<Vec<RangeInclusive<u32>>> = vec![Vec::new(); num_block];
    if labels.is_empty() {
        return ranges;
    }
    let mut run_start = 0usize;
    let mut run_label = labels[0];
    for i in 1..=labels.len() {
        if i == labels.len() || labels[i] != run_label {
            ranges[run_label].push(run_start as u32..=(i - 1) as u32);
            if i < labels.len() {
                run_start = i;
                run_label = labels[i];
            }
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_classify_splits_at_median() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let labels = percentile_classify(&x, 2, &[0.5]);
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    /// Boundary scenario S3: constant-0 input, 2 blocks, k-means recovery
    /// path — both blocks must end up non-empty with 84 units each.
    #[test]
    fn test_kmeans_degenerate_input_recovers_even_split() {
        let x = vec![0.0; 168];
        let labels = kmeans_classify(&x, 2);
        assert_eq!(labels.len(), 168);
        let count0 = labels.iter().filter(|&&l| l == 0).count();
        let count1 = labels.iter().filter(|&&l| l == 1).count();
        assert_eq!(count0, 84);
        assert_eq!(count1, 84);
    }

    #[test]
    fn test_labels_to_ranges_merges_runs() {
        let labels = vec![0, 0, 1, 1, 1, 0];
        let ranges = labels_to_ranges(&labels, 2);
        assert_eq!(ranges[0], vec![0..=1, 5..=5]);
        assert_eq!(ranges[1], vec![2..=4]);
    }

    #[test]
    fn test_every_block_nonempty_postcondition() {
        let x = vec![5.0; 10];
        let labels = kmeans_classify(&x, 3);
        for k in 0..3 {
            assert!(labels.iter().any(|&l| l == k));
        }
        let total: usize = labels.len();
        assert_eq!(total, 10);
    }
}
