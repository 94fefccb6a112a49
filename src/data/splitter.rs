// ============================================================
// Layer 4 — Stratified Splitter
// ============================================================
// Splits samples into two disjoint sets while preserving the
// ratio of each class in both of them.
//
// Why stratify?
//   The SMS corpus is roughly 87% ham / 13% spam. A plain
//   random split can leave a small hold-out set with almost no
//   spam, which makes recall and ROC-AUC meaningless.
//
// How the hold-out size is allocated:
//   n_holdout = ceil(fraction * n)
//   Each class gets n_class * n_holdout / n samples, rounded
//   down; the leftover slots go to the classes with the
//   largest fractional parts (largest-remainder method). Every
//   class share is therefore within one sample of exact.
//
// Determinism:
//   All shuffling comes from a StdRng seeded with `seed`, so
//   the same input and seed always give the same split.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation (SeedableRng, SliceRandom)

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Slack for float products like 0.15 * 100 landing a hair above an integer.
const CEIL_EPSILON: f64 = 1e-9;

/// Shuffle and split `samples` into `(rest, holdout)` stratified by `class_of`.
///
/// # Arguments
/// * `samples`           - All available samples (consumed by this function)
/// * `holdout_fraction`  - Proportion for the hold-out set, e.g. 0.15
/// * `seed`              - RNG seed; same seed → same partition
/// * `class_of`          - Class key used for stratification
///
/// # Returns
/// A tuple (rest, holdout)
pub fn stratified_split<T, F>(
    samples:          Vec<T>,
    holdout_fraction: f64,
    seed:             u64,
    class_of:         F,
) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> u8,
{
    let total = samples.len();
    if total == 0 {
        return (Vec::new(), Vec::new());
    }

    let n_holdout = ((holdout_fraction * total as f64) - CEIL_EPSILON)
        .ceil()
        .clamp(0.0, total as f64) as usize;

    // Group sample indices by class, in label order
    let mut by_class: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (i, s) in samples.iter().enumerate() {
        by_class.entry(class_of(s)).or_default().push(i);
    }

    let quotas = allocate_quotas(&by_class, n_holdout, total);

    let mut rng         = StdRng::seed_from_u64(seed);
    let mut rest_idx    = Vec::with_capacity(total - n_holdout);
    let mut holdout_idx = Vec::with_capacity(n_holdout);

    for (class, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let take = quotas.get(&class).copied().unwrap_or(0);
        let rest = indices.split_off(take);
        holdout_idx.extend(indices);
        rest_idx.extend(rest);
    }

    // Interleave the classes so neither set is ordered by label
    rest_idx.shuffle(&mut rng);
    holdout_idx.shuffle(&mut rng);

    // Move samples out by index; every index is taken exactly once
    let mut slots: Vec<Option<T>> = samples.into_iter().map(Some).collect();
    let rest: Vec<T>    = rest_idx.iter().filter_map(|&i| slots[i].take()).collect();
    let holdout: Vec<T> = holdout_idx.iter().filter_map(|&i| slots[i].take()).collect();

    tracing::debug!(
        "Stratified split: {} rest, {} holdout ({} classes)",
        rest.len(),
        holdout.len(),
        quotas.len(),
    );

    (rest, holdout)
}

/// Largest-remainder allocation of `n_holdout` slots across classes.
fn allocate_quotas(
    by_class:  &BTreeMap<u8, Vec<usize>>,
    n_holdout: usize,
    total:     usize,
) -> BTreeMap<u8, usize> {
    let mut quotas    = BTreeMap::new();
    let mut remainders = Vec::with_capacity(by_class.len());
    let mut assigned  = 0usize;

    for (&class, indices) in by_class {
        let exact = indices.len() as f64 * n_holdout as f64 / total as f64;
        let floor = (exact.floor() as usize).min(indices.len());
        quotas.insert(class, floor);
        assigned += floor;
        remainders.push((class, exact - floor as f64, indices.len()));
    }

    // Largest fractional part first; ties go to the bigger class, then the lower label
    remainders.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.2.cmp(&a.2))
            .then(a.0.cmp(&b.0))
    });

    let mut left = n_holdout.saturating_sub(assigned);
    while left > 0 {
        let mut placed = false;
        for &(class, _, size) in &remainders {
            if left == 0 {
                break;
            }
            if let Some(q) = quotas.get_mut(&class) {
                if *q < size {
                    *q += 1;
                    left -= 1;
                    placed = true;
                }
            }
        }
        if !placed {
            break;
        }
    }

    quotas
}
