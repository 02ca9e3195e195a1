use rand::Rng;

/// Weighted sampling without replacement: draw up to `count` items, each draw
/// proportional to weight, removing the winner from the pool. Weights must be
/// positive; callers enforce the floor from the mastery model.
pub fn sample_weighted<T, R: Rng>(rng: &mut R, mut pool: Vec<(T, f64)>, count: usize) -> Vec<T> {
    let mut picked = Vec::with_capacity(count.min(pool.len()));
    while picked.len() < count && !pool.is_empty() {
        let total: f64 = pool.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            // Degenerate weights: fall back to uniform
            let idx = rng.gen_range(0..pool.len());
            picked.push(pool.swap_remove(idx).0);
            continue;
        }
        let mut roll = rng.gen_range(0.0..total);
        let mut idx = pool.len() - 1;
        for (i, (_, w)) in pool.iter().enumerate() {
            if roll < *w {
                idx = i;
                break;
            }
            roll -= w;
        }
        picked.push(pool.swap_remove(idx).0);
    }
    picked
}
