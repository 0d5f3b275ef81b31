// Ranking with the "min" tie method.

/// Which end of the scale earns rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Smallest value ranks first (ADP).
    Ascending,
    /// Largest value ranks first (projections).
    Descending,
}

/// Rank `values` from 1, giving tied values the best rank they share.
///
/// After a tie the next distinct value skips ahead, so `[100, 90, 90, 80]`
/// descending ranks as `[1, 2, 2, 4]`. Values are expected to be finite.
pub fn min_rank(values: &[f64], order: RankOrder) -> Vec<u32> {
    let mut order_idx: Vec<usize> = (0..values.len()).collect();
    order_idx.sort_by(|&a, &b| {
        let cmp = values[a].total_cmp(&values[b]);
        match order {
            RankOrder::Ascending => cmp,
            RankOrder::Descending => cmp.reverse(),
        }
    });

    let mut ranks = vec![0u32; values.len()];
    let mut current = 0u32;
    for (pos, &i) in order_idx.iter().enumerate() {
        if pos == 0 || values[i] != values[order_idx[pos - 1]] {
            current = pos as u32 + 1;
        }
        ranks[i] = current;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_ties_share_best_rank() {
        let ranks = min_rank(&[90.0, 100.0, 80.0, 90.0], RankOrder::Descending);
        assert_eq!(ranks, vec![2, 1, 4, 2]);
    }

    #[test]
    fn ascending_ranks() {
        let ranks = min_rank(&[5.0, 1.0, 2.0], RankOrder::Ascending);
        assert_eq!(ranks, vec![3, 1, 2]);
    }

    #[test]
    fn all_tied() {
        let ranks = min_rank(&[3.0, 3.0, 3.0], RankOrder::Ascending);
        assert_eq!(ranks, vec![1, 1, 1]);
    }

    #[test]
    fn empty_input() {
        assert!(min_rank(&[], RankOrder::Descending).is_empty());
    }
}
