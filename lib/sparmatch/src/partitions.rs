//! Lazy enumeration of set partitions.
//!
//! Matching a triple expression with a cardinality beyond `{1,1}` requires
//! splitting a set of candidate edges into blocks, one per repetition of the
//! expression body. The number of partitions grows combinatorially
//! (Stirling numbers of the second kind), so the enumeration here is lazy:
//! callers short-circuit on the first satisfying partition and never pay for
//! the tail.
//!
//! Partitions are enumerated through their restricted growth strings
//! (Knuth, TAOCP 7.2.1.5): a string `a` where `a[i]` is the block of item
//! `i`, `a[0] = 0` and `a[i] <= max(a[..i]) + 1`. Successive strings are
//! produced in lexicographic order, restricted to strings using exactly `k`
//! blocks, which yields one canonical, deterministic ordering.

/// Returns a lazy iterator over all partitions of `items` into exactly `k`
/// non-empty, unordered blocks.
///
/// Degenerate cases: zero items into zero blocks yields exactly one empty
/// partition; `k` larger than the number of items (or zero with items
/// present) yields nothing.
pub fn partitions_exact<T: Clone>(items: &[T], k: usize) -> ExactPartitions<T> {
    ExactPartitions {
        items: items.to_vec(),
        k,
        a: Vec::new(),
        started: false,
        done: false,
    }
}

/// Returns a lazy iterator over all partitions of `items` into any number
/// of blocks `k` with `max(min, 1) <= k <= max` (capped at the item count).
///
/// The `{1,1}` case short-circuits to the single whole-set partition in
/// O(1); the triple expression matcher relies on that for the default
/// cardinality, which is by far the most common.
pub fn partitions_range<T: Clone>(items: &[T], min: usize, max: usize) -> RangePartitions<T> {
    let n = items.len();
    let lo = min.max(1);
    let hi = max.min(n);
    if lo == 1 && max == 1 {
        return RangePartitions {
            items: Vec::new(),
            k: 0,
            hi: 0,
            current: None,
            single: if n == 0 { None } else { Some(vec![items.to_vec()]) },
            fast: true,
        };
    }
    let (current, k) = if lo <= hi {
        (Some(partitions_exact(items, lo)), lo + 1)
    } else {
        (None, lo)
    };
    RangePartitions {
        items: items.to_vec(),
        k,
        hi,
        current,
        single: None,
        fast: false,
    }
}

/// Lazy iterator over the partitions of a sequence into exactly `k`
/// non-empty blocks. Created by [`partitions_exact`].
#[derive(Debug, Clone)]
pub struct ExactPartitions<T> {
    items: Vec<T>,
    k: usize,
    /// Restricted growth string: `a[i]` is the block index of item `i`.
    a: Vec<usize>,
    started: bool,
    done: bool,
}

impl<T: Clone> ExactPartitions<T> {
    /// Materializes the blocks of the current growth string.
    fn blocks(&self) -> Vec<Vec<T>> {
        let mut blocks = vec![Vec::new(); self.k];
        for (item, &block) in self.items.iter().zip(&self.a) {
            blocks[block].push(item.clone());
        }
        blocks
    }

    /// Builds the lexicographically smallest `k`-block growth string.
    /// Returns false if none exists.
    fn first(&mut self) -> bool {
        let n = self.items.len();
        if self.k > n {
            return false;
        }
        self.a = vec![0; n];
        let mut m = 0;
        for j in 1..n {
            // The tail must still be able to reach block k-1: ramp up
            // exactly when the remaining positions are all needed for it.
            if self.k - 1 - m == n - j {
                m += 1;
                self.a[j] = m;
            }
        }
        true
    }

    /// Advances to the lexicographic successor among `k`-block growth
    /// strings. Returns false when the enumeration is exhausted.
    fn advance(&mut self) -> bool {
        let n = self.items.len();
        let k = self.k;
        if k <= 1 || n == 0 {
            return false;
        }
        // prefix_max[i] = max(a[..i])
        let mut prefix_max = vec![0; n];
        for i in 1..n {
            prefix_max[i] = prefix_max[i - 1].max(self.a[i - 1]);
        }
        for i in (1..n).rev() {
            let v = self.a[i] + 1;
            if v > prefix_max[i] + 1 || v > k - 1 {
                continue;
            }
            let new_max = prefix_max[i].max(v);
            if k - 1 - new_max > n - 1 - i {
                // Not enough tail room left to reach block k-1.
                continue;
            }
            self.a[i] = v;
            let mut m = new_max;
            for j in i + 1..n {
                if k - 1 - m == n - j {
                    m += 1;
                    self.a[j] = m;
                } else {
                    self.a[j] = 0;
                }
            }
            return true;
        }
        false
    }
}

impl<T: Clone> Iterator for ExactPartitions<T> {
    type Item = Vec<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.started {
            if !self.advance() {
                self.done = true;
                return None;
            }
            return Some(self.blocks());
        }
        self.started = true;
        if self.k == 0 {
            self.done = true;
            return if self.items.is_empty() {
                Some(Vec::new())
            } else {
                None
            };
        }
        if !self.first() {
            self.done = true;
            return None;
        }
        Some(self.blocks())
    }
}

/// Lazy iterator over the partitions of a sequence into any block count in
/// a range. Created by [`partitions_range`].
#[derive(Debug, Clone)]
pub struct RangePartitions<T: Clone> {
    items: Vec<T>,
    /// Next block count to enumerate once `current` is exhausted.
    k: usize,
    hi: usize,
    current: Option<ExactPartitions<T>>,
    single: Option<Vec<Vec<T>>>,
    fast: bool,
}

impl<T: Clone> Iterator for RangePartitions<T> {
    type Item = Vec<Vec<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fast {
            return self.single.take();
        }
        loop {
            let current = self.current.as_mut()?;
            if let Some(partition) = current.next() {
                return Some(partition);
            }
            if self.k > self.hi {
                self.current = None;
                return None;
            }
            self.current = Some(partitions_exact(&self.items, self.k));
            self.k += 1;
        }
    }
}
