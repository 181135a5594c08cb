//! Search frontier shared by map generation, pathfinding and visibility.
//!
//! Two pieces work together:
//! - [`CellPriorityQueue`]: a bucket queue over small integer priorities. Each
//!   bucket is an intrusive singly linked list threaded through the nodes
//!   themselves by index, so enqueue is O(1) and a full search dequeues in
//!   amortized O(1).
//! - [`SearchContext`]: owns the queue and a phase counter. Every search
//!   advances the counter by two, which logically forgets all earlier
//!   searches without touching the cells:
//!   - cell phase below the current phase: unvisited
//!   - cell phase equal to the current phase: in the frontier
//!   - cell phase one above the current phase: closed
//!
//! The context is not reentrant. A search must finish (or the next one must
//! start, which clears the queue) before another begins.

use crate::grid::HexGrid;

/// Node stored in a [`CellPriorityQueue`].
pub trait BucketNode {
    /// Priority of the node; lower values are dequeued first.
    fn search_priority(&self) -> usize;
    fn next_with_same_priority(&self) -> Option<usize>;
    fn set_next_with_same_priority(&mut self, next: Option<usize>);
}

/// Bucket priority queue over node indices.
///
/// Nodes live in a caller-owned slice; the queue only stores the head index
/// of each bucket. Buckets are allocated lazily up to the largest priority
/// seen. Ties within a bucket are dequeued most-recently-enqueued first.
#[derive(Debug, Clone)]
pub struct CellPriorityQueue {
    buckets: Vec<Option<usize>>,
    count: usize,
    minimum: usize,
}

impl Default for CellPriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CellPriorityQueue {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            count: 0,
            minimum: usize::MAX,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn enqueue<N: BucketNode>(&mut self, nodes: &mut [N], index: usize) {
        self.count += 1;
        let priority = nodes[index].search_priority();
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize(priority + 1, None);
        }
        nodes[index].set_next_with_same_priority(self.buckets[priority]);
        self.buckets[priority] = Some(index);
    }

    /// Remove and return a node of minimum priority.
    pub fn dequeue<N: BucketNode>(&mut self, nodes: &[N]) -> Option<usize> {
        if self.count == 0 {
            return None;
        }
        while self.minimum < self.buckets.len() {
            if let Some(index) = self.buckets[self.minimum] {
                self.buckets[self.minimum] = nodes[index].next_with_same_priority();
                self.count -= 1;
                return Some(index);
            }
            self.minimum += 1;
        }
        None
    }

    /// Move a node that was enqueued with `old_priority` to the bucket of its
    /// current priority.
    pub fn change<N: BucketNode>(&mut self, nodes: &mut [N], index: usize, old_priority: usize) {
        let mut unlinked = false;
        let head = self.buckets.get(old_priority).copied().flatten();
        if head == Some(index) {
            self.buckets[old_priority] = nodes[index].next_with_same_priority();
            unlinked = true;
        } else {
            let mut current = head;
            while let Some(node) = current {
                let next = nodes[node].next_with_same_priority();
                if next == Some(index) {
                    let after = nodes[index].next_with_same_priority();
                    nodes[node].set_next_with_same_priority(after);
                    unlinked = true;
                    break;
                }
                current = next;
            }
        }
        debug_assert!(unlinked, "node {index} not found at priority {old_priority}");

        self.enqueue(nodes, index);
        if unlinked {
            self.count -= 1;
        }
    }

    /// Forget every enqueued node. Node link fields are left stale; they are
    /// overwritten on the next enqueue.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
        self.minimum = usize::MAX;
    }
}

/// Where a cell stands relative to the search currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Unvisited,
    Frontier,
    Closed,
}

/// Frontier queue plus phase counter, reused across every search on a grid.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    frontier: CellPriorityQueue,
    phase: u32,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Start a new independent search: advance the phase and empty the queue.
    pub fn begin(&mut self, grid: &mut HexGrid) -> u32 {
        if self.phase >= u32::MAX - 3 {
            self.reset(grid);
        }
        self.phase += 2;
        self.frontier.clear();
        self.phase
    }

    /// Zero the phase counter and every cell phase.
    pub fn reset(&mut self, grid: &mut HexGrid) {
        self.phase = 0;
        self.frontier.clear();
        for cell in grid.cells_mut() {
            cell.search.phase = 0;
        }
    }

    pub fn state_of(&self, cell_phase: u32) -> SearchState {
        if cell_phase > self.phase {
            SearchState::Closed
        } else if cell_phase == self.phase && self.phase != 0 {
            SearchState::Frontier
        } else {
            SearchState::Unvisited
        }
    }

    #[inline]
    pub fn frontier(&self) -> &CellPriorityQueue {
        &self.frontier
    }

    #[inline]
    pub fn frontier_mut(&mut self) -> &mut CellPriorityQueue {
        &mut self.frontier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[derive(Debug, Clone, Default)]
    struct Node {
        priority: usize,
        next: Option<usize>,
    }

    impl BucketNode for Node {
        fn search_priority(&self) -> usize {
            self.priority
        }

        fn next_with_same_priority(&self) -> Option<usize> {
            self.next
        }

        fn set_next_with_same_priority(&mut self, next: Option<usize>) {
            self.next = next;
        }
    }

    fn nodes(priorities: &[usize]) -> Vec<Node> {
        priorities
            .iter()
            .map(|&priority| Node {
                priority,
                next: None,
            })
            .collect()
    }

    #[test]
    fn dequeues_in_priority_order_with_lifo_ties() {
        let mut nodes = nodes(&[5, 2, 5, 0, 2]);
        let mut queue = CellPriorityQueue::new();
        for i in 0..nodes.len() {
            queue.enqueue(&mut nodes, i);
        }
        assert_eq!(queue.len(), 5);

        let order: Vec<usize> = std::iter::from_fn(|| queue.dequeue(&nodes)).collect();
        assert_eq!(order, vec![3, 4, 1, 2, 0]);
        assert!(queue.is_empty());
        assert_eq!(queue.dequeue(&nodes), None);
    }

    #[test]
    fn change_relocates_node() {
        let mut nodes = nodes(&[4, 4, 4, 6]);
        let mut queue = CellPriorityQueue::new();
        for i in 0..nodes.len() {
            queue.enqueue(&mut nodes, i);
        }

        // Middle of the bucket list.
        nodes[1].priority = 1;
        queue.change(&mut nodes, 1, 4);
        // Head of the bucket list.
        nodes[2].priority = 3;
        queue.change(&mut nodes, 2, 4);
        assert_eq!(queue.len(), 4);

        let order: Vec<usize> = std::iter::from_fn(|| queue.dequeue(&nodes)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn clear_behaves_like_fresh_queue() {
        let mut nodes = nodes(&[9, 3, 7]);
        let mut queue = CellPriorityQueue::new();
        queue.enqueue(&mut nodes, 0);
        queue.enqueue(&mut nodes, 1);
        assert_eq!(queue.dequeue(&nodes), Some(1));
        queue.clear();
        assert!(queue.is_empty());

        queue.enqueue(&mut nodes, 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.dequeue(&nodes), Some(2));
        assert_eq!(queue.dequeue(&nodes), None);
    }

    #[test]
    fn lower_priority_after_dequeue_is_still_found() {
        let mut nodes = nodes(&[8, 2]);
        let mut queue = CellPriorityQueue::new();
        queue.enqueue(&mut nodes, 0);
        assert_eq!(queue.dequeue(&nodes), Some(0));
        queue.enqueue(&mut nodes, 1);
        assert_eq!(queue.dequeue(&nodes), Some(1));
    }

    #[test]
    fn random_operations_always_yield_minimum() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        let mut nodes = nodes(&[0; 64]);
        let mut queue = CellPriorityQueue::new();
        let mut enqueued = vec![false; nodes.len()];

        for _ in 0..5_000 {
            match rng.gen_range(0..10) {
                0..=4 => {
                    let index = rng.gen_range(0..nodes.len());
                    if !enqueued[index] {
                        nodes[index].priority = rng.gen_range(0..40);
                        queue.enqueue(&mut nodes, index);
                        enqueued[index] = true;
                    }
                }
                5..=6 => {
                    let candidates: Vec<usize> =
                        (0..nodes.len()).filter(|&i| enqueued[i]).collect();
                    if let Some(&index) = candidates.get(rng.gen_range(0..candidates.len().max(1)))
                    {
                        let old = nodes[index].priority;
                        if old > 0 {
                            nodes[index].priority = rng.gen_range(0..old);
                            queue.change(&mut nodes, index, old);
                        }
                    }
                }
                7 if rng.gen_bool(0.05) => {
                    queue.clear();
                    enqueued.iter_mut().for_each(|flag| *flag = false);
                }
                _ => {
                    let expected = (0..nodes.len())
                        .filter(|&i| enqueued[i])
                        .map(|i| nodes[i].priority)
                        .min();
                    let got = queue.dequeue(&nodes);
                    assert_eq!(got.map(|i| nodes[i].priority), expected);
                    if let Some(index) = got {
                        assert!(enqueued[index]);
                        enqueued[index] = false;
                    }
                }
            }
            assert_eq!(queue.len(), enqueued.iter().filter(|&&flag| flag).count());
        }
    }

    #[test]
    fn phase_classification() {
        let mut grid = HexGrid::new(2, 2).expect("grid");
        let mut ctx = SearchContext::new();
        assert_eq!(ctx.state_of(0), SearchState::Unvisited);

        let phase = ctx.begin(&mut grid);
        assert_eq!(phase, 2);
        assert_eq!(ctx.state_of(0), SearchState::Unvisited);
        assert_eq!(ctx.state_of(phase), SearchState::Frontier);
        assert_eq!(ctx.state_of(phase + 1), SearchState::Closed);

        let next = ctx.begin(&mut grid);
        assert_eq!(next, 4);
        assert_eq!(ctx.state_of(phase + 1), SearchState::Unvisited);

        ctx.reset(&mut grid);
        assert_eq!(ctx.phase(), 0);
        assert!(grid.cells().iter().all(|cell| cell.search_phase() == 0));
    }
}
