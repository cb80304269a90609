//! Exhaustive assignment search for one-dimensional cutting stock.
//!
//! Items are buffered, rounded to hundredths and sorted longest first. The
//! search then walks every way of placing each item, in order, either into an
//! already opened bar it fits in (bars tried in creation order) or into a new
//! bar. Among all complete assignments it keeps the one with the fewest bars;
//! ties go to whichever is reached first in that depth-first order.
//!
//! The first complete assignment reached is first-fit decreasing, so the
//! incumbent starts at the greedy answer. Pruning never changes which
//! assignment is selected:
//! - a branch that already uses as many bars as the incumbent is dropped,
//! - the search stops once the incumbent meets the volume lower bound,
//! - of several open bars with the same load only the first is tried, since
//!   the others root mirror-image subtrees that can at best tie.

use crate::error::{ItemIssue, PackError};
use crate::types::{
    Bin, Demand, MAX_CAPACITY, SearchBudget, SearchStats, Solution, capacity_units,
    expand_demands, from_units, round_length, to_units,
};
use std::time::Instant;
use tracing::debug;

/// Nodes between wall-clock samples when a time limit is set.
const CLOCK_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
pub struct Packer {
    capacity: f64,
    buffer: f64,
    budget: SearchBudget,
}

impl Packer {
    pub fn new(capacity: f64, buffer: f64) -> Self {
        Self {
            capacity,
            buffer,
            budget: SearchBudget::default(),
        }
    }

    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    /// Rejects inputs that cannot yield a valid assignment, naming the first
    /// offending parameter or cut.
    pub fn validate(&self, raw_items: &[f64]) -> Result<(), PackError> {
        if !self.capacity.is_finite() || self.capacity <= 0.0 || self.capacity > MAX_CAPACITY {
            return Err(PackError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if !self.buffer.is_finite() || self.buffer < 0.0 {
            return Err(PackError::InvalidBuffer {
                buffer: self.buffer,
            });
        }

        let capacity = capacity_units(self.capacity);
        for (index, &length) in raw_items.iter().enumerate() {
            let reason = if !length.is_finite() {
                ItemIssue::NotFinite
            } else if length <= 0.0 {
                ItemIssue::NonPositive
            } else if to_units(length + self.buffer) > capacity {
                ItemIssue::ExceedsCapacity {
                    buffered: round_length(length + self.buffer),
                    capacity: self.capacity,
                }
            } else {
                continue;
            };
            return Err(PackError::InvalidItem {
                index,
                length,
                reason,
            });
        }
        Ok(())
    }

    /// Buffered, rounded item lengths in the order the search consumes them.
    pub fn prepare(&self, raw_items: &[f64]) -> Vec<f64> {
        self.prepare_units(raw_items)
            .into_iter()
            .map(from_units)
            .collect()
    }

    fn prepare_units(&self, raw_items: &[f64]) -> Vec<u64> {
        let mut items: Vec<u64> = raw_items
            .iter()
            .map(|&length| to_units(length + self.buffer))
            .collect();
        items.sort_unstable_by(|a, b| b.cmp(a));
        items
    }

    pub fn pack(&self, raw_items: &[f64]) -> Result<Solution, PackError> {
        self.validate(raw_items)?;
        let items = self.prepare_units(raw_items);

        debug!(
            items = items.len(),
            capacity = self.capacity,
            buffer = self.buffer,
            "starting assignment search"
        );

        let search = Search::new(&items, capacity_units(self.capacity), self.budget);
        let (partition, stats) = search.run()?;

        debug!(
            bins = partition.len(),
            nodes = stats.nodes_explored,
            pruned = stats.branches_pruned,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "assignment search finished"
        );

        Ok(Solution {
            capacity: self.capacity,
            buffer: self.buffer,
            bins: partition.into_iter().map(|cuts| self.to_bin(cuts)).collect(),
            stats,
        })
    }

    pub fn pack_demands(&self, demands: &[Demand]) -> Result<Solution, PackError> {
        self.pack(&expand_demands(demands))
    }

    fn to_bin(&self, cuts: Vec<u64>) -> Bin {
        let load = from_units(cuts.iter().sum());
        Bin {
            cuts: cuts.into_iter().map(from_units).collect(),
            load,
            unused: round_length(self.capacity - load),
        }
    }
}

/// Packs `raw_items`, each widened by `buffer`, into the fewest bars of
/// length `capacity`. Returns the bars' contents and how many there are.
pub fn pack(
    capacity: f64,
    raw_items: &[f64],
    buffer: f64,
) -> Result<(Vec<Vec<f64>>, usize), PackError> {
    let solution = Packer::new(capacity, buffer).pack(raw_items)?;
    let count = solution.bin_count();
    Ok((solution.partition(), count))
}

/// One node of the search tree. Each node owns its copy of the partial
/// assignment so sibling branches never see each other's placements.
#[derive(Debug, Clone)]
struct SearchState {
    /// Number of items already placed.
    depth: usize,
    /// Load of each open bar, in creation order.
    loads: Vec<u64>,
    /// Bar index of each placed item.
    assignment: Vec<usize>,
}

impl SearchState {
    fn root(num_items: usize) -> Self {
        Self {
            depth: 0,
            loads: Vec::new(),
            assignment: Vec::with_capacity(num_items),
        }
    }

    fn place(&self, bin: usize, item: u64) -> Self {
        let mut loads = self.loads.clone();
        let mut assignment = self.assignment.clone();
        if bin == loads.len() {
            loads.push(item);
        } else {
            loads[bin] += item;
        }
        assignment.push(bin);
        Self {
            depth: self.depth + 1,
            loads,
            assignment,
        }
    }

    fn bin_count(&self) -> usize {
        self.loads.len()
    }
}

struct Search<'a> {
    items: &'a [u64],
    capacity: u64,
    budget: SearchBudget,
    stats: SearchStats,
    start: Instant,
}

impl<'a> Search<'a> {
    fn new(items: &'a [u64], capacity: u64, budget: SearchBudget) -> Self {
        Self {
            items,
            capacity,
            budget,
            stats: SearchStats::default(),
            start: Instant::now(),
        }
    }

    fn run(mut self) -> Result<(Vec<Vec<u64>>, SearchStats), PackError> {
        if self.items.is_empty() {
            self.stats.elapsed = self.start.elapsed();
            return Ok((Vec::new(), self.stats));
        }

        let lower_bound = self.volume_lower_bound();
        let mut best: Option<SearchState> = None;
        let mut best_count = usize::MAX;
        let mut stack = vec![SearchState::root(self.items.len())];

        while let Some(state) = stack.pop() {
            self.stats.nodes_explored += 1;
            self.check_budget()?;

            if state.depth == self.items.len() {
                if state.bin_count() < best_count {
                    best_count = state.bin_count();
                    debug!(
                        bins = best_count,
                        nodes = self.stats.nodes_explored,
                        "improved assignment"
                    );
                    best = Some(state);
                    if best_count <= lower_bound {
                        break;
                    }
                }
                continue;
            }

            if state.bin_count() >= best_count {
                self.stats.branches_pruned += 1;
                continue;
            }

            self.expand(&state, best_count, &mut stack);
        }

        self.stats.elapsed = self.start.elapsed();
        let best = best.expect("first-fit descent always completes an assignment");
        Ok((self.partition(&best), self.stats))
    }

    /// Pushes the children of `state` so they pop in search order: fitting
    /// bars by creation order, then a new bar.
    fn expand(&mut self, state: &SearchState, best_count: usize, stack: &mut Vec<SearchState>) {
        let item = self.items[state.depth];

        if state.bin_count() + 1 < best_count {
            stack.push(state.place(state.bin_count(), item));
        } else {
            self.stats.branches_pruned += 1;
        }

        let mut targets: Vec<usize> = Vec::with_capacity(state.loads.len());
        for (bin, &load) in state.loads.iter().enumerate() {
            if load.saturating_add(item) > self.capacity {
                continue;
            }
            if targets.iter().any(|&seen| state.loads[seen] == load) {
                self.stats.branches_pruned += 1;
                continue;
            }
            targets.push(bin);
        }
        for &bin in targets.iter().rev() {
            stack.push(state.place(bin, item));
        }
    }

    fn check_budget(&self) -> Result<(), PackError> {
        let nodes = self.stats.nodes_explored;
        let over_nodes = self.budget.max_nodes.is_some_and(|max| nodes > max);
        let over_time = self.budget.time_limit.is_some_and(|limit| {
            nodes % CLOCK_CHECK_INTERVAL == 1 && self.start.elapsed() >= limit
        });
        if over_nodes || over_time {
            debug!(nodes, "search budget exhausted");
            return Err(PackError::ResourceExhausted {
                nodes_explored: nodes,
                elapsed: self.start.elapsed(),
            });
        }
        Ok(())
    }

    /// No assignment can use fewer bars than total length over bar length.
    fn volume_lower_bound(&self) -> usize {
        let total: u128 = self.items.iter().map(|&item| item as u128).sum();
        let bound = total.div_ceil(self.capacity.max(1) as u128);
        usize::try_from(bound).unwrap_or(usize::MAX).max(1)
    }

    fn partition(&self, state: &SearchState) -> Vec<Vec<u64>> {
        let mut bins = vec![Vec::new(); state.bin_count()];
        for (&item, &bin) in self.items.iter().zip(&state.assignment) {
            bins[bin].push(item);
        }
        bins
    }
}
