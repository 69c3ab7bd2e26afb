//! High-performance prove-or-split recursion utilizing parallelization
//! across disjoint rectangles (§4.3 "Parallelism (optional)", §5).
//!
//! Grounded on the teacher's `binary_tree/tree_builder/multi_threaded.rs`:
//! a shared thread-count counter throttles how many OS threads may be in
//! flight at once, recursing in the calling thread once the budget is
//! spent. This implementation uses `std::thread::scope` rather than the
//! teacher's `Arc`-wrapped raw `std::thread::spawn`, since scoped threads
//! let each recursive call borrow `oracle` and `rect` directly instead of
//! requiring `'static` ownership of data that only ever needs to outlive
//! the recursive call itself.

use std::sync::Mutex;

use crate::geometry::Rectangle;
use crate::node::Node;
use crate::oracle::Oracle;

use super::{
    brute_force_uniform, forced_brute_force, root_rectangle, sample_and_check_unanimous,
    BuildConfig, BuildError,
};

pub struct MultiThreadedBuilder;

struct ThreadBudget {
    count: Mutex<u8>,
    max: u8,
}

impl ThreadBudget {
    fn try_acquire(&self) -> bool {
        let mut count = self.count.lock().expect("thread budget mutex poisoned");
        if *count < self.max {
            *count += 1;
            true
        } else {
            false
        }
    }

    fn release(&self) {
        let mut count = self.count.lock().expect("thread budget mutex poisoned");
        *count = count.saturating_sub(1);
    }
}

pub(super) fn build(
    oracle: &(impl Oracle + Send + Sync + 'static),
    config: &BuildConfig,
    cancel: Option<triggered::Listener>,
) -> Result<Node, BuildError> {
    let rect = root_rectangle(config);
    let budget = ThreadBudget {
        count: Mutex::new(0),
        max: config.max_thread_count.max(1),
    };
    build_node(oracle, rect, config, 0, cancel.as_ref(), &budget)
}

fn build_node(
    oracle: &(dyn Oracle + Sync),
    rect: Rectangle,
    config: &BuildConfig,
    depth: u32,
    cancel: Option<&triggered::Listener>,
    budget: &ThreadBudget,
) -> Result<Node, BuildError> {
    if let Some(listener) = cancel {
        if listener.is_triggered() {
            return Err(BuildError::Cancelled);
        }
    }

    if rect.is_point() {
        let id = oracle.country_at(rect.y0, rect.x0)?;
        return Ok(Node::Leaf(id));
    }

    if depth >= config.max_depth {
        log::warn!(
            "depth limit {} reached at rect ({},{})-({},{}); forcing brute force",
            config.max_depth,
            rect.x0,
            rect.y0,
            rect.x1,
            rect.y1
        );
        return forced_brute_force(oracle, rect);
    }

    let unanimous = sample_and_check_unanimous(oracle, &rect, config)?;
    if let Some(id) = unanimous {
        let point_count = rect.point_count();
        if point_count <= config.brute_force_threshold && brute_force_uniform(oracle, &rect, id)? {
            return Ok(Node::Leaf(id));
        }
    }

    let children_rects = rect.children();
    let mut results: Vec<Option<Result<Node, BuildError>>> =
        children_rects.iter().map(|_| None).collect();

    std::thread::scope(|scope| {
        let mut handles = Vec::new();
        let mut acquired = Vec::new();

        for (i, (_, child_rect)) in children_rects.iter().enumerate() {
            if budget.try_acquire() {
                acquired.push(i);
                let child_rect = *child_rect;
                let handle = scope.spawn(move || {
                    build_node(oracle, child_rect, config, depth + 1, cancel, budget)
                });
                handles.push((i, handle));
            } else {
                let child_rect = *child_rect;
                results[i] = Some(build_node(oracle, child_rect, config, depth + 1, cancel, budget));
            }
        }

        for (i, handle) in handles {
            results[i] = Some(handle.join().unwrap_or_else(|_| {
                Err(BuildError::OracleFailure(crate::oracle::OracleError::QueryFailed {
                    ilat: 0,
                    ilon: 0,
                    reason: "worker thread panicked".to_string(),
                }))
            }));
        }

        for _ in acquired {
            budget.release();
        }
    });

    let children = results
        .into_iter()
        .map(|r| r.expect("every child slot is filled"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Node::Internal(children).collapse_if_uniform())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{RectangleOracle, SimpleOracle, UniformOracle};
    use crate::quantize::Precision;

    fn config(precision: u8) -> BuildConfig {
        BuildConfig {
            precision: Precision::from_u8(precision),
            ..BuildConfig::default()
        }
    }

    #[test]
    fn multi_threaded_matches_single_threaded_on_uniform_oracle() {
        let oracle = UniformOracle { id: 7 };
        let multi = build(&oracle, &config(0), None).unwrap();
        let single = super::super::single_threaded::build(&oracle, &config(0), None).unwrap();
        assert_eq!(multi, single);
    }

    #[test]
    fn multi_threaded_matches_single_threaded_on_split_oracle() {
        let oracle = SimpleOracle { y_max: 180 };
        let multi = build(&oracle, &config(0), None).unwrap();
        let single = super::super::single_threaded::build(&oracle, &config(0), None).unwrap();
        assert_eq!(multi, single);
    }

    #[test]
    fn multi_threaded_matches_single_threaded_on_rectangle_oracle() {
        let oracle = RectangleOracle {
            rect_ilon: (100, 200),
            rect_ilat: (50, 80),
            id: 5,
        };
        let multi = build(&oracle, &config(0), None).unwrap();
        let single = super::super::single_threaded::build(&oracle, &config(0), None).unwrap();
        assert_eq!(multi, single);
    }
}
