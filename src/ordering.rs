//! Fractional ordering of sibling lists.
//!
//! Siblings (stages of a project, tasks of a stage, subtasks of a task) are
//! sequenced by an `f64` key. A move writes a single new key just past a
//! neighbour instead of renumbering the list. Repeated moves between the same
//! neighbours erode precision, so [`renormalized`] can rewrite a list back to
//! `0, 1, 2, ...`.

use crate::models::{ProjectBoard, Stage, StageId, Subtask, SubtaskId, Task, TaskId};

/// Offset from a neighbour's key when moving an item past it.
pub const ORDER_STEP: f64 = 0.001;

/// Adjacent keys closer than this are considered worn out.
pub const CROWDED_GAP: f64 = 1e-6;

/// An entity that takes part in a sibling ordering.
pub trait Sequenced {
    type Id: Copy + PartialEq + std::fmt::Display;

    fn id(&self) -> Self::Id;
    fn order(&self) -> f64;
}

impl Sequenced for Stage {
    type Id = StageId;

    fn id(&self) -> StageId {
        self.id
    }

    fn order(&self) -> f64 {
        self.order
    }
}

impl Sequenced for Task {
    type Id = TaskId;

    fn id(&self) -> TaskId {
        self.id
    }

    fn order(&self) -> f64 {
        self.order
    }
}

impl Sequenced for Subtask {
    type Id = SubtaskId;

    fn id(&self) -> SubtaskId {
        self.id
    }

    fn order(&self) -> f64 {
        self.order
    }
}

/// Which neighbour to move past.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Left for stages, up for tasks.
    Earlier,
    /// Right for stages, down for tasks.
    Later,
}

/// Sort siblings ascending by order. The sort is stable, so ties keep the
/// backend's order.
pub fn sort_by_order<T: Sequenced>(items: &mut [T]) {
    items.sort_by(|a, b| a.order().total_cmp(&b.order()));
}

/// Sort a whole board: stages, then each stage's tasks, then each task's subtasks.
pub fn sort_board(board: &mut ProjectBoard) {
    sort_by_order(&mut board.stages);
    for stage in &mut board.stages {
        sort_by_order(&mut stage.tasks);
        for task in &mut stage.tasks {
            sort_by_order(&mut task.subtasks);
        }
    }
}

/// Position of an item among its siblings.
pub fn index_of<T: Sequenced>(items: &[T], id: T::Id) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// The key that moves the item at `index` one place in `direction`.
///
/// Returns `None` at the boundary: the first item cannot move earlier and
/// the last item cannot move later.
pub fn shifted_order<T: Sequenced>(items: &[T], index: usize, direction: Direction) -> Option<f64> {
    match direction {
        Direction::Earlier => {
            let neighbour = index.checked_sub(1).and_then(|i| items.get(i))?;
            Some(neighbour.order() - ORDER_STEP)
        }
        Direction::Later => {
            let neighbour = items.get(index.checked_add(1)?)?;
            Some(neighbour.order() + ORDER_STEP)
        }
    }
}

/// The key that places a new arrival after every existing sibling.
///
/// An empty list yields `0`.
pub fn append_order<T: Sequenced>(items: &[T]) -> f64 {
    items
        .iter()
        .map(|item| item.order())
        .reduce(f64::max)
        .unwrap_or(-1.0)
        + 1.0
}

/// Whether any two adjacent keys have worn closer than [`CROWDED_GAP`].
pub fn is_crowded<T: Sequenced>(items: &[T]) -> bool {
    items
        .windows(2)
        .any(|pair| (pair[1].order() - pair[0].order()).abs() < CROWDED_GAP)
}

/// Whether any sibling list on the board is crowded.
pub fn board_is_crowded(board: &ProjectBoard) -> bool {
    is_crowded(&board.stages)
        || board.stages.iter().any(|stage| {
            is_crowded(&stage.tasks) || stage.tasks.iter().any(|t| is_crowded(&t.subtasks))
        })
}

/// Rewrites needed to renumber a sorted list as `0, 1, 2, ...`.
///
/// Items already holding their index are left out.
pub fn renormalized<T: Sequenced>(items: &[T]) -> Vec<(T::Id, f64)> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let target = index as f64;
            (item.order() != target).then(|| (item.id(), target))
        })
        .collect()
}
