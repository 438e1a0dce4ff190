//! Drag-and-drop reordering helpers
//!
//! Every reorder in the category schema is a single-element move: take the
//! element at `from`, reinsert it at `to`, shift the rest. Out-of-range
//! indices leave the collection untouched.

use super::aggregate::Category;
use crate::domain::common::NodeId;
use serde::{Deserialize, Serialize};

/// Move one element inside the collection
///
/// Returns `true` if the order actually changed.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() || from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Result of a finished drag gesture
///
/// `destination` is `None` when the element was dropped outside of any list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub source: usize,
    pub destination: Option<usize>,
}

impl DragEnd {
    pub fn new(source: usize, destination: Option<usize>) -> Self {
        Self {
            source,
            destination,
        }
    }
}

/// Which list the drag happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragScope {
    Steps,
    Questions {
        step_id: NodeId,
        parent_question_id: Option<NodeId>,
    },
    Options {
        step_id: NodeId,
        question_id: NodeId,
        parent_question_id: Option<NodeId>,
    },
}

impl Category {
    /// Применить результат перетаскивания
    pub fn apply_drag(&self, scope: &DragScope, drag: DragEnd) -> Category {
        let Some(destination) = drag.destination else {
            return self.clone();
        };

        match scope {
            DragScope::Steps => self.reorder_steps(drag.source, destination),
            DragScope::Questions {
                step_id,
                parent_question_id,
            } => self.reorder_questions(
                step_id,
                drag.source,
                destination,
                parent_question_id.as_ref(),
            ),
            DragScope::Options {
                step_id,
                question_id,
                parent_question_id,
            } => self.reorder_options(
                step_id,
                question_id,
                drag.source,
                destination,
                parent_question_id.as_ref(),
            ),
        }
    }
}
