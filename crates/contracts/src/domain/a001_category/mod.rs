//! Category aggregate: the multi-step form definition of a marketplace category
//!
//! - aggregate.rs: schema model and read-only lookups
//! - mutations.rs: copy-on-write editing operations
//! - reorder.rs: move-to-index primitive and drag-and-drop adapter
//! - validation.rs: pre-save rule checks

pub mod aggregate;
pub mod mutations;
pub mod reorder;
pub mod validation;

pub use aggregate::{
    find_question, find_step, Category, Question, QuestionOption, QuestionType, Step, SubCategory,
};
pub use mutations::{QuestionField, SubCategoryField};
pub use reorder::{move_item, DragEnd, DragScope};
pub use validation::{validate_category, Violation};
