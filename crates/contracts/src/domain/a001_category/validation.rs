//! Validation of a category schema before it is persisted
//!
//! The validator never stops at the first problem: it walks the whole tree
//! and returns every violation, in document order, so the caller can show
//! them together.

use super::aggregate::{Category, Question};
use std::sync::Arc;
use thiserror::Error;

/// One unmet rule of the category schema
///
/// `Display` yields the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Category name is required")]
    CategoryNameRequired,

    #[error("At least one step is required")]
    StepsRequired,

    #[error("Step {step} requires a title")]
    StepTitleRequired { step: usize },

    #[error("Step {step} requires at least one question")]
    StepQuestionsRequired { step: usize },

    #[error("{path} requires a label")]
    QuestionLabelRequired { path: String },

    #[error("{path} requires options")]
    QuestionOptionsRequired { path: String },

    #[error("{path} (Subsection) requires at least one question")]
    SubsectionQuestionsRequired { path: String },

    #[error("Sub-category {index} requires a name")]
    SubCategoryNameRequired { index: usize },
}

/// Собрать все нарушения правил схемы категории
pub fn validate_category(category: &Category) -> Vec<Violation> {
    let mut violations = Vec::new();

    if is_blank(&category.category_name) {
        violations.push(Violation::CategoryNameRequired);
    }

    if category.steps.is_empty() {
        violations.push(Violation::StepsRequired);
    }

    for (step_index, step) in category.steps.iter().enumerate() {
        let step_number = step_index + 1;

        if is_blank(&step.title) {
            violations.push(Violation::StepTitleRequired { step: step_number });
        }
        if step.questions.is_empty() {
            violations.push(Violation::StepQuestionsRequired { step: step_number });
        }

        let prefix = format!("Step {}, ", step_number);
        validate_questions(&step.questions, &prefix, &mut violations);
    }

    for (index, sub_category) in category.sub_categories.iter().enumerate() {
        if is_blank(&sub_category.name) {
            violations.push(Violation::SubCategoryNameRequired { index: index + 1 });
        }
    }

    violations
}

fn validate_questions(questions: &[Arc<Question>], prefix: &str, violations: &mut Vec<Violation>) {
    for (index, question) in questions.iter().enumerate() {
        let path = format!("{}Question {}", prefix, index + 1);
        validate_question(question, &path, violations);
    }
}

fn validate_question(question: &Question, path: &str, violations: &mut Vec<Violation>) {
    if is_blank(&question.label) {
        violations.push(Violation::QuestionLabelRequired {
            path: path.to_string(),
        });
    }

    if question.question_type.has_options() && question.options().is_empty() {
        violations.push(Violation::QuestionOptionsRequired {
            path: path.to_string(),
        });
    }

    if question.question_type.is_subsection() && question.sub_questions().is_empty() {
        violations.push(Violation::SubsectionQuestionsRequired {
            path: path.to_string(),
        });
    }

    // Вложенные вопросы проверяются при любом типе родителя
    if let Some(sub_questions) = &question.sub_questions {
        let prefix = format!("{} > ", path);
        validate_questions(sub_questions, &prefix, violations);
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl Category {
    pub fn violations(&self) -> Vec<Violation> {
        validate_category(self)
    }

    /// `Ok(())`, если схему можно сохранять
    pub fn validate(&self) -> Result<(), Vec<Violation>> {
        let violations = validate_category(self);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
