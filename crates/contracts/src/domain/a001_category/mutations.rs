use super::aggregate::{
    locate_in_tree, Category, Question, QuestionOption, QuestionType, Step, SubCategory,
};
use super::reorder::move_item;
use crate::domain::common::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Field updates
// ============================================================================

/// Изменяемое поле подкатегории вместе с новым значением
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubCategoryField {
    Name(String),
    IsActive(bool),
}

/// Изменяемое поле вопроса вместе с новым значением
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionField {
    Type(QuestionType),
    Label(String),
    Required(bool),
}

// ============================================================================
// Mutation engine
// ============================================================================
//
// Каждая операция принимает снимок по ссылке и возвращает новый снимок.
// Копируются только узлы на пути от корня до изменяемого узла, остальные
// шаги и вопросы разделяются через Arc. Неизвестный ID не является ошибкой:
// возвращается снимок, равный исходному.

impl Category {
    pub fn set_category_name(&self, name: impl Into<String>) -> Category {
        let mut next = self.clone();
        next.category_name = name.into();
        next
    }

    pub fn toggle_category_active(&self) -> Category {
        let mut next = self.clone();
        next.is_active = !next.is_active;
        next
    }

    /// Добавить подкатегорию с пустым именем (активна по умолчанию)
    pub fn add_sub_category(&self) -> Category {
        let id = NodeId::fresh_among(self.sub_categories.iter().map(|s| &s.id));
        let mut next = self.clone();
        next.sub_categories.push(SubCategory {
            id,
            name: String::new(),
            is_active: true,
        });
        next
    }

    pub fn remove_sub_category(&self, sub_category_id: &NodeId) -> Category {
        if self.sub_category(sub_category_id).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.sub_categories.retain(|s| &s.id != sub_category_id);
        next
    }

    pub fn update_sub_category(&self, sub_category_id: &NodeId, field: SubCategoryField) -> Category {
        let Some(index) = self
            .sub_categories
            .iter()
            .position(|s| &s.id == sub_category_id)
        else {
            return self.clone();
        };

        let mut next = self.clone();
        let sub_category = &mut next.sub_categories[index];
        match field {
            SubCategoryField::Name(name) => sub_category.name = name,
            SubCategoryField::IsActive(is_active) => sub_category.is_active = is_active,
        }
        next
    }

    /// Добавить шаг с пустым заголовком и одним вопросом по умолчанию
    pub fn add_step(&self) -> Category {
        let id = NodeId::fresh_among(self.steps.iter().map(|s| &s.id));
        let step = Step {
            id,
            title: String::new(),
            questions: vec![Arc::new(Question::new_default(NodeId::new_v4()))],
        };
        let mut next = self.clone();
        next.steps.push(Arc::new(step));
        next
    }

    /// Удалить шаг (подтверждение удаления остаётся на стороне UI)
    pub fn remove_step(&self, step_id: &NodeId) -> Category {
        if self.step(step_id).is_none() {
            return self.clone();
        }
        let mut next = self.clone();
        next.steps.retain(|s| &s.id != step_id);
        next
    }

    pub fn update_step_title(&self, step_id: &NodeId, title: impl Into<String>) -> Category {
        self.edit_step(step_id, move |step| {
            step.title = title.into();
            true
        })
    }

    pub fn reorder_steps(&self, from_index: usize, to_index: usize) -> Category {
        let mut next = self.clone();
        if move_item(&mut next.steps, from_index, to_index) {
            next
        } else {
            self.clone()
        }
    }

    /// Добавить вопрос по умолчанию в шаг или в `sub_questions` родителя
    pub fn add_question(&self, step_id: &NodeId, parent_question_id: Option<&NodeId>) -> Category {
        self.edit_step(step_id, |step| {
            let Some(questions) = questions_mut(step, parent_question_id, true) else {
                return false;
            };
            let id = NodeId::fresh_among(questions.iter().map(|q| &q.id));
            questions.push(Arc::new(Question::new_default(id)));
            true
        })
    }

    pub fn remove_question(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_step(step_id, |step| {
            let Some(questions) = questions_mut(step, parent_question_id, false) else {
                return false;
            };
            let before = questions.len();
            questions.retain(|q| &q.id != question_id);
            questions.len() != before
        })
    }

    /// Изменить поле вопроса
    ///
    /// Переход в select / radio / checkbox гарантирует наличие `options`,
    /// переход в subsection гарантирует наличие `sub_questions`. Обратный
    /// переход данные не удаляет.
    pub fn update_question(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        field: QuestionField,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_question(step_id, question_id, parent_question_id, move |question| {
            apply_question_field(question, field);
            true
        })
    }

    pub fn reorder_questions(
        &self,
        step_id: &NodeId,
        from_index: usize,
        to_index: usize,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_step(step_id, |step| {
            questions_mut(step, parent_question_id, false)
                .map_or(false, |questions| move_item(questions, from_index, to_index))
        })
    }

    pub fn add_option(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_question(step_id, question_id, parent_question_id, |question| {
            let options = question.options.get_or_insert_with(Vec::new);
            let id = NodeId::fresh_among(options.iter().map(|o| &o.id));
            options.push(QuestionOption {
                id,
                label: String::new(),
            });
            true
        })
    }

    pub fn remove_option(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        option_id: &NodeId,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_question(step_id, question_id, parent_question_id, |question| {
            let Some(options) = question.options.as_mut() else {
                return false;
            };
            let before = options.len();
            options.retain(|o| &o.id != option_id);
            options.len() != before
        })
    }

    pub fn update_option(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        option_id: &NodeId,
        label: impl Into<String>,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_question(step_id, question_id, parent_question_id, move |question| {
            let Some(option) = question
                .options
                .as_mut()
                .and_then(|options| options.iter_mut().find(|o| &o.id == option_id))
            else {
                return false;
            };
            option.label = label.into();
            true
        })
    }

    pub fn reorder_options(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        from_index: usize,
        to_index: usize,
        parent_question_id: Option<&NodeId>,
    ) -> Category {
        self.edit_question(step_id, question_id, parent_question_id, |question| {
            question
                .options
                .as_mut()
                .map_or(false, |options| move_item(options, from_index, to_index))
        })
    }

    /// Копирование по пути до шага; `f` возвращает `false`, если менять нечего
    fn edit_step(&self, step_id: &NodeId, f: impl FnOnce(&mut Step) -> bool) -> Category {
        let Some(index) = self.steps.iter().position(|s| &s.id == step_id) else {
            return self.clone();
        };
        let mut next = self.clone();
        if f(Arc::make_mut(&mut next.steps[index])) {
            next
        } else {
            self.clone()
        }
    }

    fn edit_question(
        &self,
        step_id: &NodeId,
        question_id: &NodeId,
        parent_question_id: Option<&NodeId>,
        f: impl FnOnce(&mut Question) -> bool,
    ) -> Category {
        self.edit_step(step_id, |step| {
            let Some(questions) = questions_mut(step, parent_question_id, false) else {
                return false;
            };
            let Some(question) = questions.iter_mut().find(|q| &q.id == question_id) else {
                return false;
            };
            f(Arc::make_mut(question))
        })
    }
}

fn apply_question_field(question: &mut Question, field: QuestionField) {
    match field {
        QuestionField::Type(question_type) => {
            question.question_type = question_type;
            if question_type.has_options() {
                question.options.get_or_insert_with(Vec::new);
            }
            if question_type.is_subsection() {
                question.sub_questions.get_or_insert_with(Vec::new);
            }
        }
        QuestionField::Label(label) => question.label = label,
        QuestionField::Required(required) => question.required = required,
    }
}

/// Список вопросов, в котором работает операция
///
/// `create` создаёт пустой `sub_questions` у родителя, если его нет.
fn questions_mut<'a>(
    step: &'a mut Step,
    parent_question_id: Option<&NodeId>,
    create: bool,
) -> Option<&'a mut Vec<Arc<Question>>> {
    let Some(parent_id) = parent_question_id else {
        return Some(&mut step.questions);
    };
    let path = locate_in_tree(&step.questions, parent_id)?;
    let parent = node_at_mut(&mut step.questions, &path)?;
    if create {
        Some(parent.sub_questions.get_or_insert_with(Vec::new))
    } else {
        parent.sub_questions.as_mut()
    }
}

/// Спуск по пути индексов с копированием только узлов на этом пути
fn node_at_mut<'a>(questions: &'a mut [Arc<Question>], path: &[usize]) -> Option<&'a mut Question> {
    let (&first, rest) = path.split_first()?;
    let node = Arc::make_mut(questions.get_mut(first)?);
    if rest.is_empty() {
        return Some(node);
    }
    node_at_mut(node.sub_questions.as_deref_mut()?, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(category: &Category) -> (NodeId, NodeId) {
        let step = &category.steps[0];
        (step.id.clone(), step.questions[0].id.clone())
    }

    /// Категория: два шага, в первом вопрос-подраздел с вложенным radio и вариантом
    fn populated() -> Category {
        let category = Category::new()
            .set_category_name("Companies")
            .add_sub_category()
            .add_step()
            .add_step();
        let (step_id, question_id) = ids(&category);
        let category = category
            .update_question(&step_id, &question_id, QuestionField::Type(QuestionType::Subsection), None)
            .add_question(&step_id, Some(&question_id));
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();
        category
            .update_question(&step_id, &nested_id, QuestionField::Type(QuestionType::Radio), Some(&question_id))
            .add_option(&step_id, &nested_id, Some(&question_id))
    }

    #[test]
    fn test_set_name_and_toggle_active() {
        let category = Category::new();
        let renamed = category.set_category_name("Products");
        assert_eq!(renamed.category_name, "Products");
        assert_eq!(category.category_name, "");

        let toggled = renamed.toggle_category_active();
        assert!(!toggled.is_active);
        assert!(toggled.toggle_category_active().is_active);
    }

    #[test]
    fn test_sub_category_lifecycle() {
        let category = Category::new().add_sub_category().add_sub_category();
        assert_eq!(category.sub_categories.len(), 2);
        assert_ne!(category.sub_categories[0].id, category.sub_categories[1].id);
        assert!(category.sub_categories[0].is_active);
        assert!(category.sub_categories[0].name.is_empty());

        let id = category.sub_categories[1].id.clone();
        let updated = category
            .update_sub_category(&id, SubCategoryField::Name("Skincare".into()))
            .update_sub_category(&id, SubCategoryField::IsActive(false));
        let sub = updated.sub_category(&id).unwrap();
        assert_eq!(sub.name, "Skincare");
        assert!(!sub.is_active);

        let removed = updated.remove_sub_category(&id);
        assert_eq!(removed.sub_categories.len(), 1);
        assert!(removed.sub_category(&id).is_none());
    }

    #[test]
    fn test_add_step_then_remove_step() {
        let category = Category::new().add_step();
        assert_eq!(category.steps.len(), 1);
        let step = &category.steps[0];
        assert!(step.title.is_empty());
        assert_eq!(step.questions.len(), 1);
        let question = &step.questions[0];
        assert_eq!(question.question_type, QuestionType::Text);
        assert!(question.label.is_empty());
        assert!(!question.required);
        assert_eq!(question.options, Some(Vec::new()));

        let removed = category.remove_step(&step.id);
        assert!(removed.steps.is_empty());
        assert_eq!(removed, Category::new());
    }

    #[test]
    fn test_update_step_title_keeps_input_untouched() {
        let category = Category::new().add_step();
        let before = category.clone();
        let step_id = category.steps[0].id.clone();
        let updated = category.update_step_title(&step_id, "Contact details");
        assert_eq!(updated.steps[0].title, "Contact details");
        assert_eq!(category, before);
        assert!(category.steps[0].title.is_empty());
    }

    #[test]
    fn test_untouched_steps_are_shared() {
        let category = Category::new().add_step().add_step().add_step();
        let step_id = category.steps[1].id.clone();
        let updated = category.update_step_title(&step_id, "Middle");

        assert!(Arc::ptr_eq(&category.steps[0], &updated.steps[0]));
        assert!(!Arc::ptr_eq(&category.steps[1], &updated.steps[1]));
        assert!(Arc::ptr_eq(&category.steps[2], &updated.steps[2]));
    }

    #[test]
    fn test_nested_edit_copies_only_the_path() {
        let category = populated();
        let (step_id, parent_id) = ids(&category);
        let category = category.add_question(&step_id, None);
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();

        let updated = category.update_question(
            &step_id,
            &nested_id,
            QuestionField::Label("Gender".into()),
            Some(&parent_id),
        );

        assert_eq!(updated.steps[0].questions[0].sub_questions()[0].label, "Gender");
        assert!(Arc::ptr_eq(&category.steps[1], &updated.steps[1]));
        assert!(Arc::ptr_eq(
            &category.steps[0].questions[1],
            &updated.steps[0].questions[1]
        ));
        assert!(!Arc::ptr_eq(
            &category.steps[0].questions[0],
            &updated.steps[0].questions[0]
        ));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let category = populated();
        let (step_id, question_id) = ids(&category);
        let unknown = NodeId::from("missing");
        let option_parent = Some(&question_id);
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();

        let results = vec![
            category.remove_sub_category(&unknown),
            category.update_sub_category(&unknown, SubCategoryField::Name("x".into())),
            category.remove_step(&unknown),
            category.update_step_title(&unknown, "x"),
            category.add_question(&unknown, None),
            category.add_question(&step_id, Some(&unknown)),
            category.remove_question(&unknown, &question_id, None),
            category.remove_question(&step_id, &unknown, None),
            category.remove_question(&step_id, &question_id, Some(&unknown)),
            category.update_question(&unknown, &question_id, QuestionField::Required(true), None),
            category.update_question(&step_id, &unknown, QuestionField::Required(true), None),
            category.reorder_questions(&unknown, 0, 0, None),
            category.reorder_questions(&step_id, 0, 0, Some(&unknown)),
            category.add_option(&unknown, &nested_id, option_parent),
            category.add_option(&step_id, &unknown, option_parent),
            category.remove_option(&step_id, &nested_id, &unknown, option_parent),
            category.update_option(&step_id, &nested_id, &unknown, "x", option_parent),
            category.update_option(&step_id, &unknown, &unknown, "x", option_parent),
            category.reorder_options(&step_id, &unknown, 0, 1, option_parent),
        ];

        for (index, result) in results.iter().enumerate() {
            assert_eq!(result, &category, "operation #{} changed the snapshot", index);
            assert!(Arc::ptr_eq(&result.steps[0], &category.steps[0]));
        }
    }

    #[test]
    fn test_out_of_range_reorders_are_noops() {
        let category = populated();
        let (step_id, question_id) = ids(&category);
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();

        assert_eq!(category.reorder_steps(0, 5), category);
        assert_eq!(category.reorder_steps(7, 0), category);
        assert_eq!(category.reorder_questions(&step_id, 0, 3, None), category);
        assert_eq!(
            category.reorder_options(&step_id, &nested_id, 0, 1, Some(&question_id)),
            category
        );
    }

    #[test]
    fn test_reorder_questions_round_trip() {
        let category = Category::new().add_step();
        let step_id = category.steps[0].id.clone();
        let category = category
            .add_question(&step_id, None)
            .add_question(&step_id, None)
            .add_question(&step_id, None);
        let order = |c: &Category| -> Vec<NodeId> {
            c.steps[0].questions.iter().map(|q| q.id.clone()).collect()
        };

        for i in 0..4 {
            for j in 0..4 {
                let moved = category
                    .reorder_questions(&step_id, i, j, None)
                    .reorder_questions(&step_id, j, i, None);
                assert_eq!(order(&moved), order(&category));
            }
        }

        let moved = category.reorder_questions(&step_id, 3, 0, None);
        assert_eq!(order(&moved)[0], order(&category)[3]);
        assert_eq!(order(&moved)[1], order(&category)[0]);
    }

    #[test]
    fn test_reorder_steps_keeps_identity() {
        let category = Category::new().add_step().add_step();
        let moved = category.reorder_steps(1, 0);
        assert_eq!(moved.steps[0].id, category.steps[1].id);
        assert!(Arc::ptr_eq(&moved.steps[0], &category.steps[1]));
    }

    #[test]
    fn test_type_transition_preserves_options() {
        let category = Category::new().add_step();
        let (step_id, question_id) = ids(&category);
        let category = category
            .update_question(&step_id, &question_id, QuestionField::Type(QuestionType::Select), None)
            .add_option(&step_id, &question_id, None)
            .add_option(&step_id, &question_id, None);
        let options = category.steps[0].questions[0].options.clone();
        assert_eq!(options.as_ref().map(Vec::len), Some(2));

        let as_text = category.update_question(
            &step_id,
            &question_id,
            QuestionField::Type(QuestionType::Text),
            None,
        );
        assert_eq!(as_text.steps[0].questions[0].options, options);

        let back = as_text.update_question(
            &step_id,
            &question_id,
            QuestionField::Type(QuestionType::Checkbox),
            None,
        );
        assert_eq!(back.steps[0].questions[0].options, options);
    }

    #[test]
    fn test_type_transition_creates_missing_collections() {
        let mut category = Category::new().add_step();
        let (step_id, question_id) = ids(&category);
        Arc::make_mut(&mut Arc::make_mut(&mut category.steps[0]).questions[0]).options = None;

        let select = category.update_question(
            &step_id,
            &question_id,
            QuestionField::Type(QuestionType::Select),
            None,
        );
        assert_eq!(select.steps[0].questions[0].options, Some(Vec::new()));

        let subsection = category.update_question(
            &step_id,
            &question_id,
            QuestionField::Type(QuestionType::Subsection),
            None,
        );
        assert_eq!(subsection.steps[0].questions[0].sub_questions, Some(Vec::new()));

        let back = subsection.add_question(&step_id, Some(&question_id)).update_question(
            &step_id,
            &question_id,
            QuestionField::Type(QuestionType::Date),
            None,
        );
        assert_eq!(back.steps[0].questions[0].sub_questions().len(), 1);
    }

    #[test]
    fn test_label_and_required_updates() {
        let category = Category::new().add_step();
        let (step_id, question_id) = ids(&category);
        let updated = category
            .update_question(&step_id, &question_id, QuestionField::Label("Email".into()), None)
            .update_question(&step_id, &question_id, QuestionField::Required(true), None);
        let question = updated.step(&step_id).unwrap().question(&question_id, None).unwrap();
        assert_eq!(question.label, "Email");
        assert!(question.required);
    }

    #[test]
    fn test_add_and_remove_nested_question() {
        let category = populated();
        let (step_id, parent_id) = ids(&category);
        let with_second = category.add_question(&step_id, Some(&parent_id));
        let subs = with_second.steps[0].questions[0].sub_questions();
        assert_eq!(subs.len(), 2);
        assert_ne!(subs[0].id, subs[1].id);

        let removed = with_second.remove_question(&step_id, &subs[1].id, Some(&parent_id));
        assert_eq!(removed, category);

        // The nested question is not visible at the top level
        let nested_id = subs[0].id.clone();
        assert_eq!(with_second.remove_question(&step_id, &nested_id, None), with_second);
    }

    #[test]
    fn test_deeply_nested_addressing() {
        let category = populated();
        let (step_id, parent_id) = ids(&category);
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();

        // The nested radio becomes a subsection with its own child
        let deeper = category
            .update_question(
                &step_id,
                &nested_id,
                QuestionField::Type(QuestionType::Subsection),
                Some(&parent_id),
            )
            .add_question(&step_id, Some(&nested_id));
        let nested = deeper.steps[0]
            .question(&nested_id, Some(&parent_id))
            .unwrap();
        assert_eq!(nested.sub_questions().len(), 1);
        // Options survive the switch to subsection
        assert_eq!(nested.options().len(), 1);

        let deepest_id = nested.sub_questions()[0].id.clone();
        let labelled = deeper.update_question(
            &step_id,
            &deepest_id,
            QuestionField::Label("Handle".into()),
            Some(&nested_id),
        );
        let deepest = labelled.steps[0]
            .question(&deepest_id, Some(&nested_id))
            .unwrap();
        assert_eq!(deepest.label, "Handle");
    }

    #[test]
    fn test_option_lifecycle() {
        let category = populated();
        let (step_id, parent_id) = ids(&category);
        let nested_id = category.steps[0].questions[0].sub_questions()[0].id.clone();
        let parent = Some(&parent_id);

        let category = category.add_option(&step_id, &nested_id, parent);
        let options = category.steps[0].question(&nested_id, parent).unwrap().options().to_vec();
        assert_eq!(options.len(), 2);
        assert_ne!(options[0].id, options[1].id);

        let labelled = category.update_option(&step_id, &nested_id, &options[1].id, "Other", parent);
        let question = labelled.steps[0].question(&nested_id, parent).unwrap();
        assert_eq!(question.options()[1].label, "Other");

        let reordered = labelled.reorder_options(&step_id, &nested_id, 1, 0, parent);
        let question = reordered.steps[0].question(&nested_id, parent).unwrap();
        assert_eq!(question.options()[0].id, options[1].id);

        let removed = reordered.remove_option(&step_id, &nested_id, &options[1].id, parent);
        let question = removed.steps[0].question(&nested_id, parent).unwrap();
        assert_eq!(question.options().len(), 1);
        assert_eq!(question.options()[0].id, options[0].id);
    }

    #[test]
    fn test_fresh_ids_are_unique_among_siblings() {
        let category = Category::new().add_step();
        let (step_id, _) = ids(&category);
        let mut category = category;
        for _ in 0..20 {
            category = category.add_question(&step_id, None);
        }
        let mut seen: Vec<&NodeId> = category.steps[0].questions.iter().map(|q| &q.id).collect();
        seen.sort_by_key(|id| id.as_string());
        seen.dedup();
        assert_eq!(seen.len(), 21);
    }

    #[test]
    fn test_one_level_parent_addresses_top_level_question() {
        let json = r#"{
            "categoryName": "Forums",
            "steps": [{
                "id": 1, "title": "S",
                "questions": [
                    { "id": 1, "type": "subsection", "label": "A", "required": false,
                      "subQuestions": [{ "id": 2, "type": "subsection", "label": "inner", "required": false }] },
                    { "id": 2, "type": "subsection", "label": "B", "required": false, "subQuestions": [] }
                ]
            }]
        }"#;
        let category = Category::from_json(json).unwrap();
        let step_id = NodeId::from(1);
        let parent = NodeId::from(2);

        let added = category.add_question(&step_id, Some(&parent));
        let step = &added.steps[0];
        assert_eq!(step.questions[1].sub_questions().len(), 1);
        assert!(step.questions[0].sub_questions()[0].sub_questions.is_none());

        // Lookup and mutation resolve the same parent
        let new_id = step.questions[1].sub_questions()[0].id.clone();
        assert!(step.question(&new_id, Some(&parent)).is_some());
        let removed = added.remove_question(&step_id, &new_id, Some(&parent));
        assert_eq!(removed, category);
    }
}

