use crate::domain::common::NodeId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Question type
// ============================================================================

/// Тип вопроса формы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Number,
    Select,
    Radio,
    Checkbox,
    Date,
    Subsection,
}

impl QuestionType {
    pub const ALL: [QuestionType; 8] = [
        QuestionType::Text,
        QuestionType::Textarea,
        QuestionType::Number,
        QuestionType::Select,
        QuestionType::Radio,
        QuestionType::Checkbox,
        QuestionType::Date,
        QuestionType::Subsection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::Textarea => "textarea",
            QuestionType::Number => "number",
            QuestionType::Select => "select",
            QuestionType::Radio => "radio",
            QuestionType::Checkbox => "checkbox",
            QuestionType::Date => "date",
            QuestionType::Subsection => "subsection",
        }
    }

    /// Вопрос с выбором из вариантов (select / radio / checkbox)
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::Select | QuestionType::Radio | QuestionType::Checkbox
        )
    }

    pub fn is_subsection(&self) -> bool {
        matches!(self, QuestionType::Subsection)
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown question type: {}", s))
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Вариант ответа для select / radio / checkbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: NodeId,

    #[serde(default)]
    pub label: String,
}

/// Вопрос формы (рекурсивный узел)
///
/// `options` и `sub_questions` могут отсутствовать: отсутствие сохраняется
/// при повторной сериализации.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: NodeId,

    #[serde(rename = "type", default)]
    pub question_type: QuestionType,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,

    #[serde(rename = "subQuestions", default, skip_serializing_if = "Option::is_none")]
    pub sub_questions: Option<Vec<Arc<Question>>>,
}

impl Question {
    /// Вопрос по умолчанию: text, пустая подпись, необязательный, пустой список вариантов
    pub fn new_default(id: NodeId) -> Self {
        Self {
            id,
            question_type: QuestionType::Text,
            label: String::new(),
            required: false,
            options: Some(Vec::new()),
            sub_questions: None,
        }
    }

    pub fn options(&self) -> &[QuestionOption] {
        self.options.as_deref().unwrap_or_default()
    }

    pub fn sub_questions(&self) -> &[Arc<Question>] {
        self.sub_questions.as_deref().unwrap_or_default()
    }
}

/// Шаг формы
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: NodeId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub questions: Vec<Arc<Question>>,
}

impl Step {
    /// Количество вопросов-подразделов верхнего уровня
    pub fn count_subsections(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type.is_subsection())
            .count()
    }

    /// Найти вопрос верхнего уровня или вложенный в `parent_question_id`
    pub fn question(
        &self,
        question_id: &NodeId,
        parent_question_id: Option<&NodeId>,
    ) -> Option<&Question> {
        find_question(self, question_id, parent_question_id)
    }
}

/// Подкатегория
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: NodeId,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Категория (агрегат a001): схема многошаговой формы
///
/// Снимок неизменяем с точки зрения движка: каждая операция возвращает новый
/// снимок, а нетронутые шаги и вопросы разделяются через `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "categoryName", default)]
    pub category_name: String,

    #[serde(rename = "isActive", default = "default_true")]
    pub is_active: bool,

    #[serde(rename = "subCategories", default)]
    pub sub_categories: Vec<SubCategory>,

    #[serde(default)]
    pub steps: Vec<Arc<Step>>,
}

impl Category {
    /// Пустая категория для создания новой записи
    pub fn new() -> Self {
        Self {
            category_name: String::new(),
            is_active: true,
            sub_categories: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn step(&self, step_id: &NodeId) -> Option<&Step> {
        find_step(&self.steps, step_id)
    }

    pub fn sub_category(&self, sub_category_id: &NodeId) -> Option<&SubCategory> {
        self.sub_categories.iter().find(|s| &s.id == sub_category_id)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::new()
    }
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Lookups
// ============================================================================

/// Найти шаг по ID
pub fn find_step<'a>(steps: &'a [Arc<Step>], step_id: &NodeId) -> Option<&'a Step> {
    steps.iter().find(|s| &s.id == step_id).map(|s| s.as_ref())
}

/// Найти вопрос в шаге
///
/// Без `parent_question_id` поиск идёт по вопросам верхнего уровня,
/// иначе по `sub_questions` родителя. Родитель ищется во всём дереве шага,
/// вопросы верхнего уровня имеют приоритет над вложенными.
pub fn find_question<'a>(
    step: &'a Step,
    question_id: &NodeId,
    parent_question_id: Option<&NodeId>,
) -> Option<&'a Question> {
    let siblings = match parent_question_id {
        None => step.questions.as_slice(),
        Some(parent_id) => find_in_tree(&step.questions, parent_id)?.sub_questions(),
    };
    siblings
        .iter()
        .find(|q| &q.id == question_id)
        .map(|q| q.as_ref())
}

/// Поиск по уровням: сначала вопросы верхнего уровня, затем их
/// `sub_questions` и так далее; первое совпадение
pub fn find_in_tree<'a>(questions: &'a [Arc<Question>], id: &NodeId) -> Option<&'a Question> {
    let path = locate_in_tree(questions, id)?;
    let (&first, rest) = path.split_first()?;
    let mut node = questions.get(first)?.as_ref();
    for &index in rest {
        node = node.sub_questions().get(index)?.as_ref();
    }
    Some(node)
}

/// Путь из индексов до вопроса с данным ID (поиск по уровням, как `find_in_tree`)
pub(crate) fn locate_in_tree(questions: &[Arc<Question>], id: &NodeId) -> Option<Vec<usize>> {
    let mut level: Vec<(Vec<usize>, &[Arc<Question>])> = vec![(Vec::new(), questions)];
    while !level.is_empty() {
        let mut next_level = Vec::new();
        for (prefix, siblings) in &level {
            for (index, question) in siblings.iter().enumerate() {
                let mut path = prefix.clone();
                path.push(index);
                if &question.id == id {
                    return Some(path);
                }
                if !question.sub_questions().is_empty() {
                    next_level.push((path, question.sub_questions()));
                }
            }
        }
        level = next_level;
    }
    None
}
