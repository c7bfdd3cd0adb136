use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::database::store::{
    AssessmentStore, QuestionBank, Store, TemplateStore, UserDirectory,
};
use crate::dto::result_dto::{
    AnswerDetail, ResultDetail, ResultQuestion, ResultSummary, ResultTemplate,
};
use crate::error::{Error, Result};
use crate::models::category::Category;
use crate::models::evaluation::AnswerResult;
use crate::models::question::Question;
use crate::services::assignment_lookup::AssignmentLookup;

/// The stored selection, or `None` when it is blank.
pub fn selected_answer(selection: &str) -> Option<String> {
    let trimmed = selection.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A numeric selection `n` is shown as the `n`th option letter.
pub fn selected_option_letter(selection: &str) -> Option<String> {
    let selected = selected_answer(selection)?;
    match selected.parse::<u8>() {
        Ok(n) if n < 26 => Some(char::from(b'A' + n).to_string()),
        _ => Some(selected),
    }
}

#[derive(Clone)]
pub struct ResultService {
    store: Arc<dyn Store>,
}

impl ResultService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn ensure_candidate(&self, candidate_id: i64) -> Result<()> {
        self.store
            .get_user(candidate_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Candidate {} not found", candidate_id)))?;
        Ok(())
    }

    async fn questions_for(&self, rows: &[AnswerResult]) -> Result<HashMap<i64, Question>> {
        let mut ids: Vec<i64> = rows.iter().map(|r| r.question_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(self
            .store
            .questions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q))
            .collect())
    }

    pub async fn get_all_results(
        &self,
        candidate_id: i64,
        manager_template_id: Option<i64>,
    ) -> Result<Vec<ResultSummary>> {
        self.ensure_candidate(candidate_id).await?;

        let allowed: Option<HashSet<i64>> = match manager_template_id {
            Some(id) => Some(
                self.store
                    .category_maps_by_manager_template(id)
                    .await?
                    .into_iter()
                    .map(|m| m.id)
                    .collect(),
            ),
            None => None,
        };

        let summaries = self.store.evaluation_summaries_by_user(candidate_id).await?;
        let mut lookup = AssignmentLookup::new(self.store.as_ref());
        let mut results = Vec::new();
        for summary in summaries {
            if let Some(allowed) = &allowed {
                if !allowed.contains(&summary.manager_template_category_id) {
                    continue;
                }
            }
            let template = lookup.template(summary.manager_template_id).await?;
            let rows = self
                .store
                .answer_results(candidate_id, summary.manager_template_category_id)
                .await?;
            let questions = self.questions_for(&rows).await?;

            // Latest selection per question, in the order first answered.
            let mut order = Vec::new();
            let mut latest: HashMap<i64, &AnswerResult> = HashMap::new();
            for row in &rows {
                if latest.insert(row.question_id, row).is_none() {
                    order.push(row.question_id);
                }
            }

            let result_questions = order
                .iter()
                .filter_map(|id| {
                    let row = latest.get(id)?;
                    let question = questions.get(id)?;
                    Some(ResultQuestion {
                        question_id: question.id,
                        question: question.question.clone(),
                        options: question.options_or_raw(),
                        correct_answer: question.answer.clone(),
                        selected_answer: selected_answer(&row.selected_option),
                        selected_option_letter: selected_option_letter(&row.selected_option),
                    })
                })
                .collect();

            results.push(ResultSummary {
                evaluation_id: summary.id,
                score: summary.score,
                manager_template: ResultTemplate {
                    id: summary.manager_template_id,
                    name: template.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
                    skill_level: template.and_then(|t| t.skill_level),
                    questions: result_questions,
                },
            });
        }
        Ok(results)
    }

    pub async fn get_result_by_id(
        &self,
        candidate_id: i64,
        evaluation_id: i64,
    ) -> Result<ResultDetail> {
        self.ensure_candidate(candidate_id).await?;
        let summary = self
            .store
            .get_evaluation_summary(evaluation_id)
            .await?
            .filter(|s| s.user_id == candidate_id)
            .ok_or_else(|| {
                Error::not_found(format!(
                    "Result {} not found for candidate {}",
                    evaluation_id, candidate_id
                ))
            })?;

        let category_name = match self
            .store
            .get_category_map(summary.manager_template_category_id)
            .await?
        {
            Some(map) => match self.store.get_category(map.category_id).await? {
                Some(category) => category.name,
                None => Category::fallback_name(map.category_id),
            },
            None => String::new(),
        };

        let rows = self
            .store
            .answer_results(candidate_id, summary.manager_template_category_id)
            .await?;
        let questions = self.questions_for(&rows).await?;
        let answers = rows
            .iter()
            .map(|row| {
                let question = questions.get(&row.question_id);
                AnswerDetail {
                    answer_id: row.id,
                    question_id: row.question_id,
                    question: question.map(|q| q.question.clone()).unwrap_or_default(),
                    options: question.map(Question::options_or_raw).unwrap_or(JsonValue::Null),
                    correct_answer: question.map(|q| q.answer.clone()).unwrap_or_default(),
                    selected_answer: selected_answer(&row.selected_option),
                    answered_at: row.created_date,
                }
            })
            .collect();

        Ok(ResultDetail {
            evaluation_id: summary.id,
            candidate_id,
            manager_template_id: summary.manager_template_id,
            category_map_id: summary.manager_template_category_id,
            category_name,
            score: summary.score,
            answers,
        })
    }
}
