use std::collections::HashMap;

use crate::database::store::{QuestionBank, Store, TemplateStore};
use crate::dto::dashboard_dto::CategoryDetail;
use crate::error::Result;
use crate::models::assignment::Assignment;
use crate::models::category::{Category, ReviewStatus};
use crate::models::template::{ManagerTemplate, ManagerTemplateCategoryMap};

/// An assignment joined with the rows it points at.
#[derive(Debug, Clone)]
pub struct ResolvedAssignment {
    pub assignment: Assignment,
    pub category_map: ManagerTemplateCategoryMap,
    pub template: Option<ManagerTemplate>,
    pub category: Option<Category>,
}

impl ResolvedAssignment {
    pub fn template_name(&self) -> String {
        self.template
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn category_detail(&self) -> CategoryDetail {
        match &self.category {
            Some(c) => CategoryDetail {
                id: c.id,
                name: c.name.clone(),
                sub_category: c.sub_category.clone(),
                skill_level: c.skill_level.clone(),
                review_status: c.review_status.label().to_string(),
            },
            None => CategoryDetail {
                id: self.category_map.category_id,
                name: Category::fallback_name(self.category_map.category_id),
                sub_category: None,
                skill_level: None,
                review_status: ReviewStatus::default().label().to_string(),
            },
        }
    }
}

/// Resolves assignments to category map, template and category, caching each
/// row for the lifetime of one request.
pub struct AssignmentLookup<'a> {
    store: &'a dyn Store,
    maps: HashMap<i64, Option<ManagerTemplateCategoryMap>>,
    templates: HashMap<i64, Option<ManagerTemplate>>,
    categories: HashMap<i64, Option<Category>>,
}

impl<'a> AssignmentLookup<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            maps: HashMap::new(),
            templates: HashMap::new(),
            categories: HashMap::new(),
        }
    }

    pub async fn category_map(&mut self, id: i64) -> Result<Option<ManagerTemplateCategoryMap>> {
        if let Some(hit) = self.maps.get(&id) {
            return Ok(hit.clone());
        }
        let map = self.store.get_category_map(id).await?;
        self.maps.insert(id, map.clone());
        Ok(map)
    }

    pub async fn template(&mut self, id: i64) -> Result<Option<ManagerTemplate>> {
        if let Some(hit) = self.templates.get(&id) {
            return Ok(hit.clone());
        }
        let template = self.store.get_manager_template(id).await?;
        self.templates.insert(id, template.clone());
        Ok(template)
    }

    pub async fn category(&mut self, id: i64) -> Result<Option<Category>> {
        if let Some(hit) = self.categories.get(&id) {
            return Ok(hit.clone());
        }
        let category = self.store.get_category(id).await?;
        self.categories.insert(id, category.clone());
        Ok(category)
    }

    /// `None` when the assignment's category map no longer exists.
    pub async fn resolve(&mut self, assignment: &Assignment) -> Result<Option<ResolvedAssignment>> {
        let Some(category_map) = self
            .category_map(assignment.manager_template_category_id)
            .await?
        else {
            tracing::warn!(
                assignment_id = assignment.id,
                category_map_id = assignment.manager_template_category_id,
                "assignment points at a missing category map"
            );
            return Ok(None);
        };
        let template = self.template(category_map.manager_template_id).await?;
        let category = self.category(category_map.category_id).await?;
        Ok(Some(ResolvedAssignment {
            assignment: assignment.clone(),
            category_map,
            template,
            category,
        }))
    }
}
