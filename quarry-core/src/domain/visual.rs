// quarry-core/src/domain/visual.rs

use serde::{Deserialize, Serialize};

use crate::domain::request::{JoinType, OrderDirection};

/// Join / lookup part of the visual form.
///
/// Relational targets read `join_type`, `table`, `alias` and `on`; document
/// targets read `table` as the lookup collection plus the three field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinForm {
    pub join_type: JoinType,
    pub table: String,
    pub alias: String,
    pub on: String,
    pub local_field: String,
    pub foreign_field: String,
    pub as_field: String,
}

/// Form state of the visual aggregation builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualBuilder {
    pub table: String,
    pub table_alias: String,
    select_fields: Vec<String>,
    pub group_by: String,
    pub order_by: String,
    pub order_direction: OrderDirection,
    pub join: JoinForm,
}

impl Default for VisualBuilder {
    fn default() -> Self {
        Self {
            table: String::new(),
            table_alias: String::new(),
            select_fields: vec![String::new()],
            group_by: String::new(),
            order_by: String::new(),
            order_direction: OrderDirection::Asc,
            join: JoinForm::default(),
        }
    }
}

impl VisualBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub fn select_fields(&self) -> &[String] {
        &self.select_fields
    }

    /// Replaces every select field at once (CLI flags, saved forms).
    pub fn set_select_fields(&mut self, fields: Vec<String>) {
        self.select_fields = fields;
    }

    pub fn add_select_field(&mut self) {
        self.select_fields.push(String::new());
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_select_field(&mut self, index: usize) {
        if index < self.select_fields.len() {
            self.select_fields.remove(index);
        }
    }

    /// Out-of-range indexes are ignored.
    pub fn update_select_field(&mut self, index: usize, value: impl Into<String>) {
        if let Some(field) = self.select_fields.get_mut(index) {
            *field = value.into();
        }
    }

    /// Non-blank select fields, trimmed, in form order.
    pub fn effective_select_fields(&self) -> Vec<String> {
        self.select_fields
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
