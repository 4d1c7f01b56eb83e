// quarry-core/src/domain/request.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;

/// One composed, mode-tagged execution. Exactly one is built per execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExecutionRequest {
    Direct { raw_query: String },
    Visual(VisualQuery),
    Pipeline(PipelineCommand),
}

impl ExecutionRequest {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Visual(_) => "visual",
            Self::Pipeline(_) => "pipeline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    fn as_sort_key(&self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        };
        write!(f, "{}", s)
    }
}

/// Join description; its shape depends on the kind of target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinSpec {
    Relational {
        #[serde(rename = "type")]
        join_type: JoinType,
        table: String,
        #[serde(rename = "table_alias", skip_serializing_if = "Option::is_none")]
        alias: Option<String>,
        on: String,
    },
    Lookup {
        from: String,
        #[serde(rename = "localField")]
        local_field: String,
        #[serde(rename = "foreignField")]
        foreign_field: String,
        #[serde(rename = "as")]
        as_field: String,
    },
}

/// Structured aggregation built from discrete form fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualQuery {
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_alias: Option<String>,
    pub select_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    pub order_direction: OrderDirection,
    #[serde(rename = "join_config", skip_serializing_if = "Option::is_none")]
    pub join: Option<JoinSpec>,
}

impl VisualQuery {
    /// Body for the structured aggregation endpoint.
    pub fn aggregation_body(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// SQL text for the relational query endpoint.
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.select_fields.join(", "), self.table);
        if let Some(alias) = &self.table_alias {
            sql.push(' ');
            sql.push_str(alias);
        }
        if let Some(JoinSpec::Relational {
            join_type,
            table,
            alias,
            on,
        }) = &self.join
        {
            sql.push_str(&format!(" {} JOIN {}", join_type, table));
            if let Some(alias) = alias {
                sql.push(' ');
                sql.push_str(alias);
            }
            sql.push_str(&format!(" ON {}", on));
        }
        if let Some(group) = &self.group_by {
            sql.push_str(&format!(" GROUP BY {}", group));
        }
        if let Some(order) = &self.order_by {
            sql.push_str(&format!(" ORDER BY {} {}", order, self.order_direction.as_sql()));
        }
        sql
    }

    /// Aggregate invocation for the document query endpoint.
    ///
    /// `SUM(x)`, `AVG(x)`, `MIN(x)`, `MAX(x)` and `COUNT(*)` select fields become
    /// `$group` accumulators; plain fields are projected when nothing is grouped.
    pub fn to_document_command(&self) -> String {
        let mut stages: Vec<Value> = Vec::new();

        if let Some(JoinSpec::Lookup {
            from,
            local_field,
            foreign_field,
            as_field,
        }) = &self.join
        {
            stages.push(json!({ "$lookup": {
                "from": from,
                "localField": local_field,
                "foreignField": foreign_field,
                "as": as_field,
            }}));
        }

        let accumulators: Vec<(String, Value)> = self
            .select_fields
            .iter()
            .filter_map(|f| accumulator(f))
            .collect();

        if self.group_by.is_some() || !accumulators.is_empty() {
            let mut group = Map::new();
            let id = match &self.group_by {
                Some(field) => Value::String(format!("${}", field)),
                None => Value::Null,
            };
            group.insert("_id".into(), id);
            for (name, acc) in accumulators {
                group.insert(name, acc);
            }
            stages.push(json!({ "$group": group }));
        } else {
            let project: Map<String, Value> = self
                .select_fields
                .iter()
                .map(|f| (f.clone(), json!(1)))
                .collect();
            stages.push(json!({ "$project": project }));
        }

        if let Some(order) = &self.order_by {
            let mut sort = Map::new();
            sort.insert(order.clone(), json!(self.order_direction.as_sort_key()));
            stages.push(json!({ "$sort": sort }));
        }

        format!("db.{}.aggregate({})", self.table, Value::Array(stages))
    }
}

/// `SUM(total)` -> ("sum_total", {"$sum": "$total"}); `COUNT(*)` -> ("count", {"$sum": 1}).
fn accumulator(field: &str) -> Option<(String, Value)> {
    let open = field.find('(')?;
    let inner = field.trim_end().strip_suffix(')')?.get(open + 1..)?.trim();
    let func = field[..open].trim().to_lowercase();

    match func.as_str() {
        "count" if inner == "*" || inner.is_empty() => Some(("count".into(), json!({ "$sum": 1 }))),
        "count" => Some((format!("count_{}", inner), json!({ "$sum": 1 }))),
        "sum" | "avg" | "min" | "max" => {
            let mut op = Map::new();
            op.insert(format!("${}", func), Value::String(format!("${}", inner)));
            Some((format!("{}_{}", func, inner), Value::Object(op)))
        }
        _ => None,
    }
}

/// Whole pipeline applied to one collection in a single call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineCommand {
    pub target_collection: String,
    pub operations: Vec<Value>,
    #[serde(skip)]
    pub stage_names: Vec<String>,
}

impl PipelineCommand {
    /// `db.<collection>.aggregate([...])`
    pub fn command_text(&self) -> String {
        format!(
            "db.{}.aggregate({})",
            self.target_collection,
            Value::Array(self.operations.clone())
        )
    }

    pub fn label(&self) -> String {
        format!(
            "Pipeline ({} stages on {})",
            self.operations.len(),
            self.target_collection
        )
    }

    pub fn success_message(&self) -> String {
        format!(
            "Executed {} pipeline stage(s) on {}",
            self.operations.len(),
            self.target_collection
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders_query() -> VisualQuery {
        VisualQuery {
            table: "orders".into(),
            table_alias: None,
            select_fields: vec!["customer_id".into(), "SUM(total)".into()],
            group_by: Some("customer_id".into()),
            order_by: None,
            order_direction: OrderDirection::Asc,
            join: None,
        }
    }

    #[test]
    fn test_accumulator_parsing() {
        assert_eq!(
            accumulator("SUM(total)"),
            Some(("sum_total".to_string(), json!({"$sum": "$total"})))
        );
        assert_eq!(
            accumulator("count(*)"),
            Some(("count".to_string(), json!({"$sum": 1})))
        );
        assert_eq!(accumulator("customer_id"), None);
        assert_eq!(accumulator("LOWER(name)"), None);
    }

    #[test]
    fn test_sql_rendering_with_join_and_order() {
        let mut q = orders_query();
        q.table_alias = Some("o".into());
        q.order_by = Some("customer_id".into());
        q.order_direction = OrderDirection::Desc;
        q.join = Some(JoinSpec::Relational {
            join_type: JoinType::Left,
            table: "customers".into(),
            alias: Some("c".into()),
            on: "o.customer_id = c.id".into(),
        });
        assert_eq!(
            q.to_sql(),
            "SELECT customer_id, SUM(total) FROM orders o LEFT JOIN customers c \
             ON o.customer_id = c.id GROUP BY customer_id ORDER BY customer_id DESC"
        );
    }

    #[test]
    fn test_document_command_groups_accumulators() {
        let q = orders_query();
        insta::assert_snapshot!(
            q.to_document_command(),
            @r#"db.orders.aggregate([{"$group":{"_id":"$customer_id","sum_total":{"$sum":"$total"}}}])"#
        );
    }

    #[test]
    fn test_document_command_projects_plain_fields_after_lookup() {
        let q = VisualQuery {
            table: "orders".into(),
            table_alias: None,
            select_fields: vec!["item".into(), "buyer".into()],
            group_by: None,
            order_by: Some("item".into()),
            order_direction: OrderDirection::Asc,
            join: Some(JoinSpec::Lookup {
                from: "users".into(),
                local_field: "user_id".into(),
                foreign_field: "_id".into(),
                as_field: "buyer".into(),
            }),
        };
        insta::assert_snapshot!(
            q.to_document_command(),
            @r#"db.orders.aggregate([{"$lookup":{"from":"users","localField":"user_id","foreignField":"_id","as":"buyer"}},{"$project":{"item":1,"buyer":1}},{"$sort":{"item":1}}])"#
        );
    }

    #[test]
    fn test_aggregation_body_shape() {
        let body = orders_query().aggregation_body();
        assert_eq!(
            body,
            json!({
                "table": "orders",
                "select_fields": ["customer_id", "SUM(total)"],
                "group_by": "customer_id",
                "order_direction": "ASC"
            })
        );
    }

    #[test]
    fn test_pipeline_command_text() {
        let cmd = PipelineCommand {
            target_collection: "products".into(),
            operations: vec![
                json!({"$match": {"status": "active"}}),
                json!({"$group": {"_id": "$category", "count": {"$sum": 1}}}),
            ],
            stage_names: vec!["Stage 1".into(), "Stage 2".into()],
        };
        insta::assert_snapshot!(
            cmd.command_text(),
            @r#"db.products.aggregate([{"$match":{"status":"active"}},{"$group":{"_id":"$category","count":{"$sum":1}}}])"#
        );
        assert_eq!(cmd.label(), "Pipeline (2 stages on products)");
        assert_eq!(cmd.success_message(), "Executed 2 pipeline stage(s) on products");
    }

    #[test]
    fn test_request_is_tagged_by_kind() -> anyhow::Result<()> {
        let req = ExecutionRequest::Direct {
            raw_query: "SELECT 1".into(),
        };
        assert_eq!(
            serde_json::to_value(&req)?,
            json!({"kind": "direct", "raw_query": "SELECT 1"})
        );
        assert_eq!(req.kind_name(), "direct");
        Ok(())
    }
}
