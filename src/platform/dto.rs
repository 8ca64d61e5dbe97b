use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRecordsRequest {
    pub fields: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Vec<WhereCondition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
    pub paging_info: PagingInfo,
}

#[derive(Debug, Serialize)]
pub struct FieldSpec {
    pub field: FieldName,
}

#[derive(Debug, Serialize)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldSpec {
    pub fn named(name: &str) -> Self {
        Self {
            field: FieldName {
                name: name.to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct WhereCondition {
    pub field_name: String,
    pub operator: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sorttype: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingInfo {
    pub limit: u32,
    pub offset: u32,
}

/// Flat record as the platform returns it: an `Id` plus `_c`-suffixed
/// field values.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Record {
    pub fn id(&self) -> Option<String> {
        match self.fields.get("Id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key)?.as_str()
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key)?.as_f64()
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.fields.get(key)?.as_bool()
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRecordsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Vec<Record>,
}

/// Create and update share the same `records` envelope; updates carry
/// the platform `Id` inside each record.
#[derive(Debug, Serialize)]
pub struct MutateRecordsRequest {
    pub records: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct MutateRecordsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub results: Vec<MutationResult>,
}

#[derive(Debug, Deserialize)]
pub struct MutationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Record>,
}
