//! Typed ERP operations on top of [`RpcConnection::execute`]
//!
//! Each wrapper builds the exact positional/keyword shape Odoo's ORM expects
//! and checks the result against the shape the operation declares.

use serde_json::{Map, Value, json};

use crate::connection::RpcConnection;
use crate::error::{RpcError, RpcResult};

/// One record as returned by `search_read`/`read`
pub type Record = Map<String, Value>;

/// Default page size for search operations
pub const DEFAULT_LIMIT: u64 = 100;

/// Meta-model listing every installed model
pub const MODEL_REGISTRY: &str = "ir.model";

/// Fields fetched for each entry of [`MODEL_REGISTRY`]
pub const MODEL_REGISTRY_FIELDS: [&str; 3] = ["model", "name", "info"];

/// Arguments of a grouped aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct ReadGroupRequest {
    pub domain: Vec<Value>,
    /// Aggregate specs such as `"expected_revenue:sum"`
    pub fields: Vec<String>,
    pub groupby: Vec<String>,
    pub limit: Option<u64>,
    pub orderby: Option<String>,
    pub lazy: Option<bool>,
}

impl Default for ReadGroupRequest {
    fn default() -> Self {
        Self {
            domain: Vec::new(),
            fields: Vec::new(),
            groupby: Vec::new(),
            limit: Some(DEFAULT_LIMIT),
            orderby: None,
            lazy: Some(true),
        }
    }
}

impl ReadGroupRequest {
    /// `{limit, orderby, lazy}` with unset options left out
    fn kwargs(&self) -> Map<String, Value> {
        let mut kwargs = Map::new();
        if let Some(limit) = self.limit {
            kwargs.insert("limit".into(), json!(limit));
        }
        if let Some(orderby) = &self.orderby {
            kwargs.insert("orderby".into(), json!(orderby));
        }
        if let Some(lazy) = self.lazy {
            kwargs.insert("lazy".into(), json!(lazy));
        }
        kwargs
    }
}

fn limit_kwargs(mut kwargs: Map<String, Value>, limit: Option<u64>) -> Map<String, Value> {
    if let Some(limit) = limit {
        kwargs.insert("limit".into(), json!(limit));
    }
    kwargs
}

fn field_list(fields: &[String]) -> Value {
    json!(fields)
}

fn into_records(method: &str, value: Value) -> RpcResult<Vec<Record>> {
    let Value::Array(items) = value else {
        return Err(RpcError::unexpected(method, "a list of records"));
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(record) => Ok(record),
            _ => Err(RpcError::unexpected(method, "a list of records")),
        })
        .collect()
}

fn into_ids(method: &str, value: Value) -> RpcResult<Vec<i64>> {
    let Value::Array(items) = value else {
        return Err(RpcError::unexpected(method, "a list of integer ids"));
    };
    items
        .iter()
        .map(|item| {
            item.as_i64()
                .ok_or_else(|| RpcError::unexpected(method, "a list of integer ids"))
        })
        .collect()
}

fn into_bool(method: &str, value: Value) -> RpcResult<bool> {
    value
        .as_bool()
        .ok_or_else(|| RpcError::unexpected(method, "a boolean"))
}

fn into_int(method: &str, value: Value) -> RpcResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| RpcError::unexpected(method, "an integer"))
}

impl RpcConnection {
    /// Records matching `domain`, restricted to `fields` (empty = all).
    /// `limit: None` fetches every match.
    pub async fn search_read(
        &self,
        model: &str,
        domain: Vec<Value>,
        fields: &[String],
        limit: Option<u64>,
    ) -> RpcResult<Vec<Record>> {
        let mut kwargs = Map::new();
        kwargs.insert("fields".into(), field_list(fields));
        let result = self
            .execute(
                model,
                "search_read",
                vec![Value::Array(domain)],
                Some(limit_kwargs(kwargs, limit)),
            )
            .await?;
        into_records("search_read", result)
    }

    /// Ids of records matching `domain`
    pub async fn search(
        &self,
        model: &str,
        domain: Vec<Value>,
        limit: Option<u64>,
    ) -> RpcResult<Vec<i64>> {
        let result = self
            .execute(
                model,
                "search",
                vec![Value::Array(domain)],
                Some(limit_kwargs(Map::new(), limit)),
            )
            .await?;
        into_ids("search", result)
    }

    pub async fn read(&self, model: &str, ids: &[i64], fields: &[String]) -> RpcResult<Vec<Record>> {
        let mut kwargs = Map::new();
        kwargs.insert("fields".into(), field_list(fields));
        let result = self
            .execute(model, "read", vec![json!(ids)], Some(kwargs))
            .await?;
        into_records("read", result)
    }

    /// Create one record and return its id
    pub async fn create(&self, model: &str, values: Map<String, Value>) -> RpcResult<i64> {
        let result = self
            .execute(model, "create", vec![Value::Object(values)], None)
            .await?;
        into_int("create", result)
    }

    pub async fn write(
        &self,
        model: &str,
        ids: &[i64],
        values: Map<String, Value>,
    ) -> RpcResult<bool> {
        let result = self
            .execute(model, "write", vec![json!(ids), Value::Object(values)], None)
            .await?;
        into_bool("write", result)
    }

    pub async fn unlink(&self, model: &str, ids: &[i64]) -> RpcResult<bool> {
        let result = self.execute(model, "unlink", vec![json!(ids)], None).await?;
        into_bool("unlink", result)
    }

    /// Arbitrary model method; the result is passed through untouched
    pub async fn call_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> RpcResult<Value> {
        self.execute(model, method, args, Some(kwargs)).await
    }

    /// Installed models, optionally narrowed to those whose technical name
    /// contains `filter` (case-insensitive)
    pub async fn get_models(&self, filter: Option<&str>) -> RpcResult<Vec<Record>> {
        let mut kwargs = Map::new();
        kwargs.insert("fields".into(), json!(MODEL_REGISTRY_FIELDS));
        let result = self
            .execute(MODEL_REGISTRY, "search_read", vec![json!([])], Some(kwargs))
            .await?;
        let models = into_records("search_read", result)?;

        let Some(pattern) = filter.filter(|p| !p.is_empty()) else {
            return Ok(models);
        };
        let pattern = pattern.to_lowercase();
        Ok(models
            .into_iter()
            .filter(|m| {
                m.get("model")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.to_lowercase().contains(&pattern))
            })
            .collect())
    }

    /// Field name to field metadata
    pub async fn get_fields(&self, model: &str) -> RpcResult<Map<String, Value>> {
        let result = self
            .execute(model, "fields_get", vec![], Some(Map::new()))
            .await?;
        match result {
            Value::Object(fields) => Ok(fields),
            _ => Err(RpcError::unexpected("fields_get", "a mapping of fields")),
        }
    }

    pub async fn count(&self, model: &str, domain: Vec<Value>) -> RpcResult<i64> {
        let result = self
            .execute(model, "search_count", vec![Value::Array(domain)], None)
            .await?;
        into_int("search_count", result)
    }

    /// One row per distinct `groupby` tuple among records matching the domain
    pub async fn read_group(&self, model: &str, request: ReadGroupRequest) -> RpcResult<Vec<Record>> {
        let kwargs = request.kwargs();
        let args = vec![
            Value::Array(request.domain),
            json!(request.fields),
            json!(request.groupby),
        ];
        let result = self
            .execute(model, "read_group", args, Some(kwargs))
            .await?;
        into_records("read_group", result)
    }
}
