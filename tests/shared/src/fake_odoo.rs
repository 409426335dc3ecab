//! In-memory stand-in for an Odoo server
//!
//! [`FakeOdoo`] answers the `common` and `object` services the gateway uses,
//! with real domain filtering and grouping over a handful of demo models. It
//! plugs into [`RpcConnection`](odoo_rpc_client::RpcConnection) directly as a
//! [`TransportFactory`], or sits behind a real HTTP listener via
//! [`spawn_fake_odoo_http`](crate::spawn_fake_odoo_http).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use odoo_mcp_json_rpc::JsonRpcErrorObject;
use odoo_rpc_client::{
    ClientConfig, RpcError, RpcResult, RpcTransport, TransportError, TransportFactory,
};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain;

pub type Record = Map<String, Value>;

/// Odoo's fault envelope code for server-side exceptions
pub const ODOO_FAULT_CODE: i64 = 200;

/// An exception raised inside the fake server
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    pub name: String,
    pub message: String,
}

impl Fault {
    fn new(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            message: message.into(),
        }
    }

    fn access_denied() -> Self {
        Self::new("odoo.exceptions.AccessDenied", "Access Denied")
    }

    fn value_error(message: impl Into<String>) -> Self {
        Self::new("builtins.ValueError", message)
    }

    fn missing(model: &str, ids: &[i64]) -> Self {
        let ids: Vec<String> = ids.iter().map(i64::to_string).collect();
        Self::new(
            "odoo.exceptions.MissingError",
            format!(
                "Record does not exist or has been deleted.\n(Record: {model}({}), User: {})",
                ids.join(", "),
                FakeOdoo::UID
            ),
        )
    }

    /// The JSON-RPC error object a real server sends for this fault,
    /// traceback included under `data.debug`
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        JsonRpcErrorObject {
            code: ODOO_FAULT_CODE,
            message: "Odoo Server Error".to_string(),
            data: Some(json!({
                "name": self.name,
                "message": self.message,
                "arguments": [self.message],
                "debug": format!(
                    "Traceback (most recent call last):\n  File \"odoo/http.py\", line 1\n{}: {}",
                    self.name, self.message
                ),
            })),
        }
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

pub type FaultResult<T> = Result<T, Fault>;

/// One recorded `service.method(*args)` invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub service: String,
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone)]
struct Model {
    description: String,
    /// `fields_get` metadata, keyed by field name
    fields: Map<String, Value>,
    records: BTreeMap<i64, Record>,
    next_id: i64,
}

impl Model {
    fn new(description: &str, fields: Value) -> Self {
        let mut fields = fields.as_object().cloned().unwrap_or_default();
        fields.insert(
            "id".into(),
            json!({"type": "integer", "string": "ID", "readonly": true}),
        );
        Self {
            description: description.to_string(),
            fields,
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn field_type(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.get("type")?.as_str()
    }

    fn relation(&self, field: &str) -> Option<&str> {
        self.fields.get(field)?.get("relation")?.as_str()
    }
}

#[derive(Default)]
struct Inner {
    models: Mutex<BTreeMap<String, Model>>,
    calls: Mutex<Vec<RecordedCall>>,
    call_count: AtomicUsize,
}

/// A shared, cloneable in-memory ERP
#[derive(Clone, Default)]
pub struct FakeOdoo {
    inner: Arc<Inner>,
}

impl fmt::Debug for FakeOdoo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeOdoo")
            .field("models", &self.inner.models.lock().keys().cloned().collect::<Vec<_>>())
            .field("call_count", &self.call_count())
            .finish()
    }
}

impl FakeOdoo {
    pub const DATABASE: &'static str = "demo";
    pub const USERNAME: &'static str = "admin";
    pub const PASSWORD: &'static str = "admin";
    pub const UID: i64 = 2;
    pub const SERVER_VERSION: &'static str = "17.0";

    /// A server with no models at all
    pub fn new() -> Self {
        Self::default()
    }

    /// A server with partners, CRM stages and leads
    pub fn with_demo_data() -> Self {
        let fake = Self::new();
        fake.define_model(
            "res.partner",
            "Contact",
            json!({
                "name": {"type": "char", "string": "Name", "required": true},
                "email": {"type": "char", "string": "Email"},
                "city": {"type": "char", "string": "City"},
                "is_company": {"type": "boolean", "string": "Is a Company"},
                "customer_rank": {"type": "integer", "string": "Customer Rank"},
            }),
        );
        fake.define_model(
            "crm.stage",
            "CRM Stages",
            json!({
                "name": {"type": "char", "string": "Stage Name", "required": true},
                "sequence": {"type": "integer", "string": "Sequence"},
            }),
        );
        fake.define_model(
            "crm.lead",
            "Lead/Opportunity",
            json!({
                "name": {"type": "char", "string": "Opportunity", "required": true},
                "partner_id": {"type": "many2one", "string": "Customer", "relation": "res.partner"},
                "stage_id": {"type": "many2one", "string": "Stage", "relation": "crm.stage"},
                "expected_revenue": {"type": "monetary", "string": "Expected Revenue"},
                "probability": {"type": "float", "string": "Probability"},
            }),
        );

        for (name, email, city, is_company, rank) in [
            ("Azure Interior", "azure.Interior24@example.com", "Fremont", true, 1),
            ("Deco Addict", "deco_addict@example.com", "Pleasant Hill", true, 2),
            ("Gemini Furniture", "gemini_furniture@example.com", "Fairfield", true, 0),
            ("Brandon Freeman", "brandon.freeman55@example.com", "Fremont", false, 1),
            ("Nicole Ford", "nicole.ford75@example.com", "Fairfield", false, 0),
        ] {
            fake.seed(
                "res.partner",
                json!({"name": name, "email": email, "city": city, "is_company": is_company, "customer_rank": rank}),
            );
        }

        for (sequence, name) in [(1, "New"), (2, "Qualified"), (3, "Won")] {
            fake.seed("crm.stage", json!({"name": name, "sequence": sequence}));
        }

        for (name, partner, stage, revenue, probability) in [
            ("Office Design Project", 1, 1, 24000.0, 10.0),
            ("Open Space Design", 2, 2, 11000.0, 30.0),
            ("Modern Open Space", 2, 2, 4500.0, 40.0),
            ("Quote for 12 Tables", 3, 3, 40000.0, 100.0),
            ("Distributor Contract", 1, 1, 19800.0, 5.0),
        ] {
            fake.seed(
                "crm.lead",
                json!({
                    "name": name,
                    "partner_id": partner,
                    "stage_id": stage,
                    "expected_revenue": revenue,
                    "probability": probability,
                }),
            );
        }

        fake
    }

    /// Register an empty model with the given field metadata
    pub fn define_model(&self, model: &str, description: &str, fields: Value) {
        self.inner
            .models
            .lock()
            .insert(model.to_string(), Model::new(description, fields));
    }

    /// Insert a record without counting it as a call; returns its id
    pub fn insert(&self, model: &str, values: Value) -> FaultResult<i64> {
        let values = values.as_object().cloned().unwrap_or_default();
        self.create(model, values)
    }

    fn seed(&self, model: &str, values: Value) {
        if let Err(fault) = self.insert(model, values) {
            panic!("invalid demo record for {model}: {fault}");
        }
    }

    /// Transport factory connecting an `RpcConnection` straight to this server
    pub fn factory(&self) -> Arc<dyn TransportFactory> {
        Arc::new(self.clone())
    }

    /// Remote calls received so far, authentication included
    pub fn call_count(&self) -> usize {
        self.inner.call_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.inner.calls.lock().last().cloned()
    }

    pub fn record_count(&self, model: &str) -> usize {
        self.inner
            .models
            .lock()
            .get(model)
            .map_or(0, |m| m.records.len())
    }

    pub fn record(&self, model: &str, id: i64) -> Option<Record> {
        self.inner.models.lock().get(model)?.records.get(&id).cloned()
    }

    /// Credentials that authenticate against this server at `url`
    pub fn credentials(url: &str) -> Value {
        json!({
            "url": url,
            "database": Self::DATABASE,
            "username": Self::USERNAME,
            "password": Self::PASSWORD,
        })
    }

    /// Answer one `service.method(*args)` call the way the server would
    pub fn handle(&self, service: &str, method: &str, args: &[Value]) -> FaultResult<Value> {
        self.inner.call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.calls.lock().push(RecordedCall {
            service: service.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
        });
        debug!(service, method, "fake odoo call");

        match (service, method) {
            ("common", "authenticate") => Ok(self.authenticate(args)),
            ("common", "version") => Ok(json!({
                "server_version": Self::SERVER_VERSION,
                "server_serie": Self::SERVER_VERSION,
                "protocol_version": 1,
            })),
            ("object", "execute_kw") => self.execute_kw(args),
            _ => Err(Fault::new(
                "werkzeug.exceptions.NotFound",
                format!("Service or method not found: {service}.{method}"),
            )),
        }
    }

    fn authenticate(&self, args: &[Value]) -> Value {
        let valid = args.first() == Some(&json!(Self::DATABASE))
            && args.get(1) == Some(&json!(Self::USERNAME))
            && args.get(2) == Some(&json!(Self::PASSWORD));
        if valid { json!(Self::UID) } else { json!(false) }
    }

    fn execute_kw(&self, args: &[Value]) -> FaultResult<Value> {
        let [database, uid, password, model, method, rest @ ..] = args else {
            return Err(Fault::new(
                "builtins.TypeError",
                "execute_kw() missing required positional arguments",
            ));
        };
        if database != &json!(Self::DATABASE)
            || uid != &json!(Self::UID)
            || password != &json!(Self::PASSWORD)
        {
            return Err(Fault::access_denied());
        }

        let model = model
            .as_str()
            .ok_or_else(|| Fault::value_error("model name must be a string"))?;
        let method = method
            .as_str()
            .ok_or_else(|| Fault::value_error("method name must be a string"))?;
        let positional = rest
            .first()
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let kwargs = rest
            .get(1)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        let call = ModelCall {
            model,
            positional: &positional,
            kwargs: &kwargs,
        };

        if model == odoo_rpc_client::operations::MODEL_REGISTRY {
            return match method {
                "search_read" => self.search_read(&self.model_registry(), &call),
                _ => Err(Fault::value_error(format!(
                    "Method '{method}' is not available on {model} in this server"
                ))),
            };
        }

        match method {
            "search_read" => {
                let records = self.records_of(model)?;
                self.search_read(&records, &call)
            }
            "search" => {
                let records = self.records_of(model)?;
                let matched = filter(&records, &call.domain(0)?, &call)?;
                Ok(json!(matched.iter().filter_map(|r| record_id(r)).collect::<Vec<_>>()))
            }
            "search_count" => {
                let records = self.records_of(model)?;
                let domain = call.domain(0)?;
                let mut count = 0;
                for record in &records {
                    if domain::matches(&domain, record).map_err(Fault::value_error)? {
                        count += 1;
                    }
                }
                Ok(json!(count))
            }
            "read" => self.read(&call),
            "create" => {
                let values = call
                    .positional
                    .first()
                    .and_then(Value::as_object)
                    .cloned()
                    .ok_or_else(|| Fault::value_error("create expects a mapping of values"))?;
                self.create(model, values).map(|id| json!(id))
            }
            "write" => self.write(&call),
            "unlink" => self.unlink(&call),
            "fields_get" => self.fields_get(model),
            "read_group" => self.read_group(&call),
            other => {
                self.records_of(model)?;
                Err(Fault::new(
                    "builtins.AttributeError",
                    format!("The method '{other}' does not exist on the model '{model}'"),
                ))
            }
        }
    }

    fn unknown_model(model: &str) -> Fault {
        Fault::new("builtins.KeyError", format!("Model '{model}' does not exist"))
    }

    fn with_model<T>(&self, model: &str, f: impl FnOnce(&mut Model) -> FaultResult<T>) -> FaultResult<T> {
        let mut models = self.inner.models.lock();
        let entry = models.get_mut(model).ok_or_else(|| Self::unknown_model(model))?;
        f(entry)
    }

    fn records_of(&self, model: &str) -> FaultResult<Vec<Record>> {
        self.with_model(model, |m| Ok(m.records.values().cloned().collect()))
    }

    fn model_registry(&self) -> Vec<Record> {
        self.inner
            .models
            .lock()
            .iter()
            .enumerate()
            .map(|(index, (name, model))| {
                let mut record = Record::new();
                record.insert("id".into(), json!(index as i64 + 1));
                record.insert("model".into(), json!(name));
                record.insert("name".into(), json!(model.description));
                record.insert("info".into(), json!(false));
                record
            })
            .collect()
    }

    fn search_read(&self, records: &[Record], call: &ModelCall<'_>) -> FaultResult<Value> {
        let matched = filter(records, &call.domain(0)?, call)?;
        let fields = call.fields()?;
        Ok(Value::Array(
            matched
                .into_iter()
                .map(|r| Value::Object(project(r, &fields)))
                .collect(),
        ))
    }

    fn read(&self, call: &ModelCall<'_>) -> FaultResult<Value> {
        let ids = call.ids()?;
        let fields = call.fields()?;
        self.with_model(call.model, |m| {
            check_fields(call.model, m, &fields)?;
            let missing: Vec<i64> = ids.iter().copied().filter(|id| !m.records.contains_key(id)).collect();
            if !missing.is_empty() {
                return Err(Fault::missing(call.model, &missing));
            }
            Ok(Value::Array(
                ids.iter()
                    .filter_map(|id| m.records.get(id))
                    .map(|r| Value::Object(project(r, &fields)))
                    .collect(),
            ))
        })
    }

    fn create(&self, model: &str, values: Record) -> FaultResult<i64> {
        let mut models = self.inner.models.lock();
        let schema = models.get(model).ok_or_else(|| Self::unknown_model(model))?;

        let mut record = Record::new();
        for field in schema.fields.keys().filter(|f| f.as_str() != "id") {
            record.insert(field.clone(), Value::Bool(false));
        }
        for (field, value) in values {
            if field == "id" || !schema.fields.contains_key(&field) {
                return Err(Fault::value_error(format!(
                    "Invalid field '{field}' on model '{model}'"
                )));
            }
            let value = resolve_relation(&models, schema, &field, value)?;
            record.insert(field, value);
        }

        let Some(schema) = models.get_mut(model) else {
            return Err(Self::unknown_model(model));
        };
        let id = schema.next_id;
        schema.next_id += 1;
        record.insert("id".into(), json!(id));
        schema.records.insert(id, record);
        Ok(id)
    }

    fn write(&self, call: &ModelCall<'_>) -> FaultResult<Value> {
        let ids = call.ids()?;
        let values = call
            .positional
            .get(1)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| Fault::value_error("write expects a mapping of values"))?;

        let mut models = self.inner.models.lock();
        let schema = models.get(call.model).ok_or_else(|| Self::unknown_model(call.model))?;
        let missing: Vec<i64> = ids.iter().copied().filter(|id| !schema.records.contains_key(id)).collect();
        if !missing.is_empty() {
            return Err(Fault::missing(call.model, &missing));
        }

        let mut resolved = Record::new();
        for (field, value) in values {
            if field == "id" || !schema.fields.contains_key(&field) {
                return Err(Fault::value_error(format!(
                    "Invalid field '{field}' on model '{}'",
                    call.model
                )));
            }
            let value = resolve_relation(&models, schema, &field, value)?;
            resolved.insert(field, value);
        }

        if let Some(schema) = models.get_mut(call.model) {
            for id in &ids {
                if let Some(record) = schema.records.get_mut(id) {
                    record.extend(resolved.clone());
                }
            }
        }
        Ok(json!(true))
    }

    fn unlink(&self, call: &ModelCall<'_>) -> FaultResult<Value> {
        let ids = call.ids()?;
        self.with_model(call.model, |m| {
            let missing: Vec<i64> = ids.iter().copied().filter(|id| !m.records.contains_key(id)).collect();
            if !missing.is_empty() {
                return Err(Fault::missing(call.model, &missing));
            }
            for id in &ids {
                m.records.remove(id);
            }
            Ok(json!(true))
        })
    }

    fn fields_get(&self, model: &str) -> FaultResult<Value> {
        self.with_model(model, |m| Ok(Value::Object(m.fields.clone())))
    }

    fn read_group(&self, call: &ModelCall<'_>) -> FaultResult<Value> {
        let domain = call.domain(0)?;
        let specs = call.string_list(1, "fields")?;
        let groupby = call.string_list(2, "groupby")?;
        let lazy = call
            .kwargs
            .get("lazy")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let (model, records) = self.with_model(call.model, |m| {
            Ok((m.clone(), m.records.values().cloned().collect::<Vec<_>>()))
        })?;

        let groupby: Vec<String> = groupby
            .iter()
            .map(|g| g.split(':').next().unwrap_or_default().to_string())
            .collect();
        for field in &groupby {
            if !model.fields.contains_key(field) {
                return Err(Fault::value_error(format!(
                    "Invalid field '{field}' on model '{}'",
                    call.model
                )));
            }
        }
        let grouped: &[String] = if lazy && !groupby.is_empty() {
            &groupby[..1]
        } else {
            &groupby
        };

        let aggregates = aggregates(call.model, &model, &specs, grouped)?;

        let no_paging = Map::new();
        let unpaged = ModelCall {
            model: call.model,
            positional: &[],
            kwargs: &no_paging,
        };
        let matched = filter(&records, &domain, &unpaged)?;
        let mut groups: Vec<(Vec<Value>, Vec<&Record>)> = Vec::new();
        for record in &matched {
            let key: Vec<Value> = grouped
                .iter()
                .map(|f| record.get(f).cloned().unwrap_or(Value::Bool(false)))
                .collect();
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(record),
                None => groups.push((key, vec![record])),
            }
        }
        groups.sort_by(|(a, _), (b, _)| {
            let a: Vec<&Value> = a.iter().map(domain::scalar).collect();
            let b: Vec<&Value> = b.iter().map(domain::scalar).collect();
            a.iter()
                .zip(b.iter())
                .map(|(x, y)| compare_values(x, y))
                .find(|o| o.is_ne())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let count_key = if lazy && !grouped.is_empty() {
            format!("{}_count", grouped[0])
        } else {
            "__count".to_string()
        };

        let mut rows = Vec::new();
        for (key, members) in groups {
            let mut row = Record::new();
            let mut group_domain = domain.clone();
            for (field, value) in grouped.iter().zip(key.iter()) {
                row.insert(field.clone(), value.clone());
                group_domain.push(json!([field, "=", domain::scalar(value)]));
            }
            row.insert(count_key.clone(), json!(members.len()));
            for (name, field, function) in &aggregates {
                row.insert(name.clone(), aggregate(&members, field, function));
            }
            row.insert("__domain".into(), Value::Array(group_domain));
            if lazy && groupby.len() > 1 {
                row.insert("__context".into(), json!({"group_by": groupby[1..].to_vec()}));
            }
            rows.push(Value::Object(row));
        }

        if let Some(limit) = call.limit() {
            rows.truncate(limit);
        }
        Ok(Value::Array(rows))
    }
}

impl TransportFactory for FakeOdoo {
    fn create(&self, url: &str, _config: &ClientConfig) -> RpcResult<Arc<dyn RpcTransport>> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(TransportError::InvalidUrl(format!("unsupported URL: {url}")).into());
        }
        Ok(Arc::new(FakeTransport {
            odoo: self.clone(),
            endpoint: format!("{}/jsonrpc", url.trim_end_matches('/')),
        }))
    }
}

/// Direct in-process transport onto a [`FakeOdoo`]
#[derive(Debug)]
pub struct FakeTransport {
    odoo: FakeOdoo,
    endpoint: String,
}

impl RpcTransport for FakeTransport {
    fn call(&self, service: &str, method: &str, args: Vec<Value>) -> RpcResult<Value> {
        self.odoo
            .handle(service, method, &args)
            .map_err(|fault| RpcError::remote(&fault.to_error_object()))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Positional and keyword arguments of one model method call
struct ModelCall<'a> {
    model: &'a str,
    positional: &'a [Value],
    kwargs: &'a Map<String, Value>,
}

impl<'a> ModelCall<'a> {
    fn arg(&self, index: usize, name: &str) -> Option<&'a Value> {
        self.positional
            .get(index)
            .or_else(|| self.kwargs.get(name))
            .filter(|v| !v.is_null())
    }

    fn domain(&self, index: usize) -> FaultResult<Vec<Value>> {
        match self.arg(index, "domain") {
            None => Ok(Vec::new()),
            Some(Value::Array(terms)) => Ok(terms.clone()),
            Some(other) => Err(Fault::value_error(format!("Invalid domain: {other}"))),
        }
    }

    fn ids(&self) -> FaultResult<Vec<i64>> {
        let ids = self
            .arg(0, "ids")
            .and_then(Value::as_array)
            .ok_or_else(|| Fault::value_error("expected a list of record ids"))?;
        ids.iter()
            .map(|id| id.as_i64().ok_or_else(|| Fault::value_error(format!("Invalid record id: {id}"))))
            .collect()
    }

    fn string_list(&self, index: usize, name: &str) -> FaultResult<Vec<String>> {
        match self.arg(index, name) {
            None => Ok(Vec::new()),
            Some(Value::String(single)) => Ok(vec![single.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| Fault::value_error(format!("Invalid {name} entry: {item}")))
                })
                .collect(),
            Some(other) => Err(Fault::value_error(format!("Invalid {name}: {other}"))),
        }
    }

    fn fields(&self) -> FaultResult<Vec<String>> {
        match self.kwargs.get("fields") {
            Some(Value::Array(_)) | Some(Value::Null) | None => {}
            Some(other) => return Err(Fault::value_error(format!("Invalid fields: {other}"))),
        }
        Ok(self
            .kwargs
            .get("fields")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default())
    }

    /// Zero, null and absent all mean "no limit"
    fn limit(&self) -> Option<usize> {
        self.kwargs
            .get("limit")
            .and_then(Value::as_u64)
            .filter(|limit| *limit > 0)
            .map(|limit| limit as usize)
    }

    fn offset(&self) -> usize {
        self.kwargs
            .get("offset")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize
    }
}

fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}

fn filter<'r>(records: &'r [Record], domain: &[Value], call: &ModelCall<'_>) -> FaultResult<Vec<&'r Record>> {
    let mut matched = Vec::new();
    for record in records {
        if domain::matches(domain, record).map_err(Fault::value_error)? {
            matched.push(record);
        }
    }
    matched.sort_by_key(|r| record_id(r));

    let matched = matched.into_iter().skip(call.offset());
    Ok(match call.limit() {
        Some(limit) => matched.take(limit).collect(),
        None => matched.collect(),
    })
}

fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    let mut projected = Record::new();
    if let Some(id) = record.get("id") {
        projected.insert("id".into(), id.clone());
    }
    for field in fields {
        if let Some(value) = record.get(field) {
            projected.insert(field.clone(), value.clone());
        }
    }
    projected
}

fn check_fields(model_name: &str, model: &Model, fields: &[String]) -> FaultResult<()> {
    match fields.iter().find(|f| !model.fields.contains_key(f.as_str())) {
        Some(field) => Err(Fault::value_error(format!(
            "Invalid field '{field}' on model '{model_name}'"
        ))),
        None => Ok(()),
    }
}

/// Many2one ids are stored as `[id, display_name]`, like the server returns them
fn resolve_relation(
    models: &BTreeMap<String, Model>,
    schema: &Model,
    field: &str,
    value: Value,
) -> FaultResult<Value> {
    if schema.field_type(field) != Some("many2one") {
        return Ok(value);
    }
    let Some(id) = value.as_i64() else {
        return Ok(value);
    };
    let relation = schema.relation(field).unwrap_or_default();
    let name = models
        .get(relation)
        .and_then(|m| m.records.get(&id))
        .and_then(|r| r.get("name"))
        .cloned()
        .ok_or_else(|| Fault::missing(relation, &[id]))?;
    Ok(json!([id, name]))
}

/// Parse `"field:function"` specs into `(output key, field, function)`
fn aggregates(
    model_name: &str,
    model: &Model,
    specs: &[String],
    grouped: &[String],
) -> FaultResult<Vec<(String, String, String)>> {
    let mut parsed = Vec::new();
    for spec in specs {
        let (field, function) = match spec.split_once(':') {
            Some((field, function)) => (field.to_string(), Some(function.to_string())),
            None => (spec.clone(), None),
        };
        if field == "__count" || grouped.contains(&field) {
            continue;
        }
        let Some(kind) = model.field_type(&field) else {
            return Err(Fault::value_error(format!(
                "Invalid field '{field}' on model '{model_name}'"
            )));
        };
        let numeric = matches!(kind, "integer" | "float" | "monetary");
        let function = match function {
            Some(function) => {
                if !matches!(function.as_str(), "sum" | "avg" | "min" | "max" | "count") {
                    return Err(Fault::value_error(format!(
                        "Invalid aggregation function '{function}'"
                    )));
                }
                function
            }
            None if numeric => "sum".to_string(),
            None => continue,
        };
        parsed.push((field.clone(), field, function));
    }
    Ok(parsed)
}

fn aggregate(members: &[&Record], field: &str, function: &str) -> Value {
    let values: Vec<f64> = members
        .iter()
        .filter_map(|r| r.get(field))
        .filter_map(Value::as_f64)
        .collect();
    match function {
        "count" => json!(members.iter().filter(|r| r.get(field).is_some_and(|v| v != &Value::Bool(false))).count()),
        "sum" => json!(values.iter().sum::<f64>()),
        "avg" if !values.is_empty() => json!(values.iter().sum::<f64>() / values.len() as f64),
        "min" => values.iter().copied().reduce(f64::min).map_or(Value::Bool(false), |v| json!(v)),
        "max" => values.iter().copied().reduce(f64::max).map_or(Value::Bool(false), |v| json!(v)),
        _ => Value::Bool(false),
    }
}

fn compare_values(a: &Value, b: &Value) -> std::cmp::Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => a.to_string().cmp(&b.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn execute(fake: &FakeOdoo, model: &str, method: &str, args: Value, kwargs: Value) -> FaultResult<Value> {
        fake.handle(
            "object",
            "execute_kw",
            &[
                json!(FakeOdoo::DATABASE),
                json!(FakeOdoo::UID),
                json!(FakeOdoo::PASSWORD),
                json!(model),
                json!(method),
                args,
                kwargs,
            ],
        )
    }

    #[test]
    fn test_authenticate() {
        let fake = FakeOdoo::with_demo_data();
        let ok = fake
            .handle("common", "authenticate", &[json!("demo"), json!("admin"), json!("admin"), json!({})])
            .unwrap();
        assert_eq!(ok, json!(2));

        let refused = fake
            .handle("common", "authenticate", &[json!("demo"), json!("admin"), json!("nope"), json!({})])
            .unwrap();
        assert_eq!(refused, json!(false));
        assert_eq!(fake.call_count(), 2);
    }

    #[test]
    fn test_search_read_filters_and_limits() {
        let fake = FakeOdoo::with_demo_data();
        let companies = execute(
            &fake,
            "res.partner",
            "search_read",
            json!([[["is_company", "=", true]]]),
            json!({"fields": ["name"], "limit": 2}),
        )
        .unwrap();
        assert_eq!(
            companies,
            json!([{"id": 1, "name": "Azure Interior"}, {"id": 2, "name": "Deco Addict"}])
        );

        let all = execute(&fake, "res.partner", "search_read", json!([[]]), json!({"limit": 0})).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_create_resolves_many2one() {
        let fake = FakeOdoo::with_demo_data();
        let id = execute(
            &fake,
            "crm.lead",
            "create",
            json!([{"name": "New desk", "partner_id": 4, "stage_id": 1}]),
            json!({}),
        )
        .unwrap();
        let lead = fake.record("crm.lead", id.as_i64().unwrap()).unwrap();
        assert_eq!(lead["partner_id"], json!([4, "Brandon Freeman"]));
        assert_eq!(lead["expected_revenue"], json!(false));
    }

    #[test]
    fn test_unlink_missing_ids_faults() {
        let fake = FakeOdoo::with_demo_data();
        let fault = execute(&fake, "res.partner", "unlink", json!([[1, 99]]), json!({})).unwrap_err();
        assert!(fault.message.contains("res.partner(99)"), "{fault}");
        assert_eq!(fake.record_count("res.partner"), 5);
    }

    #[test]
    fn test_read_group_lazy() {
        let fake = FakeOdoo::with_demo_data();
        let groups = execute(
            &fake,
            "crm.lead",
            "read_group",
            json!([[], ["expected_revenue:sum"], ["stage_id", "partner_id"]]),
            json!({"lazy": true}),
        )
        .unwrap();
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0]["stage_id"], json!([1, "New"]));
        assert_eq!(groups[0]["stage_id_count"], json!(2));
        assert_eq!(groups[0]["expected_revenue"], json!(43800.0));
        assert_eq!(groups[0]["__domain"], json!([["stage_id", "=", 1]]));
        assert_eq!(groups[0]["__context"], json!({"group_by": ["partner_id"]}));
    }

    #[test]
    fn test_read_group_eager_counts() {
        let fake = FakeOdoo::with_demo_data();
        let groups = execute(
            &fake,
            "crm.lead",
            "read_group",
            json!([[], [], ["stage_id", "partner_id"]]),
            json!({"lazy": false, "limit": 2}),
        )
        .unwrap();
        let groups = groups.as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.get("__count").is_some()));
    }

    #[test]
    fn test_unknown_model_and_bad_credentials() {
        let fake = FakeOdoo::with_demo_data();
        let fault = execute(&fake, "no.such.model", "search_count", json!([[]]), json!({})).unwrap_err();
        assert!(fault.message.contains("no.such.model"));

        let denied = fake
            .handle(
                "object",
                "execute_kw",
                &[json!("demo"), json!(2), json!("wrong"), json!("res.partner"), json!("search"), json!([[]])],
            )
            .unwrap_err();
        assert_eq!(denied.message, "Access Denied");
    }

    #[test]
    fn test_fault_error_object_keeps_traceback_out_of_detail() {
        let fault = Fault::access_denied();
        let object = fault.to_error_object();
        assert_eq!(object.code, ODOO_FAULT_CODE);
        assert_eq!(object.detail_message(), "Access Denied");
        assert!(object.data.unwrap()["debug"].as_str().unwrap().contains("Traceback"));
    }
}
