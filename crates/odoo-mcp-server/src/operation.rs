//! The closed set of gateway operations and their descriptors

use std::fmt;

use serde_json::{Value, json};

use crate::schema::{JsonSchema, ToolSchema};

/// Prefix of every tool name on the MCP surface
pub const TOOL_PREFIX: &str = "odoo_";

/// Every operation the gateway exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Connect,
    Search,
    SearchIds,
    Read,
    Create,
    Write,
    Unlink,
    Call,
    GetModels,
    GetFields,
    Count,
    ReadGroup,
}

impl Operation {
    pub const ALL: [Operation; 12] = [
        Operation::Connect,
        Operation::Search,
        Operation::SearchIds,
        Operation::Read,
        Operation::Create,
        Operation::Write,
        Operation::Unlink,
        Operation::Call,
        Operation::GetModels,
        Operation::GetFields,
        Operation::Count,
        Operation::ReadGroup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Connect => "connect",
            Operation::Search => "search",
            Operation::SearchIds => "search_ids",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Write => "write",
            Operation::Unlink => "unlink",
            Operation::Call => "call",
            Operation::GetModels => "get_models",
            Operation::GetFields => "get_fields",
            Operation::Count => "count",
            Operation::ReadGroup => "read_group",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Name on the MCP surface, e.g. `odoo_search`
    pub fn tool_name(&self) -> String {
        format!("{TOOL_PREFIX}{}", self.name())
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        name.strip_prefix(TOOL_PREFIX).and_then(Self::from_name)
    }

    /// Everything but `connect` needs an established session
    pub fn requires_connection(&self) -> bool {
        !matches!(self, Operation::Connect)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parameter of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub schema: JsonSchema,
    /// Filled in when the caller leaves the parameter out; `None` marks it required
    pub default: Option<Value>,
}

impl ParamSpec {
    fn required(name: &'static str, schema: JsonSchema) -> Self {
        Self {
            name,
            schema,
            default: None,
        }
    }

    fn optional(name: &'static str, schema: JsonSchema, default: Value) -> Self {
        Self {
            name,
            schema,
            default: Some(default),
        }
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Static description of an operation: parameters, defaults and remote target
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub description: &'static str,
    /// ERP method invoked; `None` when the caller names it (`call`)
    pub remote_method: Option<&'static str>,
    pub params: Vec<ParamSpec>,
}

fn model_param() -> ParamSpec {
    ParamSpec::required("model", JsonSchema::string_with_description("Odoo model name"))
}

fn domain_param() -> ParamSpec {
    ParamSpec::optional(
        "domain",
        JsonSchema::array_with_description(
            "Search domain: list of [field, operator, value] triples",
        ),
        json!([]),
    )
}

fn fields_param(description: &str) -> ParamSpec {
    ParamSpec::optional(
        "fields",
        JsonSchema::array_of(JsonSchema::string_with_description("Field name"), description),
        json!([]),
    )
}

fn limit_param() -> ParamSpec {
    ParamSpec::optional(
        "limit",
        JsonSchema::count_with_description("Maximum records (0 = no limit)"),
        json!(odoo_rpc_client::DEFAULT_LIMIT),
    )
}

fn ids_param(description: &str) -> ParamSpec {
    ParamSpec::required(
        "ids",
        JsonSchema::array_of(
            JsonSchema::Integer {
                description: None,
                minimum: None,
            },
            description,
        ),
    )
}

impl OperationDescriptor {
    /// Build the descriptor of `operation`
    pub fn of(operation: Operation) -> Self {
        let (description, remote_method, params) = match operation {
            Operation::Connect => (
                "Connect to Odoo instance",
                Some("authenticate"),
                vec![
                    ParamSpec::required("url", JsonSchema::string_with_description("Odoo server URL")),
                    ParamSpec::required("database", JsonSchema::string_with_description("Database name")),
                    ParamSpec::required("username", JsonSchema::string_with_description("Username")),
                    ParamSpec::required("password", JsonSchema::string_with_description("Password")),
                ],
            ),
            Operation::Search => (
                "Search records in Odoo model",
                Some("search_read"),
                vec![
                    model_param(),
                    domain_param(),
                    fields_param("Fields to retrieve (empty = all)"),
                    limit_param(),
                ],
            ),
            Operation::SearchIds => (
                "Search record IDs in Odoo model",
                Some("search"),
                vec![model_param(), domain_param(), limit_param()],
            ),
            Operation::Read => (
                "Read specific records from Odoo model",
                Some("read"),
                vec![
                    model_param(),
                    ids_param("Record IDs to read"),
                    fields_param("Fields to retrieve (empty = all)"),
                ],
            ),
            Operation::Create => (
                "Create new record in Odoo",
                Some("create"),
                vec![
                    model_param(),
                    ParamSpec::required("values", JsonSchema::object_with_description("Record values")),
                ],
            ),
            Operation::Write => (
                "Update existing records in Odoo",
                Some("write"),
                vec![
                    model_param(),
                    ids_param("Record IDs to update"),
                    ParamSpec::required("values", JsonSchema::object_with_description("Values to update")),
                ],
            ),
            Operation::Unlink => (
                "Delete records from Odoo",
                Some("unlink"),
                vec![model_param(), ids_param("Record IDs to delete")],
            ),
            Operation::Call => (
                "Call method on Odoo model",
                None,
                vec![
                    model_param(),
                    ParamSpec::required("method", JsonSchema::string_with_description("Method name")),
                    ParamSpec::optional(
                        "args",
                        JsonSchema::array_with_description("Method arguments"),
                        json!([]),
                    ),
                    ParamSpec::optional(
                        "kwargs",
                        JsonSchema::object_with_description("Method keyword arguments"),
                        json!({}),
                    ),
                ],
            ),
            Operation::GetModels => (
                "Get list of available Odoo models",
                Some("search_read"),
                vec![ParamSpec::optional(
                    "filter",
                    JsonSchema::string_with_description("Filter models by name pattern"),
                    Value::Null,
                )],
            ),
            Operation::GetFields => (
                "Get fields information for an Odoo model",
                Some("fields_get"),
                vec![model_param()],
            ),
            Operation::Count => (
                "Count records in Odoo model",
                Some("search_count"),
                vec![model_param(), domain_param()],
            ),
            Operation::ReadGroup => (
                "Aggregate records grouped by one or more fields",
                Some("read_group"),
                vec![
                    model_param(),
                    domain_param(),
                    fields_param("Aggregates such as \"amount_total:sum\""),
                    ParamSpec::required(
                        "groupby",
                        JsonSchema::array_of(
                            JsonSchema::string_with_description("Field name"),
                            "Fields to group by",
                        ),
                    ),
                    limit_param(),
                    ParamSpec::optional(
                        "orderby",
                        JsonSchema::string_with_description("Sort specification"),
                        Value::Null,
                    ),
                    ParamSpec::optional(
                        "lazy",
                        JsonSchema::boolean_with_description("Group by the first field only"),
                        json!(true),
                    ),
                ],
            ),
        };

        Self {
            operation,
            description,
            remote_method,
            params,
        }
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }

    /// Required parameter names in declaration order
    pub fn required_params(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.params
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name)
    }

    /// Optional parameters with their defaults
    pub fn optional_params(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.params
            .iter()
            .filter_map(|p| p.default.as_ref().map(|d| (p.name, d)))
    }

    pub fn input_schema(&self) -> ToolSchema {
        let schema = self
            .params
            .iter()
            .fold(ToolSchema::object(), |schema, param| {
                schema.with_property(param.name, param.schema.clone())
            });
        schema.with_required(self.required_params().map(str::to_string).collect())
    }
}
