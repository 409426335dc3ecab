//! Tool surface rendering: operation descriptors to MCP tools, envelopes to text results

use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::ErrorKind;
use crate::operation::{Operation, OperationDescriptor};
use crate::protocol::{CallToolResult, Tool, ToolContent};

impl From<&OperationDescriptor> for Tool {
    fn from(descriptor: &OperationDescriptor) -> Self {
        Tool {
            name: descriptor.operation.tool_name(),
            description: Some(descriptor.description.to_string()),
            input_schema: descriptor.input_schema(),
        }
    }
}

fn count_of(envelope: &Envelope) -> u64 {
    envelope.get("count").and_then(Value::as_u64).unwrap_or(0)
}

fn str_of<'a>(envelope: &'a Envelope, key: &str) -> &'a str {
    envelope.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn success_summary(operation: Operation, envelope: &Envelope) -> String {
    match operation {
        Operation::Connect | Operation::Create | Operation::Write | Operation::Unlink => {
            str_of(envelope, "message").to_string()
        }
        Operation::Search => format!("Found {} records", count_of(envelope)),
        Operation::SearchIds => format!("Found {} record IDs", count_of(envelope)),
        Operation::Read => format!("Read {} records", count_of(envelope)),
        Operation::Call => "Method result".to_string(),
        Operation::GetModels => format!("Available models: {}", count_of(envelope)),
        Operation::GetFields => format!("Fields for {}", str_of(envelope, "model")),
        Operation::Count => format!(
            "Record count for {}: {}",
            str_of(envelope, "model"),
            count_of(envelope)
        ),
        Operation::ReadGroup => format!("Found {} groups", count_of(envelope)),
    }
}

fn failure_label(operation: Operation) -> &'static str {
    match operation {
        Operation::Connect => "Connection",
        Operation::Search | Operation::SearchIds => "Search",
        Operation::Read => "Read",
        Operation::Create => "Create",
        Operation::Write => "Update",
        Operation::Unlink => "Delete",
        Operation::Call => "Method call",
        Operation::GetModels => "Get models",
        Operation::GetFields => "Get fields",
        Operation::Count => "Count",
        Operation::ReadGroup => "Read group",
    }
}

/// Render one envelope as a single text block: a human summary, a blank
/// line, then the envelope itself as pretty JSON.
pub fn render(tool_name: &str, envelope: &Envelope) -> CallToolResult {
    let operation = Operation::from_tool_name(tool_name);

    let summary = match (envelope, operation) {
        (Envelope::Success(_), Some(op)) => success_summary(op, envelope),
        (Envelope::Success(_), None) => "Done".to_string(),
        (Envelope::Error { kind: ErrorKind::UnknownOperation, .. }, _) => {
            return CallToolResult::error(vec![ToolContent::text(format!(
                "Unknown tool: {tool_name}"
            ))]);
        }
        (Envelope::Error { kind: ErrorKind::NotConnected, .. }, _) => {
            "Not connected to Odoo. Use odoo_connect first.".to_string()
        }
        (Envelope::Error { message, .. }, Some(op)) => {
            format!("{} failed: {}", failure_label(op), message)
        }
        (Envelope::Error { message, .. }, None) => format!("Error: {message}"),
    };

    let body = serde_json::to_string_pretty(envelope).unwrap_or_default();
    let content = vec![ToolContent::text(format!("{summary}\n\n{body}"))];

    if envelope.is_success() {
        CallToolResult::success(content)
    } else {
        CallToolResult::error(content)
    }
}

/// Recover the envelope JSON from a text block produced by [`render`]
pub fn envelope_json(text: &str) -> Option<Value> {
    let (_, body) = text.split_once("\n\n")?;
    serde_json::from_str(body).ok()
}
