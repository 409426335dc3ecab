//! Typed access to operation arguments

use serde_json::{Map, Value};

use crate::error::{GatewayError, GatewayResult};
use crate::operation::OperationDescriptor;

/// Arguments of one operation call, keyed by parameter name.
///
/// `null` is treated the same as an absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Accept any JSON value; only objects (or null, meaning no arguments) are valid
    pub fn from_value(value: Value) -> GatewayResult<Self> {
        match value {
            Value::Object(values) => Ok(Self::new(values)),
            Value::Null => Ok(Self::default()),
            _ => Err(GatewayError::invalid("arguments", "an object")),
        }
    }

    fn present(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.present(name).is_some()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// First required parameter of `descriptor` that is absent, null or an empty string
    pub fn first_missing(&self, descriptor: &OperationDescriptor) -> Option<&'static str> {
        descriptor
            .required_params()
            .find(|name| match self.present(name) {
                None => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            })
    }

    /// Fill every absent optional parameter with its declared default
    pub fn apply_defaults(&mut self, descriptor: &OperationDescriptor) {
        for (name, default) in descriptor.optional_params() {
            if !self.contains(name) {
                self.set(name, default.clone());
            }
        }
    }

    fn required(&self, name: &str) -> GatewayResult<&Value> {
        self.present(name)
            .ok_or_else(|| GatewayError::missing(name))
    }

    pub fn str(&self, name: &str) -> GatewayResult<&str> {
        self.required(name)?
            .as_str()
            .ok_or_else(|| GatewayError::invalid(name, "a string"))
    }

    pub fn opt_str(&self, name: &str) -> GatewayResult<Option<&str>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_str()
                .map(Some)
                .ok_or_else(|| GatewayError::invalid(name, "a string")),
        }
    }

    pub fn opt_bool(&self, name: &str) -> GatewayResult<Option<bool>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_bool()
                .map(Some)
                .ok_or_else(|| GatewayError::invalid(name, "a boolean")),
        }
    }

    /// Non-negative integer
    pub fn opt_count(&self, name: &str) -> GatewayResult<Option<u64>> {
        match self.present(name) {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| GatewayError::invalid(name, "a non-negative integer")),
        }
    }

    pub fn list(&self, name: &str) -> GatewayResult<Vec<Value>> {
        match self.required(name)? {
            Value::Array(items) => Ok(items.clone()),
            _ => Err(GatewayError::invalid(name, "a list")),
        }
    }

    pub fn object(&self, name: &str) -> GatewayResult<Map<String, Value>> {
        match self.required(name)? {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(GatewayError::invalid(name, "an object")),
        }
    }

    pub fn ids(&self, name: &str) -> GatewayResult<Vec<i64>> {
        let Value::Array(items) = self.required(name)? else {
            return Err(GatewayError::invalid(name, "a list of integer ids"));
        };
        items
            .iter()
            .map(|item| {
                item.as_i64()
                    .ok_or_else(|| GatewayError::invalid(name, "a list of integer ids"))
            })
            .collect()
    }

    pub fn strings(&self, name: &str) -> GatewayResult<Vec<String>> {
        let Value::Array(items) = self.required(name)? else {
            return Err(GatewayError::invalid(name, "a list of strings"));
        };
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| GatewayError::invalid(name, "a list of strings"))
            })
            .collect()
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}
