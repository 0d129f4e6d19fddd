//! Strategy configuration and parameter validation.
//!
//! Parameters are typed (`number`, `boolean`, `string`) and numeric ones may
//! carry a `[min, max]` range. Edits are validated locally before being sent
//! to the backend so an obviously bad value never leaves the dashboard.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::series::wire_timestamp;

/// Rejected parameter edit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{name}' expects a {expected} value")]
    TypeMismatch { name: String, expected: ParamKind },

    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter '{name}': '{input}' is not a valid {expected}")]
    InvalidInput {
        name: String,
        input: String,
        expected: ParamKind,
    },

    #[error("strategy name must not be empty")]
    EmptyName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Number,
    Boolean,
    String,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Number => write!(f, "number"),
            ParamKind::Boolean => write!(f, "boolean"),
            ParamKind::String => write!(f, "string"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Boolean(bool),
    String(String),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Number(_) => ParamKind::Number,
            ParamValue::Boolean(_) => ParamKind::Boolean,
            ParamValue::String(_) => ParamKind::String,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::Number(v) => serde_json::json!(v),
            ParamValue::Boolean(b) => serde_json::Value::Bool(*b),
            ParamValue::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(v) => write!(f, "{v}"),
            ParamValue::Boolean(b) => write!(f, "{b}"),
            ParamValue::String(s) => write!(f, "{s}"),
        }
    }
}

/// One tunable strategy parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameter", into = "RawParameter")]
pub struct StrategyParameter {
    pub value: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub description: String,
}

/// Wire shape: `{"type": "number", "value": 14, "min": 2, "max": 50, "description": ".."}`.
#[derive(Serialize, Deserialize)]
struct RawParameter {
    #[serde(rename = "type")]
    kind: ParamKind,
    value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawParameter> for StrategyParameter {
    type Error = String;

    fn try_from(raw: RawParameter) -> Result<Self, Self::Error> {
        let value = match (raw.kind, &raw.value) {
            (ParamKind::Number, v) => v
                .as_f64()
                .map(ParamValue::Number)
                .ok_or_else(|| format!("expected number, got {v}"))?,
            (ParamKind::Boolean, v) => v
                .as_bool()
                .map(ParamValue::Boolean)
                .ok_or_else(|| format!("expected boolean, got {v}"))?,
            (ParamKind::String, serde_json::Value::String(s)) => ParamValue::String(s.clone()),
            (ParamKind::String, v) => ParamValue::String(v.to_string()),
        };
        Ok(Self {
            value,
            min: raw.min,
            max: raw.max,
            description: raw.description,
        })
    }
}

impl From<StrategyParameter> for RawParameter {
    fn from(p: StrategyParameter) -> Self {
        RawParameter {
            kind: p.value.kind(),
            value: p.value.to_json(),
            min: p.min,
            max: p.max,
            description: p.description,
        }
    }
}

impl StrategyParameter {
    pub fn number(value: f64, min: f64, max: f64, description: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Number(value),
            min: Some(min),
            max: Some(max),
            description: description.into(),
        }
    }

    pub fn boolean(value: bool, description: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Boolean(value),
            min: None,
            max: None,
            description: description.into(),
        }
    }

    pub fn string(value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            value: ParamValue::String(value.into()),
            min: None,
            max: None,
            description: description.into(),
        }
    }

    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    /// Increment used by the editor's +/- keys: 1/20th of the range, or 1.
    pub fn step(&self) -> f64 {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) if hi > lo => (hi - lo) / 20.0,
            _ => 1.0,
        }
    }

    fn check(&self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        if value.kind() != self.kind() {
            return Err(ParamError::TypeMismatch {
                name: name.to_string(),
                expected: self.kind(),
            });
        }
        if let ParamValue::Number(v) = value {
            let min = self.min.unwrap_or(f64::NEG_INFINITY);
            let max = self.max.unwrap_or(f64::INFINITY);
            if !v.is_finite() || *v < min || *v > max {
                return Err(ParamError::OutOfRange {
                    name: name.to_string(),
                    value: *v,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Strategy configuration as served by `GET /api/strategy-config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    #[serde(default)]
    pub parameters: BTreeMap<String, StrategyParameter>,
    #[serde(with = "wire_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl StrategyConfig {
    /// Replace a parameter's value after type and range checks.
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> Result<(), ParamError> {
        let param = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        param.check(name, &value)?;
        param.value = value;
        Ok(())
    }

    /// Parse `input` according to the parameter's declared type, then set it.
    pub fn set_parameter_str(&mut self, name: &str, input: &str) -> Result<(), ParamError> {
        let kind = self
            .parameters
            .get(name)
            .map(StrategyParameter::kind)
            .ok_or_else(|| ParamError::UnknownParameter(name.to_string()))?;
        let invalid = || ParamError::InvalidInput {
            name: name.to_string(),
            input: input.to_string(),
            expected: kind,
        };
        let value = match kind {
            ParamKind::Number => ParamValue::Number(input.trim().parse().map_err(|_| invalid())?),
            ParamKind::Boolean => match input.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => ParamValue::Boolean(true),
                "false" | "no" | "off" | "0" => ParamValue::Boolean(false),
                _ => return Err(invalid()),
            },
            ParamKind::String => ParamValue::String(input.to_string()),
        };
        self.set_parameter(name, value)
    }

    /// Check every parameter against its own declaration.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.name.trim().is_empty() {
            return Err(ParamError::EmptyName);
        }
        for (name, param) in &self.parameters {
            param.check(name, &param.value)?;
        }
        Ok(())
    }
}
