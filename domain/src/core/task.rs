//! Data domain and task mode value objects

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The kind of data an explainer operates on (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataDomain {
    Tabular,
    Text,
    Image,
    Timeseries,
}

impl DataDomain {
    pub const ALL: [DataDomain; 4] = [
        DataDomain::Tabular,
        DataDomain::Text,
        DataDomain::Image,
        DataDomain::Timeseries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataDomain::Tabular => "tabular",
            DataDomain::Text => "text",
            DataDomain::Image => "image",
            DataDomain::Timeseries => "timeseries",
        }
    }
}

impl std::fmt::Display for DataDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DataDomain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tabular" => Ok(DataDomain::Tabular),
            "text" | "nlp" => Ok(DataDomain::Text),
            "image" | "vision" => Ok(DataDomain::Image),
            "timeseries" | "time_series" => Ok(DataDomain::Timeseries),
            other => Err(DomainError::UnknownDomain(other.to_string())),
        }
    }
}

/// The prediction task the explained model solves (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskMode {
    Classification,
    Regression,
}

impl TaskMode {
    pub const ALL: [TaskMode; 2] = [TaskMode::Classification, TaskMode::Regression];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskMode::Classification => "classification",
            TaskMode::Regression => "regression",
        }
    }

    pub fn is_classification(&self) -> bool {
        matches!(self, TaskMode::Classification)
    }
}

impl std::fmt::Display for TaskMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classification" => Ok(TaskMode::Classification),
            "regression" => Ok(TaskMode::Regression),
            other => Err(DomainError::UnknownMode(other.to_string())),
        }
    }
}
