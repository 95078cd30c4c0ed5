//! Externally observable key/value state: the last command sent and the
//! HTTP status it got back.

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

pub const LAST_COMMAND: &str = "last_command";
pub const LAST_STATUS: &str = "last_status";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VariableDefinition {
    pub id: &'static str,
    pub name: &'static str,
}

pub const VARIABLE_DEFINITIONS: &[VariableDefinition] = &[
    VariableDefinition {
        id: LAST_COMMAND,
        name: "Last Command Sent",
    },
    VariableDefinition {
        id: LAST_STATUS,
        name: "Last HTTP Status",
    },
];

/// Values reported after a completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedState {
    pub last_command: String,
    pub last_status: String,
}

impl ReportedState {
    pub fn new(query: impl Into<String>, status: u16) -> Self {
        Self {
            last_command: query.into(),
            last_status: format!("HTTP {status}"),
        }
    }

    pub fn into_pairs(self) -> [(&'static str, String); 2] {
        [
            (LAST_COMMAND, self.last_command),
            (LAST_STATUS, self.last_status),
        ]
    }
}

#[derive(Debug, Default)]
pub struct VariableStore {
    values: Mutex<IndexMap<String, String>>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every defined variable with an empty value.
    pub fn initialize(&self) {
        let mut values = self.values.lock();
        for def in VARIABLE_DEFINITIONS {
            values.insert(def.id.to_string(), String::new());
        }
    }

    /// Overwrite the given slots. Slots not named here keep their value.
    pub fn publish<K, V>(&self, updates: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut values = self.values.lock();
        for (key, value) in updates {
            values.insert(key.into(), value.into());
        }
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.values.lock().get(id).cloned()
    }

    pub fn snapshot(&self) -> IndexMap<String, String> {
        self.values.lock().clone()
    }
}
