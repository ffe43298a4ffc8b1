use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier the portal treats as "any month" / "any subject"
pub const ANY_ID: &str = "00000000-0000-0000-0000-000000000000";

/// A grading period used to scope estimate queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: String,
    pub name: String,
}

/// Grade tables an estimate response may contain.
///
/// The estimate payload itself stays untyped; this only names its keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradesTable {
    Period,
    Week,
}

impl GradesTable {
    pub fn key(self) -> &'static str {
        match self {
            GradesTable::Period => "periodGradesTable",
            GradesTable::Week => "weekGradesTable",
        }
    }

    /// Pick this table out of a raw estimate response
    pub fn select(self, estimate: &Value) -> Option<&Value> {
        estimate.get(self.key()).filter(|table| !table.is_null())
    }
}
