use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `(vendor, product)` pair read from the list file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleItem {
    pub vendor: String,
    pub product: String,
}

impl SampleItem {
    pub fn new(vendor: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
        }
    }
}

/// Change categories keyed by path (`root['key'][0]`).
///
/// Every map is ordered so two reports for the same input serialize the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffReport {
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub values_changed: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub type_changes: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub dictionary_item_added: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub dictionary_item_removed: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub iterable_item_added: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub iterable_item_removed: Map<String, Value>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.values_changed.is_empty()
            && self.type_changes.is_empty()
            && self.dictionary_item_added.is_empty()
            && self.dictionary_item_removed.is_empty()
            && self.iterable_item_added.is_empty()
            && self.iterable_item_removed.is_empty()
    }

    /// Total number of reported paths across all categories.
    pub fn len(&self) -> usize {
        self.values_changed.len()
            + self.type_changes.len()
            + self.dictionary_item_added.len()
            + self.dictionary_item_removed.len()
            + self.iterable_item_added.len()
            + self.iterable_item_removed.len()
    }
}

/// Result of comparing one sampled pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    Match,
    Mismatch(DiffReport),
    TimedOut,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub sampled: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub timed_out: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &CompareOutcome) {
        match outcome {
            CompareOutcome::Match => self.matched += 1,
            CompareOutcome::Mismatch(_) => self.mismatched += 1,
            CompareOutcome::TimedOut => self.timed_out += 1,
        }
    }

    pub fn completed(&self) -> usize {
        self.matched + self.mismatched + self.timed_out
    }
}

/// Which lookup endpoint family is being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cpes,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Cpes => "cpes",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
