// Facet declarations: what can be filtered and what values are legal
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing attribute read by a `select` facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectField {
    Category,
    SellerLevel,
    /// Option labels map onto a maximum number of delivery days
    Delivery,
}

/// Numeric listing attribute read by a `range` facet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeField {
    Price,
    DeliveryDays,
}

/// Closed numeric interval, written as `[lo, hi]` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct RangeValue {
    pub lo: f64,
    pub hi: f64,
}

impl RangeValue {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }
}

impl From<[f64; 2]> for RangeValue {
    fn from([lo, hi]: [f64; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<RangeValue> for [f64; 2] {
    fn from(v: RangeValue) -> Self {
        [v.lo, v.hi]
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

/// Current value of one facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Select(String),
    Range(RangeValue),
}

impl FilterValue {
    pub fn as_select(&self) -> Option<&str> {
        match self {
            FilterValue::Select(s) => Some(s),
            FilterValue::Range(_) => None,
        }
    }

    pub fn as_range(&self) -> Option<RangeValue> {
        match self {
            FilterValue::Range(r) => Some(*r),
            FilterValue::Select(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Select(s) => write!(f, "{}", s),
            FilterValue::Range(r) => write!(f, "{}", r),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::Select(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::Select(s)
    }
}

impl From<RangeValue> for FilterValue {
    fn from(r: RangeValue) -> Self {
        FilterValue::Range(r)
    }
}

impl From<(f64, f64)> for FilterValue {
    fn from((lo, hi): (f64, f64)) -> Self {
        FilterValue::Range(RangeValue { lo, hi })
    }
}

impl From<[f64; 2]> for FilterValue {
    fn from(pair: [f64; 2]) -> Self {
        FilterValue::Range(pair.into())
    }
}

/// Shape of a facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterKind {
    Select {
        field: SelectField,
        options: Vec<String>,
        /// `""` means nothing selected
        #[serde(default)]
        default: String,
    },
    Range {
        field: RangeField,
        min: f64,
        max: f64,
        step: f64,
        /// Defaults to the full `[min, max]` span
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<RangeValue>,
    },
}

/// One named, independently selectable facet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FilterKind,
}

impl FilterDescriptor {
    pub fn select(id: &str, label: &str, field: SelectField, options: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: Some(label.to_string()),
            kind: FilterKind::Select {
                field,
                options: options.iter().map(|o| o.to_string()).collect(),
                default: String::new(),
            },
        }
    }

    pub fn range(id: &str, label: &str, field: RangeField, min: f64, max: f64, step: f64) -> Self {
        Self {
            id: id.to_string(),
            label: Some(label.to_string()),
            kind: FilterKind::Range {
                field,
                min,
                max,
                step,
                default: None,
            },
        }
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn default_value(&self) -> FilterValue {
        match &self.kind {
            FilterKind::Select { default, .. } => FilterValue::Select(default.clone()),
            FilterKind::Range {
                min, max, default, ..
            } => FilterValue::Range(default.unwrap_or(RangeValue::new(*min, *max))),
        }
    }

    /// The value under which this facet filters nothing out
    pub fn inert_value(&self) -> FilterValue {
        match &self.kind {
            FilterKind::Select { .. } => FilterValue::Select(String::new()),
            FilterKind::Range { min, max, .. } => FilterValue::Range(RangeValue::new(*min, *max)),
        }
    }

    /// True for the inert value, and for a delivery option that means "Anytime"
    pub fn is_inert(&self, value: &FilterValue) -> bool {
        if *value == self.inert_value() {
            return true;
        }
        match (&self.kind, value) {
            (
                FilterKind::Select {
                    field: SelectField::Delivery,
                    ..
                },
                FilterValue::Select(label),
            ) => DeliveryWindow::parse(label) == Some(DeliveryWindow::Anytime),
            _ => false,
        }
    }
}

/// Delivery-time option decoded into a day threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryWindow {
    Within(u32),
    Anytime,
}

impl DeliveryWindow {
    /// Understands "Express 24H", "Anytime" and "Up to N days", case-insensitively
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();

        match normalized.as_str() {
            "anytime" => return Some(DeliveryWindow::Anytime),
            "express 24h" => return Some(DeliveryWindow::Within(1)),
            _ => {}
        }

        let rest = normalized.strip_prefix("up to ")?;
        let mut words = rest.split_whitespace();
        let days = words.next()?.parse::<u32>().ok()?;
        match words.next() {
            Some("day") | Some("days") if words.next().is_none() => Some(DeliveryWindow::Within(days)),
            _ => None,
        }
    }
}
