// Current facet selections - an immutable value, every change yields a new one
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::descriptor::{FilterKind, FilterValue, RangeValue};
use crate::registry::FilterRegistry;
use crate::{Error, Result};

/// Mapping of every registry id to its current value
///
/// The key set always equals the registry's id set: states only come from
/// [`FilterRegistry::default_state`] and the validated transitions below.
#[derive(Debug, Clone)]
pub struct FilterState {
    registry: Arc<FilterRegistry>,
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub(crate) fn new(registry: Arc<FilterRegistry>) -> Self {
        let values = registry
            .descriptors()
            .iter()
            .map(|d| (d.id.clone(), d.default_value()))
            .collect();

        Self { registry, values }
    }

    /// Return a copy with `id` set to `value`
    ///
    /// Select values must be `""` or one of the declared options. Range
    /// values are clamped into bounds and reordered without complaint, since
    /// a slider drag can briefly produce `hi < lo` or overshoot.
    pub fn set_value(&self, id: &str, value: impl Into<FilterValue>) -> Result<FilterState> {
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| Error::UnknownFilter(id.to_string()))?;
        let value = value.into();

        let normalized = match (&descriptor.kind, value) {
            (FilterKind::Select { options, .. }, FilterValue::Select(selected)) => {
                if !selected.is_empty() && !options.contains(&selected) {
                    return Err(Error::InvalidFilterValue {
                        id: id.to_string(),
                        value: selected,
                    });
                }
                FilterValue::Select(selected)
            }
            (FilterKind::Range { min, max, .. }, FilterValue::Range(requested)) => {
                FilterValue::Range(clamp_range(*min, *max, requested))
            }
            (_, mismatched) => {
                return Err(Error::InvalidFilterValue {
                    id: id.to_string(),
                    value: mismatched.to_string(),
                });
            }
        };

        debug!("filter {} -> {}", id, normalized);
        let mut next = self.clone();
        next.values.insert(id.to_string(), normalized);
        Ok(next)
    }

    /// Back to the registry defaults
    pub fn reset(&self) -> FilterState {
        self.registry.default_state()
    }

    pub fn get(&self, id: &str) -> Option<&FilterValue> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Id/value pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> + '_ {
        self.registry
            .descriptors()
            .iter()
            .filter_map(move |d| self.values.get(&d.id).map(|v| (d.id.as_str(), v)))
    }

    /// Ids whose value actually narrows the result
    pub fn active_ids(&self) -> Vec<&str> {
        self.registry
            .descriptors()
            .iter()
            .filter(|d| self.values.get(&d.id).is_some_and(|v| !d.is_inert(v)))
            .map(|d| d.id.as_str())
            .collect()
    }

    pub fn is_default(&self) -> bool {
        self.registry
            .descriptors()
            .iter()
            .all(|d| self.values.get(&d.id) == Some(&d.default_value()))
    }

    /// Raw access for the predicate engine, which checks ids itself
    pub(crate) fn values(&self) -> &BTreeMap<String, FilterValue> {
        &self.values
    }
}

/// Two states are the same when every id maps to an equal value
impl PartialEq for FilterState {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

fn clamp_range(min: f64, max: f64, requested: RangeValue) -> RangeValue {
    let lo = if requested.lo.is_nan() { min } else { requested.lo.clamp(min, max) };
    let hi = if requested.hi.is_nan() { max } else { requested.hi.clamp(min, max) };

    if lo <= hi {
        RangeValue::new(lo, hi)
    } else {
        RangeValue::new(hi, lo)
    }
}
