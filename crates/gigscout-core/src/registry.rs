// The fixed set of facets a browsing session can use
use std::collections::HashSet;
use std::sync::Arc;

use crate::descriptor::{
    DeliveryWindow, FilterDescriptor, FilterKind, RangeField, SelectField,
};
use crate::filter_state::FilterState;
use crate::{Error, Result};

/// Ids of the built-in marketplace facets
pub mod ids {
    pub const CATEGORY: &str = "category";
    pub const SELLER_LEVEL: &str = "sellerLevel";
    pub const BUDGET: &str = "budget";
    pub const DELIVERY_TIME: &str = "deliveryTime";
}

pub const CATEGORIES: &[&str] = &[
    "Graphics & Design",
    "Digital Marketing",
    "Writing & Translation",
    "Video & Animation",
    "Music & Audio",
    "Programming & Tech",
    "Business",
    "Lifestyle",
];

pub const SELLER_LEVELS: &[&str] = &["New Seller", "Level 1", "Level 2", "Top Rated"];

pub const DELIVERY_TIMES: &[&str] = &["Express 24H", "Up to 3 days", "Up to 7 days", "Anytime"];

pub const BUDGET_MIN: f64 = 0.0;
/// Top of the budget slider, shown as "$1k+"
pub const BUDGET_MAX: f64 = 1000.0;
pub const BUDGET_STEP: f64 = 50.0;

/// Ordered, immutable list of facets
///
/// Built once at startup and shared behind an `Arc`; every [`FilterState`]
/// keeps a handle to the registry it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRegistry {
    descriptors: Vec<FilterDescriptor>,
}

impl FilterRegistry {
    /// The facets the marketplace UI exposes
    pub fn gig_marketplace() -> Self {
        Self {
            descriptors: vec![
                FilterDescriptor::select(ids::CATEGORY, "Category", SelectField::Category, CATEGORIES),
                FilterDescriptor::select(
                    ids::SELLER_LEVEL,
                    "Seller level",
                    SelectField::SellerLevel,
                    SELLER_LEVELS,
                ),
                FilterDescriptor::range(
                    ids::BUDGET,
                    "Budget",
                    RangeField::Price,
                    BUDGET_MIN,
                    BUDGET_MAX,
                    BUDGET_STEP,
                ),
                FilterDescriptor::select(
                    ids::DELIVERY_TIME,
                    "Delivery time",
                    SelectField::Delivery,
                    DELIVERY_TIMES,
                ),
            ],
        }
    }

    /// Build a registry from externally declared descriptors, e.g. the config file
    pub fn from_descriptors(descriptors: Vec<FilterDescriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if descriptor.id.is_empty() {
                return Err(Error::ConfigError("filter id must not be empty".into()));
            }
            if !seen.insert(descriptor.id.as_str()) {
                return Err(Error::ConfigError(format!(
                    "duplicate filter id: {}",
                    descriptor.id
                )));
            }
            validate(descriptor)?;
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[FilterDescriptor] {
        &self.descriptors
    }

    pub fn get(&self, id: &str) -> Option<&FilterDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Every facet mapped to its default value
    pub fn default_state(self: &Arc<Self>) -> FilterState {
        FilterState::new(Arc::clone(self))
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::gig_marketplace()
    }
}

fn validate(descriptor: &FilterDescriptor) -> Result<()> {
    let invalid = |reason: String| Error::ConfigError(format!("filter {}: {}", descriptor.id, reason));

    match &descriptor.kind {
        FilterKind::Select {
            field,
            options,
            default,
        } => {
            if options.is_empty() {
                return Err(invalid("select filter needs at least one option".into()));
            }
            if !default.is_empty() && !options.contains(default) {
                return Err(invalid(format!("default {:?} is not one of the options", default)));
            }
            if *field == SelectField::Delivery {
                if let Some(bad) = options.iter().find(|o| DeliveryWindow::parse(o).is_none()) {
                    return Err(invalid(format!("cannot read a day limit from {:?}", bad)));
                }
            }
        }
        FilterKind::Range {
            min,
            max,
            step,
            default,
            ..
        } => {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(invalid(format!("bad bounds [{}, {}]", min, max)));
            }
            if !(*step > 0.0) {
                return Err(invalid(format!("step must be positive, got {}", step)));
            }
            if let Some(d) = default {
                if !(d.lo <= d.hi && d.lo >= *min && d.hi <= *max) {
                    return Err(invalid(format!("default {} outside [{}, {}]", d, min, max)));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FilterValue, RangeValue};

    #[test]
    fn test_marketplace_registry_order() {
        let registry = FilterRegistry::gig_marketplace();
        let ids: Vec<_> = registry.descriptors().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["category", "sellerLevel", "budget", "deliveryTime"]);
    }

    #[test]
    fn test_default_state_covers_every_descriptor() {
        let registry = Arc::new(FilterRegistry::gig_marketplace());
        let state = registry.default_state();

        assert_eq!(state.len(), registry.len());
        for descriptor in registry.descriptors() {
            assert_eq!(state.get(&descriptor.id), Some(&descriptor.default_value()));
        }
        assert_eq!(
            state.get(ids::BUDGET),
            Some(&FilterValue::Range(RangeValue::new(0.0, 1000.0)))
        );
    }

    #[test]
    fn test_from_descriptors_rejects_duplicates() {
        let result = FilterRegistry::from_descriptors(vec![
            FilterDescriptor::select("a", "A", SelectField::Category, &["x"]),
            FilterDescriptor::select("a", "A again", SelectField::SellerLevel, &["y"]),
        ]);
        assert!(matches!(result, Err(Error::ConfigError(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_from_descriptors_rejects_bad_range_default() {
        let mut budget = FilterDescriptor::range("budget", "Budget", RangeField::Price, 0.0, 100.0, 10.0);
        if let FilterKind::Range { default, .. } = &mut budget.kind {
            *default = Some(RangeValue::new(50.0, 150.0));
        }
        assert!(FilterRegistry::from_descriptors(vec![budget]).is_err());
    }

    #[test]
    fn test_from_descriptors_rejects_unparseable_delivery_option() {
        let delivery = FilterDescriptor::select("eta", "ETA", SelectField::Delivery, &["Up to 3 days", "Soonish"]);
        let err = FilterRegistry::from_descriptors(vec![delivery]).unwrap_err();
        assert!(err.to_string().contains("Soonish"));
    }

    #[test]
    fn test_from_descriptors_accepts_marketplace_set() {
        let registry = FilterRegistry::gig_marketplace();
        let rebuilt = FilterRegistry::from_descriptors(registry.descriptors().to_vec()).unwrap();
        assert_eq!(rebuilt, registry);
    }
}
