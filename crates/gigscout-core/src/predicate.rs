// Turning facet selections into listing predicates
use std::sync::Arc;

use tracing::{debug, error};

use crate::descriptor::{
    DeliveryWindow, FilterDescriptor, FilterKind, FilterValue, RangeField, RangeValue, SelectField,
};
use crate::filter_state::FilterState;
use crate::models::Listing;
use crate::registry::FilterRegistry;
use crate::{Error, Result};

/// String attribute compared by a select facet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Category,
    SellerLevel,
}

impl TextField {
    fn read<'a>(&self, listing: &'a Listing) -> &'a str {
        match self {
            TextField::Category => &listing.category,
            TextField::SellerLevel => &listing.seller_level,
        }
    }
}

/// A single test over one listing
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Exact, case-sensitive string match
    Equals { field: TextField, value: String },
    /// `delivery_days <= days`
    DeliveredWithin { days: u32 },
    /// `lo <= value`, plus `value <= hi` when the top is bounded
    InRange {
        field: RangeField,
        lo: f64,
        hi: Option<f64>,
    },
}

impl Predicate {
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Predicate::Equals { field, value } => field.read(listing) == value,
            Predicate::DeliveredWithin { days } => listing.delivery_days <= *days,
            Predicate::InRange { field, lo, hi } => {
                let v = match field {
                    RangeField::Price => listing.price,
                    RangeField::DeliveryDays => f64::from(listing.delivery_days),
                };
                *lo <= v && hi.map_or(true, |hi| v <= hi)
            }
        }
    }
}

/// Conjunction of the predicates of every active facet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledFilter {
    predicates: Vec<Predicate>,
}

impl CompiledFilter {
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// True when nothing is filtered out
    pub fn is_pass_all(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.predicates.iter().all(|p| p.matches(listing))
    }

    /// Matching listings in their original order
    pub fn filter<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }

    /// Indices of matching listings, ascending
    pub fn positions(&self, listings: &[Listing]) -> Vec<usize> {
        listings
            .iter()
            .enumerate()
            .filter(|(_, l)| self.matches(l))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn count(&self, listings: &[Listing]) -> usize {
        listings.iter().filter(|l| self.matches(l)).count()
    }
}

/// Applies filter states built from one registry
#[derive(Debug, Clone)]
pub struct PredicateEngine {
    registry: Arc<FilterRegistry>,
}

impl PredicateEngine {
    pub fn new(registry: Arc<FilterRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Build the combined predicate for `state`
    ///
    /// Fails with `UnknownFilter` when the state's ids do not line up with
    /// this engine's registry. That only happens when states from different
    /// registries get mixed up, so it is logged loudly.
    pub fn compile(&self, state: &FilterState) -> Result<CompiledFilter> {
        if let Some(stray) = state.values().keys().find(|id| !self.registry.contains(id)) {
            error!("filter state references unregistered filter {}", stray);
            return Err(Error::UnknownFilter(stray.clone()));
        }

        let mut predicates = Vec::new();
        for descriptor in self.registry.descriptors() {
            let value = state.get(&descriptor.id).ok_or_else(|| {
                error!("filter state is missing registered filter {}", descriptor.id);
                Error::UnknownFilter(descriptor.id.clone())
            })?;

            if descriptor.is_inert(value) {
                continue;
            }
            if let Some(predicate) = build_predicate(descriptor, value)? {
                predicates.push(predicate);
            }
        }

        debug!("compiled {} active predicates", predicates.len());
        Ok(CompiledFilter { predicates })
    }

    /// Listings passing every active facet, order preserved
    pub fn apply<'a>(&self, listings: &'a [Listing], state: &FilterState) -> Result<Vec<&'a Listing>> {
        Ok(self.compile(state)?.filter(listings))
    }
}

fn build_predicate(descriptor: &FilterDescriptor, value: &FilterValue) -> Result<Option<Predicate>> {
    let mismatch = || Error::InvalidFilterValue {
        id: descriptor.id.clone(),
        value: value.to_string(),
    };

    match &descriptor.kind {
        FilterKind::Select { field, .. } => {
            let selected = value.as_select().ok_or_else(mismatch)?;
            select_predicate(*field, selected).ok_or_else(mismatch)
        }
        FilterKind::Range { field, max, .. } => {
            let range = value.as_range().ok_or_else(mismatch)?;
            Ok(Some(range_predicate(*field, *max, range)))
        }
    }
}

/// `None` in the outer option means the label could not be understood
fn select_predicate(field: SelectField, selected: &str) -> Option<Option<Predicate>> {
    let equals = |field| Predicate::Equals {
        field,
        value: selected.to_string(),
    };

    match field {
        SelectField::Category => Some(Some(equals(TextField::Category))),
        SelectField::SellerLevel => Some(Some(equals(TextField::SellerLevel))),
        SelectField::Delivery => match DeliveryWindow::parse(selected)? {
            DeliveryWindow::Within(days) => Some(Some(Predicate::DeliveredWithin { days })),
            DeliveryWindow::Anytime => Some(None),
        },
    }
}

/// The declared max is a "+" sentinel: selecting it leaves the top open
fn range_predicate(field: RangeField, declared_max: f64, range: RangeValue) -> Predicate {
    let hi = if range.hi >= declared_max { None } else { Some(range.hi) };
    Predicate::InRange {
        field,
        lo: range.lo,
        hi,
    }
}
