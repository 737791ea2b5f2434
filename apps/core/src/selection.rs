use serde::Serialize;
use tracing::debug;

use crate::domain::{ALL_BRANDS, ALL_MODELS, ALL_PROVINCES};
use crate::error::{DashboardError, Result};
use crate::region::RegionRegistry;

/// One selector's value: the "all" sentinel or a concrete vocabulary entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum FilterValue {
    #[default]
    All,
    Only(String),
}

impl FilterValue {
    /// Maps a raw selector value to a filter; the sentinel and blank mean `All`.
    pub fn from_choice(raw: &str, sentinel: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == sentinel {
            Self::All
        } else {
            Self::Only(raw.to_string())
        }
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value.as_str()),
        }
    }

    /// Display value, falling back to the sentinel.
    pub fn display<'a>(&'a self, sentinel: &'a str) -> &'a str {
        self.as_deref().unwrap_or(sentinel)
    }

    pub fn accepts(&self, value: &str) -> bool {
        self.as_deref().map_or(true, |selected| selected == value)
    }
}

/// Granularity of the map view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum DrillLevel {
    #[default]
    National,
    Province(String),
}

impl DrillLevel {
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::National => None,
            Self::Province(key) => Some(key.as_str()),
        }
    }

    pub fn label(&self) -> &str {
        self.key().unwrap_or(ALL_PROVINCES)
    }
}

/// Snapshot of every selector plus the drill level. Transitions build a new
/// one; nothing mutates a selection in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub brand: FilterValue,
    pub model: FilterValue,
    pub province: FilterValue,
    pub level: DrillLevel,
}

impl Selection {
    pub fn is_unfiltered(&self) -> bool {
        *self == Self::default()
    }

    pub fn brand_label(&self) -> &str {
        self.brand.display(ALL_BRANDS)
    }

    pub fn model_label(&self) -> &str {
        self.model.display(ALL_MODELS)
    }

    pub fn province_label(&self) -> &str {
        self.province.display(ALL_PROVINCES)
    }
}

/// What a map click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// A geographic feature (province outline).
    Geo,
    /// A marker or any other series item.
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ChooseBrand(String),
    ChooseModel(String),
    ChooseProvince(String),
    ClickRegion { name: String, target: ClickTarget },
    /// A brand picked from the brand index list.
    FocusBrand(String),
    /// Back to the national map; brand and model stay selected.
    Reset,
}

/// Applies `action` to `prior`, returning the next selection.
///
/// Province choices and region clicks are rejected with
/// [`DashboardError::UnmappedRegion`] when no map asset is registered for
/// the region; `prior` is untouched in that case.
pub fn transition(
    prior: &Selection,
    action: &Action,
    registry: &RegionRegistry,
) -> Result<Selection> {
    let next = match action {
        Action::ChooseBrand(raw) => Selection {
            brand: FilterValue::from_choice(raw, ALL_BRANDS),
            ..prior.clone()
        },
        Action::ChooseModel(raw) => Selection {
            model: FilterValue::from_choice(raw, ALL_MODELS),
            ..prior.clone()
        },
        Action::ChooseProvince(raw) => match FilterValue::from_choice(raw, ALL_PROVINCES) {
            FilterValue::All => Selection {
                province: FilterValue::All,
                level: DrillLevel::National,
                ..prior.clone()
            },
            FilterValue::Only(name) => {
                let key = resolve_region(registry, &name)?;
                Selection {
                    province: FilterValue::Only(registry.filter_name(&name)),
                    level: DrillLevel::Province(key),
                    ..prior.clone()
                }
            }
        },
        Action::ClickRegion {
            target: ClickTarget::Marker,
            ..
        } => prior.clone(),
        Action::ClickRegion {
            name,
            target: ClickTarget::Geo,
        } => {
            let key = resolve_region(registry, name)?;
            Selection {
                province: FilterValue::Only(registry.filter_name(name)),
                level: DrillLevel::Province(key),
                ..prior.clone()
            }
        }
        Action::FocusBrand(raw) => Selection {
            brand: FilterValue::from_choice(raw, ALL_BRANDS),
            model: FilterValue::All,
            ..prior.clone()
        },
        Action::Reset => Selection {
            province: FilterValue::All,
            level: DrillLevel::National,
            ..prior.clone()
        },
    };

    debug!(?action, level = next.level.label(), "selection transition");
    Ok(next)
}

fn resolve_region(registry: &RegionRegistry, name: &str) -> Result<String> {
    registry
        .resolve(name.trim())
        .ok_or_else(|| DashboardError::UnmappedRegion {
            region: name.trim().to_string(),
        })
}
