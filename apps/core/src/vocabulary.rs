use serde::{Deserialize, Serialize};

use crate::domain::{Record, ALL_BRANDS, ALL_MODELS, ALL_PROVINCES};
use crate::region::normalize_region_key;

/// Selector vocabularies. Each list starts with its "all" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterVocabulary {
    pub provinces: Vec<String>,
    pub brands: Vec<String>,
    pub models: Vec<String>,
}

/// Which selector a vocabulary value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Brand,
    Model,
    Province,
}

impl FilterKind {
    pub const fn sentinel(self) -> &'static str {
        match self {
            Self::Brand => ALL_BRANDS,
            Self::Model => ALL_MODELS,
            Self::Province => ALL_PROVINCES,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Brand => "Brand",
            Self::Model => "Model",
            Self::Province => "Province",
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Brand),
            1 => Some(Self::Model),
            2 => Some(Self::Province),
            _ => None,
        }
    }
}

/// A record value the vocabulary does not enumerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyGap {
    pub kind: FilterKind,
    pub value: String,
}

impl Default for FilterVocabulary {
    fn default() -> Self {
        Self::empty()
    }
}

impl FilterVocabulary {
    /// Sentinels only; used when no vocabulary could be loaded or derived.
    pub fn empty() -> Self {
        Self {
            provinces: vec![ALL_PROVINCES.to_string()],
            brands: vec![ALL_BRANDS.to_string()],
            models: vec![ALL_MODELS.to_string()],
        }
    }

    /// Builds the vocabulary from the records: provinces without their
    /// `省` suffix, everything deduplicated in first-seen order.
    pub fn from_records(records: &[Record]) -> Self {
        let mut vocabulary = Self::empty();

        for record in records {
            push_unique(
                &mut vocabulary.provinces,
                normalize_region_key(&record.province),
            );
            push_unique(&mut vocabulary.brands, &record.brand);
            push_unique(&mut vocabulary.models, &record.model);
        }

        vocabulary
    }

    /// Prepends any sentinel a file-provided vocabulary left out.
    #[must_use]
    pub fn with_sentinels(mut self) -> Self {
        for kind in [FilterKind::Brand, FilterKind::Model, FilterKind::Province] {
            let list = self.list_mut(kind);
            if list.first().map(String::as_str) != Some(kind.sentinel()) {
                list.retain(|value| value != kind.sentinel());
                list.insert(0, kind.sentinel().to_string());
            }
        }
        self
    }

    pub fn list(&self, kind: FilterKind) -> &[String] {
        match kind {
            FilterKind::Brand => &self.brands,
            FilterKind::Model => &self.models,
            FilterKind::Province => &self.provinces,
        }
    }

    fn list_mut(&mut self, kind: FilterKind) -> &mut Vec<String> {
        match kind {
            FilterKind::Brand => &mut self.brands,
            FilterKind::Model => &mut self.models,
            FilterKind::Province => &mut self.provinces,
        }
    }

    /// Province names without the sentinel, the set map assets are preloaded for.
    pub fn named_provinces(&self) -> &[String] {
        self.provinces.get(1..).unwrap_or_default()
    }

    /// Record values missing from the vocabulary.
    pub fn covers(&self, records: &[Record]) -> Vec<VocabularyGap> {
        let mut gaps: Vec<VocabularyGap> = Vec::new();
        let mut note = |kind: FilterKind, value: &str| {
            let known = self.list(kind).iter().any(|entry| entry == value);
            let reported = gaps
                .iter()
                .any(|gap| gap.kind == kind && gap.value == value);
            if !known && !reported {
                gaps.push(VocabularyGap {
                    kind,
                    value: value.to_string(),
                });
            }
        };

        for record in records {
            note(FilterKind::Brand, &record.brand);
            note(FilterKind::Model, &record.model);
            note(FilterKind::Province, normalize_region_key(&record.province));
        }

        gaps
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if value.is_empty() {
        return;
    }
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinates;

    fn record(brand: &str, model: &str, province: &str) -> Record {
        Record {
            hotel_name: format!("{brand} hotel"),
            brand: brand.to_string(),
            subbrand: None,
            model: model.to_string(),
            coordinates: Coordinates::new(113.0, 23.0),
            supply: 1,
            province: province.to_string(),
            city: String::new(),
            location: None,
        }
    }

    #[test]
    fn derives_vocabulary_in_first_seen_order() {
        let records = vec![
            record("A", "55X", "广东省"),
            record("B", "32Y", "北京"),
            record("A", "55X", "广东"),
        ];

        let vocabulary = FilterVocabulary::from_records(&records);

        assert_eq!(vocabulary.provinces, vec!["全国", "广东", "北京"]);
        assert_eq!(vocabulary.brands, vec!["所有品牌", "A", "B"]);
        assert_eq!(vocabulary.models, vec!["所有型号", "55X", "32Y"]);
        assert!(vocabulary.covers(&records).is_empty());
    }

    #[test]
    fn reports_values_missing_from_vocabulary() {
        let vocabulary = FilterVocabulary {
            provinces: vec!["全国".into(), "广东".into()],
            brands: vec!["所有品牌".into(), "A".into()],
            models: vec!["所有型号".into(), "55X".into()],
        };
        let records = vec![record("A", "55X", "广东省"), record("C", "55X", "湖南省")];

        let gaps = vocabulary.covers(&records);

        assert_eq!(
            gaps,
            vec![
                VocabularyGap {
                    kind: FilterKind::Brand,
                    value: "C".into()
                },
                VocabularyGap {
                    kind: FilterKind::Province,
                    value: "湖南".into()
                },
            ]
        );
    }

    #[test]
    fn restores_missing_sentinels() {
        let vocabulary = FilterVocabulary {
            provinces: vec!["广东".into(), "全国".into()],
            brands: vec!["所有品牌".into(), "A".into()],
            models: Vec::new(),
        }
        .with_sentinels();

        assert_eq!(vocabulary.provinces, vec!["全国", "广东"]);
        assert_eq!(vocabulary.brands, vec!["所有品牌", "A"]);
        assert_eq!(vocabulary.models, vec!["所有型号"]);
        assert_eq!(vocabulary.named_provinces(), ["广东".to_string()]);
    }
}
