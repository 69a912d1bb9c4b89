//! Historical match records and the feature schema used to read them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tennis_edge_core::odds::MarketOdds;

/// One historical match as consumed by the backtester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Match identifier.
    pub match_id: i64,
    /// Match date, used only for ordering.
    pub date: NaiveDate,
    /// Named numeric features. A missing name means the value is unknown.
    pub features: BTreeMap<String, f64>,
    /// `true` if player 1 won, `None` when the result is unknown.
    pub label: Option<bool>,
    /// Decimal odds on player 1.
    pub p1_odd: Option<f64>,
    /// Decimal odds on player 2.
    pub p2_odd: Option<f64>,
}

impl MatchRecord {
    /// Creates a record without features.
    #[must_use]
    pub fn new(
        match_id: i64,
        date: NaiveDate,
        label: Option<bool>,
        p1_odd: Option<f64>,
        p2_odd: Option<f64>,
    ) -> Self {
        Self {
            match_id,
            date,
            features: BTreeMap::new(),
            label,
            p1_odd,
            p2_odd,
        }
    }

    /// Adds or replaces a feature value.
    #[must_use]
    pub fn with_feature(mut self, name: impl Into<String>, value: f64) -> Self {
        self.features.insert(name.into(), value);
        self
    }

    /// Market odds, or `None` if either price is absent, zero or negative.
    #[must_use]
    pub fn market_odds(&self) -> Option<MarketOdds> {
        MarketOdds::from_optional(self.p1_odd, self.p2_odd)
    }
}

/// Ordered list of feature names the model is trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    /// Creates a schema from feature names in model order.
    #[must_use]
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Feature names in model order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the schema has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Extracts the ordered feature vector of a record.
    ///
    /// Missing or non-finite values are replaced by `fill` when given;
    /// otherwise the record yields `None`.
    #[must_use]
    pub fn extract(&self, record: &MatchRecord, fill: Option<f64>) -> Option<Vec<f64>> {
        self.names
            .iter()
            .map(|name| {
                record
                    .features
                    .get(name)
                    .copied()
                    .filter(|value| value.is_finite())
                    .or(fill)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> MatchRecord {
        MatchRecord::new(
            1,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Some(true),
            Some(1.8),
            Some(2.1),
        )
        .with_feature("elo_diff", 42.0)
        .with_feature("form_p1", 0.6)
    }

    #[test]
    fn extract_follows_schema_order() {
        let schema = FeatureSchema::new(["form_p1", "elo_diff"]);
        assert_eq!(schema.extract(&record(), None), Some(vec![0.6, 42.0]));
    }

    #[test]
    fn extract_missing_feature_without_fill_is_none() {
        let schema = FeatureSchema::new(["elo_diff", "h2h_p1"]);
        assert_eq!(schema.extract(&record(), None), None);
    }

    #[test]
    fn extract_missing_feature_uses_fill() {
        let schema = FeatureSchema::new(["elo_diff", "h2h_p1"]);
        assert_eq!(schema.extract(&record(), Some(0.0)), Some(vec![42.0, 0.0]));
    }

    #[test]
    fn extract_treats_nan_as_missing() {
        let schema = FeatureSchema::new(["elo_diff"]);
        let rec = record().with_feature("elo_diff", f64::NAN);
        assert_eq!(schema.extract(&rec, None), None);
    }

    #[test]
    fn market_odds_requires_both_valid_prices() {
        assert!(record().market_odds().is_some());

        let mut missing = record();
        missing.p2_odd = None;
        assert!(missing.market_odds().is_none());

        let mut zero = record();
        zero.p1_odd = Some(0.0);
        assert!(zero.market_odds().is_none());
    }
}
