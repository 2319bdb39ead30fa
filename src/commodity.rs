//! Commodities and their regional price series.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{validate_finite, validate_non_empty, validate_non_negative, ValidationError};
use crate::record::{Record, StoreKind};

/// Classification of commodities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommodityType {
    /// Fuels and energy carriers.
    Energy,
    /// Emissions and other environmental outputs.
    Environmental,
}

impl fmt::Display for CommodityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::Environmental => write!(f, "environmental"),
        }
    }
}

/// A single price observation, tagged with the region it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityPrice {
    /// Key of the region this observation belongs to.
    pub region_name: String,
    /// Time index (typically a model year).
    pub time: i64,
    /// Price in the commodity's `price_unit`.
    pub value: f64,
}

impl CommodityPrice {
    /// An observation of `value` in `region_name` at `time`.
    #[must_use]
    pub fn new(region_name: impl Into<String>, time: i64, value: f64) -> Self {
        Self {
            region_name: region_name.into(),
            time,
            value,
        }
    }
}

/// A commodity with its physical attributes and price series.
///
/// # Examples
///
/// ```
/// use muse_datastore::{Commodity, CommodityPrice, CommodityType};
///
/// let gas = Commodity::new("gas", CommodityType::Energy)
///     .with_price(CommodityPrice::new("R1", 2020, 10.0));
/// assert!(gas.references_region("R1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commodity {
    /// Unique commodity name (the store key).
    pub name: String,
    /// Classification.
    pub commodity_type: CommodityType,
    /// CO2 emitted per unit consumed.
    #[serde(default)]
    pub c_emission_factor_co2: f64,
    /// Energy content per unit.
    #[serde(default)]
    pub heat_rate: f64,
    /// Physical unit.
    #[serde(default)]
    pub unit: String,
    /// Price series, one entry per region and time.
    #[serde(default)]
    pub prices: Vec<CommodityPrice>,
    /// Unit of every price in `prices`.
    #[serde(default)]
    pub price_unit: String,
}

impl Commodity {
    /// A commodity with default physical attributes and no prices.
    #[must_use]
    pub fn new(name: impl Into<String>, commodity_type: CommodityType) -> Self {
        Self {
            name: name.into(),
            commodity_type,
            c_emission_factor_co2: 0.0,
            heat_rate: 1.0,
            unit: "PJ".to_string(),
            prices: Vec::new(),
            price_unit: "MUS$2010/PJ".to_string(),
        }
    }

    /// Append a price observation.
    #[must_use]
    pub fn with_price(mut self, price: CommodityPrice) -> Self {
        self.prices.push(price);
        self
    }

    /// True if any price observation is tagged with `region`.
    #[must_use]
    pub fn references_region(&self, region: &str) -> bool {
        self.prices.iter().any(|p| p.region_name == region)
    }

    /// Distinct region names referenced by the price series, in first-seen order.
    #[must_use]
    pub fn price_regions(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for price in &self.prices {
            if !out.contains(&price.region_name.as_str()) {
                out.push(&price.region_name);
            }
        }
        out
    }
}

impl Record for Commodity {
    const KIND: StoreKind = StoreKind::Commodity;

    fn key(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validate_non_empty("name", &self.name)?;
        validate_finite("c_emission_factor_co2", self.c_emission_factor_co2)?;
        validate_non_negative("heat_rate", self.heat_rate)?;
        for price in &self.prices {
            validate_non_empty("prices.region_name", &price.region_name)?;
            validate_finite("prices.value", price.value)?;
        }
        Ok(())
    }
}
