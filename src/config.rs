//! Promotion Configuration
//!
//! Promotions are configured in YAML. Omitted fields take the default for their rule,
//! and the order of entries is the evaluation (and tie-break) order.
//!
//! ```yaml
//! currency: USD
//! minimum_unit_amount: 50
//! promotions:
//!   - type: duo
//!     percent: 10%
//!   - type: family_constellation
//!     code: FAMILY15
//!   - type: poster_add_on
//!   - type: trinity
//!     enabled: false
//! ```

use std::{fs, path::Path, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::{AUD, CAD, Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    checkout::{CheckoutOptions, DEFAULT_MINIMUM_UNIT_AMOUNT},
    discounts::DiscountCode,
    promotions::{
        DuoPromotion, FamilyConstellationPromotion, PosterAddOnPromotion, Promotion,
        PromotionSet, TrinityPromotion,
    },
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Invalid percentage format or value
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Negative minimum unit amount
    #[error("Minimum unit amount must not be negative, got {0}")]
    InvalidMinimum(i64),
}

/// Configuration file as written in YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// ISO currency code
    #[serde(default)]
    pub currency: Option<String>,

    /// Minimum chargeable unit amount in minor units
    #[serde(default)]
    pub minimum_unit_amount: Option<i64>,

    /// Promotions in evaluation order; omitted means the default set
    #[serde(default)]
    pub promotions: Option<Vec<PromotionEntry>>,
}

/// A promotion entry, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionEntry {
    /// Duo promotion
    Duo(RuleEntry),

    /// Family constellation promotion; `code` is the per-sign code prefix
    FamilyConstellation(RuleEntry),

    /// Poster add-on promotion
    PosterAddOn(RuleEntry),

    /// Trinity promotion
    Trinity(RuleEntry),
}

/// Settings shared by every rule.
#[derive(Debug, Deserialize)]
pub struct RuleEntry {
    /// Discount code
    #[serde(default)]
    pub code: Option<String>,

    /// Label shown to the shopper
    #[serde(default)]
    pub label: Option<String>,

    /// Rate, e.g. `15%` or `0.15`
    #[serde(default)]
    pub percent: Option<PercentValue>,

    /// Whether the rule is evaluated
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// A percentage written as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PercentValue {
    /// Fraction, e.g. `0.15`
    Number(f64),

    /// `"15%"` or `"0.15"`
    Text(String),
}

impl PercentValue {
    /// Parse into a percentage between 0% and 100%.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPercentage`] for unparsable or out of range values.
    pub fn parse(&self) -> Result<Percentage, ConfigError> {
        match self {
            PercentValue::Number(value) => parse_percentage(&value.to_string()),
            PercentValue::Text(text) => parse_percentage(text),
        }
    }
}

/// Parse a percentage string (`"15%"` or `"0.15"`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPercentage`] if the string cannot be parsed or the
/// value falls outside 0% to 100%.
pub fn parse_percentage(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent_str) = trimmed.strip_suffix('%') {
        Decimal::from_str(percent_str.trim())
            .map(|value| value / Decimal::ONE_HUNDRED)
            .map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
    } else {
        Decimal::from_str(trimmed).map_err(|_err| ConfigError::InvalidPercentage(s.to_string()))?
    };

    if fraction < Decimal::ZERO || fraction > Decimal::ONE {
        return Err(ConfigError::InvalidPercentage(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}

/// Look up a supported currency by ISO code.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownCurrency`] for unsupported codes.
pub fn parse_currency(code: &str) -> Result<&'static Currency, ConfigError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "USD" => Ok(USD),
        "GBP" => Ok(GBP),
        "EUR" => Ok(EUR),
        "CAD" => Ok(CAD),
        "AUD" => Ok(AUD),
        _ => Err(ConfigError::UnknownCurrency(code.to_string())),
    }
}

/// Resolved promotion configuration.
#[derive(Debug, Clone)]
pub struct PromotionConfig {
    /// Store currency
    pub currency: &'static Currency,

    /// Minimum chargeable unit amount in minor units
    pub minimum_unit_amount: i64,

    /// Enabled promotions in evaluation order
    pub promotions: PromotionSet,
}

impl PromotionConfig {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the YAML is invalid or a value is out of range.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_norway::from_str(yaml)?;

        Self::try_from(file)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml_str(&contents)
    }

    /// Checkout options for this configuration.
    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions {
            currency: self.currency,
            minimum_unit_amount: self.minimum_unit_amount,
        }
    }
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            currency: USD,
            minimum_unit_amount: DEFAULT_MINIMUM_UNIT_AMOUNT,
            promotions: PromotionSet::default(),
        }
    }
}

impl TryFrom<ConfigFile> for PromotionConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
        let currency = file
            .currency
            .as_deref()
            .map_or(Ok(USD), parse_currency)?;

        let minimum_unit_amount = file
            .minimum_unit_amount
            .unwrap_or(DEFAULT_MINIMUM_UNIT_AMOUNT);

        if minimum_unit_amount < 0 {
            return Err(ConfigError::InvalidMinimum(minimum_unit_amount));
        }

        let promotions = match file.promotions {
            Some(entries) => {
                let mut promotions = Vec::with_capacity(entries.len());

                for entry in entries {
                    if let Some(promotion) = entry.into_promotion()? {
                        promotions.push(promotion);
                    }
                }

                PromotionSet::new(promotions)
            }
            None => PromotionSet::default(),
        };

        Ok(Self {
            currency,
            minimum_unit_amount,
            promotions,
        })
    }
}

impl PromotionEntry {
    /// Convert to a promotion, or `None` when the entry is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPercentage`] if the rate is invalid.
    pub fn into_promotion(self) -> Result<Option<Promotion>, ConfigError> {
        let promotion = match self {
            PromotionEntry::Duo(entry) => {
                if !entry.enabled {
                    return Ok(None);
                }

                let defaults = DuoPromotion::default();
                let code = entry.code.map_or_else(|| defaults.code().clone(), DiscountCode::new);

                Promotion::Duo(DuoPromotion::new(
                    code,
                    entry.label.unwrap_or_else(|| defaults.label().to_string()),
                    resolve_percent(entry.percent.as_ref(), defaults.percent())?,
                ))
            }
            PromotionEntry::FamilyConstellation(entry) => {
                if !entry.enabled {
                    return Ok(None);
                }

                let defaults = FamilyConstellationPromotion::default();

                Promotion::FamilyConstellation(FamilyConstellationPromotion::new(
                    entry
                        .code
                        .unwrap_or_else(|| defaults.code_prefix().to_string()),
                    entry.label.unwrap_or_else(|| defaults.label().to_string()),
                    resolve_percent(entry.percent.as_ref(), defaults.percent())?,
                ))
            }
            PromotionEntry::PosterAddOn(entry) => {
                if !entry.enabled {
                    return Ok(None);
                }

                let defaults = PosterAddOnPromotion::default();
                let code = entry.code.map_or_else(|| defaults.code().clone(), DiscountCode::new);

                Promotion::PosterAddOn(PosterAddOnPromotion::new(
                    code,
                    entry.label.unwrap_or_else(|| defaults.label().to_string()),
                    resolve_percent(entry.percent.as_ref(), defaults.percent())?,
                ))
            }
            PromotionEntry::Trinity(entry) => {
                if !entry.enabled {
                    return Ok(None);
                }

                let defaults = TrinityPromotion::default();
                let code = entry.code.map_or_else(|| defaults.code().clone(), DiscountCode::new);

                Promotion::Trinity(TrinityPromotion::new(
                    code,
                    entry.label.unwrap_or_else(|| defaults.label().to_string()),
                    resolve_percent(entry.percent.as_ref(), defaults.percent())?,
                ))
            }
        };

        Ok(Some(promotion))
    }
}

fn resolve_percent(
    value: Option<&PercentValue>,
    default: Percentage,
) -> Result<Percentage, ConfigError> {
    value.map_or(Ok(default), PercentValue::parse)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{cart::CartLine, discounts::percent_of_minor};

    use super::*;

    fn codes(config: &PromotionConfig, lines: &[CartLine]) -> Vec<String> {
        config
            .promotions
            .evaluate(lines)
            .into_iter()
            .map(|discount| discount.code.to_string())
            .collect()
    }

    fn stacked_cart() -> Vec<CartLine> {
        vec![
            CartLine::new("TEE-ARI-M", "Aries Tee", 4000, 1),
            CartLine::new("TEE-TAU-M", "Taurus Tee", 3000, 1),
            CartLine::new("YTH-ARI-S", "Aries Youth Tee", 2500, 1),
            CartLine::new("POSTER-ARI", "Aries Print", 2000, 1),
        ]
    }

    #[test]
    fn empty_yaml_is_default() -> TestResult {
        let config = PromotionConfig::from_yaml_str("{}")?;

        assert_eq!(config.currency, USD);
        assert_eq!(config.minimum_unit_amount, 50);
        assert_eq!(
            codes(&config, &stacked_cart()),
            vec!["DUO10", "FAMILY15-ARI", "POSTER20", "TRINITY15"]
        );

        Ok(())
    }

    #[test]
    fn disabled_rules_are_skipped() -> TestResult {
        let config = PromotionConfig::from_yaml_str(
            "
promotions:
  - type: duo
  - type: family_constellation
    enabled: false
  - type: poster_add_on
  - type: trinity
    enabled: false
",
        )?;

        assert_eq!(codes(&config, &stacked_cart()), vec!["DUO10", "POSTER20"]);

        Ok(())
    }

    #[test]
    fn overrides_code_label_and_rate() -> TestResult {
        let config = PromotionConfig::from_yaml_str(
            "
currency: gbp
minimum_unit_amount: 30
promotions:
  - type: trinity
    code: THREE20
    label: Three for less
    percent: 20%
  - type: family_constellation
    code: KIN
    label: Kin bundle
    percent: 0.5
",
        )?;

        let discounts = config.promotions.evaluate(&stacked_cart());
        let summary: Vec<(&str, &str, i64)> = discounts
            .iter()
            .map(|d| (d.code.as_str(), d.label.as_str(), d.amount_minor))
            .collect();

        assert_eq!(config.currency, GBP);
        assert_eq!(config.checkout_options().minimum_unit_amount, 30);
        assert_eq!(
            summary,
            vec![
                ("THREE20", "Three for less", 400),
                ("KIN-ARI", "Kin bundle (Aries)", 1250),
            ]
        );

        Ok(())
    }

    #[test]
    fn parse_percentage_formats() -> TestResult {
        assert_eq!(percent_of_minor(&parse_percentage("15%")?, 1000)?, 150);
        assert_eq!(percent_of_minor(&parse_percentage(" 0.15 ")?, 1000)?, 150);
        assert_eq!(percent_of_minor(&parse_percentage("12.5%")?, 1000)?, 125);

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_bad_values() {
        for bad in ["abc", "150%", "-0.1", "1.5", ""] {
            assert!(
                matches!(parse_percentage(bad), Err(ConfigError::InvalidPercentage(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let result = PromotionConfig::from_yaml_str("currency: XYZ");

        assert!(matches!(result, Err(ConfigError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[test]
    fn negative_minimum_is_rejected() {
        let result = PromotionConfig::from_yaml_str("minimum_unit_amount: -1");

        assert!(matches!(result, Err(ConfigError::InvalidMinimum(-1))));
    }

    #[test]
    fn unknown_promotion_type_is_yaml_error() {
        let result = PromotionConfig::from_yaml_str("promotions:\n  - type: bogo\n");

        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn from_path_reads_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("promotions.yml");
        fs::write(&path, "promotions:\n  - type: trinity\n")?;

        let config = PromotionConfig::from_path(&path)?;

        assert_eq!(config.promotions.len(), 1);

        Ok(())
    }
}
