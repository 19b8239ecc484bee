//! Zodiac Signs
//!
//! Signs are encoded in SKUs as fixed three letter codes (`TEE-ARI-M`, `YTH-LEO-S`, ...).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not one of the twelve sign codes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown zodiac sign code: {0}")]
pub struct UnknownSign(pub String);

/// One of the twelve zodiac signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ZodiacSign {
    /// Aries
    Aries,
    /// Taurus
    Taurus,
    /// Gemini
    Gemini,
    /// Cancer
    Cancer,
    /// Leo
    Leo,
    /// Virgo
    Virgo,
    /// Libra
    Libra,
    /// Scorpio
    Scorpio,
    /// Sagittarius
    Sagittarius,
    /// Capricorn
    Capricorn,
    /// Aquarius
    Aquarius,
    /// Pisces
    Pisces,
}

impl ZodiacSign {
    /// All signs in calendar order, starting with Aries.
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// The upper-case three letter SKU code for this sign.
    pub const fn code(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "ARI",
            ZodiacSign::Taurus => "TAU",
            ZodiacSign::Gemini => "GEM",
            ZodiacSign::Cancer => "CAN",
            ZodiacSign::Leo => "LEO",
            ZodiacSign::Virgo => "VIR",
            ZodiacSign::Libra => "LIB",
            ZodiacSign::Scorpio => "SCO",
            ZodiacSign::Sagittarius => "SAG",
            ZodiacSign::Capricorn => "CAP",
            ZodiacSign::Aquarius => "AQU",
            ZodiacSign::Pisces => "PIS",
        }
    }

    /// Human readable sign name.
    pub const fn name(self) -> &'static str {
        match self {
            ZodiacSign::Aries => "Aries",
            ZodiacSign::Taurus => "Taurus",
            ZodiacSign::Gemini => "Gemini",
            ZodiacSign::Cancer => "Cancer",
            ZodiacSign::Leo => "Leo",
            ZodiacSign::Virgo => "Virgo",
            ZodiacSign::Libra => "Libra",
            ZodiacSign::Scorpio => "Scorpio",
            ZodiacSign::Sagittarius => "Sagittarius",
            ZodiacSign::Capricorn => "Capricorn",
            ZodiacSign::Aquarius => "Aquarius",
            ZodiacSign::Pisces => "Pisces",
        }
    }

    /// Find the sign whose code occurs leftmost in `sku`, ignoring case.
    pub fn from_sku(sku: &str) -> Option<Self> {
        let upper = sku.to_ascii_uppercase();

        Self::ALL
            .iter()
            .filter_map(|sign| upper.find(sign.code()).map(|pos| (pos, *sign)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, sign)| sign)
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ZodiacSign {
    type Err = UnknownSign;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        Self::ALL
            .iter()
            .find(|sign| {
                sign.code().eq_ignore_ascii_case(trimmed) || sign.name().eq_ignore_ascii_case(trimmed)
            })
            .copied()
            .ok_or_else(|| UnknownSign(s.to_string()))
    }
}

impl From<ZodiacSign> for String {
    fn from(sign: ZodiacSign) -> Self {
        sign.code().to_string()
    }
}

impl TryFrom<String> for ZodiacSign {
    type Error = UnknownSign;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn from_sku_matches_embedded_code() {
        assert_eq!(ZodiacSign::from_sku("TEE-ARI-M"), Some(ZodiacSign::Aries));
        assert_eq!(ZodiacSign::from_sku("yth-pis-s"), Some(ZodiacSign::Pisces));
    }

    #[test]
    fn from_sku_leftmost_code_wins() {
        // LEO appears before ARI even though Aries comes first in calendar order.
        assert_eq!(ZodiacSign::from_sku("LEO-ARI"), Some(ZodiacSign::Leo));
    }

    #[test]
    fn from_sku_without_code_is_none() {
        assert_eq!(ZodiacSign::from_sku("TEE-BLANK-M"), None);
        assert_eq!(ZodiacSign::from_sku(""), None);
    }

    #[test]
    fn parses_codes_and_names() -> TestResult {
        assert_eq!("sco".parse::<ZodiacSign>()?, ZodiacSign::Scorpio);
        assert_eq!("Capricorn".parse::<ZodiacSign>()?, ZodiacSign::Capricorn);
        assert!("OPH".parse::<ZodiacSign>().is_err());

        Ok(())
    }

    #[test]
    fn serializes_as_code() -> TestResult {
        assert_eq!(serde_json::to_string(&ZodiacSign::Gemini)?, "\"GEM\"");
        assert_eq!(
            serde_json::from_str::<ZodiacSign>("\"AQU\"")?,
            ZodiacSign::Aquarius
        );

        Ok(())
    }
}
