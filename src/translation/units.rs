/*!
 * Imperial-to-metric unit conversion for localized text.
 *
 * Applied after translation and token restoration when the target language
 * localizes measurements. Recognizes the same five unit classes as the token
 * protector and rewrites them with metric values formatted for the target
 * locale (comma decimal separator).
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Unit-conversion ratio selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrecisionMode {
    /// Rounded ratios calibrated to common tabletop conversions (5 ft = 1,5 m)
    #[default]
    GameFriendly,

    /// SI-standard ratios
    Exact,
}

impl PrecisionMode {
    /// Stable single-character form used inside cache keys.
    pub fn cache_tag(self) -> &'static str {
        match self {
            Self::GameFriendly => "0",
            Self::Exact => "1",
        }
    }
}

struct Ratios {
    ft_to_m: f64,
    yd_to_m: f64,
    in_to_cm: f64,
    mi_to_km: f64,
    lb_to_kg: f64,
}

impl Ratios {
    fn for_mode(mode: PrecisionMode) -> Self {
        match mode {
            PrecisionMode::GameFriendly => Self {
                ft_to_m: 0.3,
                yd_to_m: 0.9,
                in_to_cm: 2.5,
                mi_to_km: 1.584,
                lb_to_kg: 0.5,
            },
            PrecisionMode::Exact => Self {
                ft_to_m: 0.3048,
                yd_to_m: 0.9144,
                in_to_cm: 2.54,
                mi_to_km: 1.609344,
                lb_to_kg: 0.45359237,
            },
        }
    }
}

static MILES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:mi|mile|miles)\.?\b").unwrap());
static YARDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:yd|yard|yards)\.?\b").unwrap());
static INCHES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:in|inch|inches)\.?\b").unwrap());
static FEET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:ft|feet|foot)\.?\b").unwrap());
static POUNDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:lb|lbs)\.?\b").unwrap());

/// Whether the target language's localization calls for metric units.
pub fn localizes_units(target_language: &str) -> bool {
    target_language.to_uppercase().starts_with("DE")
}

/// Rewrite imperial measures in `text` as metric equivalents.
///
/// Unit classes are processed miles, yards, inches, feet, pounds; the longer
/// and rarer unit names go first so the feet pattern cannot partially consume
/// a miles or yards measure.
pub fn convert(text: &str, mode: PrecisionMode) -> String {
    if text.is_empty() {
        return text.to_string();
    }

    let ratios = Ratios::for_mode(mode);

    let out = replace_measures(&MILES_RE, text, |n| {
        let km = n * ratios.mi_to_km;
        format!("{} km", format_number(km, if km < 10.0 { 3 } else { 2 }))
    });
    let out = replace_measures(&YARDS_RE, &out, |n| {
        format!("{} m", format_number(n * ratios.yd_to_m, 1))
    });
    let out = replace_measures(&INCHES_RE, &out, |n| {
        format!("{} cm", format_number(n * ratios.in_to_cm, 1))
    });
    let out = replace_measures(&FEET_RE, &out, |n| {
        format!("{} m", format_number(n * ratios.ft_to_m, 1))
    });
    replace_measures(&POUNDS_RE, &out, |n| {
        format!("{} kg", format_number(n * ratios.lb_to_kg, 1))
    })
}

fn replace_measures<F>(pattern: &Regex, text: &str, convert: F) -> String
where
    F: Fn(f64) -> String,
{
    pattern
        .replace_all(text, |caps: &Captures| match caps[1].parse::<f64>() {
            Ok(n) => convert(n),
            // Regex guarantees a numeric capture; keep the original on overflow
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Format a converted value for the target locale.
///
/// Rounds to `decimals` places, collapses a trailing zero fractional part to
/// an integer, and uses a comma as the decimal separator.
fn format_number(value: f64, decimals: usize) -> String {
    let scale = 10f64.powi(decimals as i32);
    let rounded = (value * scale).round() / scale;

    if (rounded - rounded.round()).abs() < 1e-9 {
        format!("{}", rounded.round() as i64)
    } else {
        format!("{:.*}", decimals, rounded).replace('.', ",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_fiveFeet_shouldBeOnePointFiveMeters() {
        assert_eq!(convert("5 ft.", PrecisionMode::GameFriendly), "1,5 m.");
        assert_eq!(convert("5 ft.", PrecisionMode::Exact), "1,5 m.");
    }

    #[test]
    fn test_convert_tenFeet_shouldCollapseToInteger() {
        // 10 * 0.3 = 3.0 and 10 * 0.3048 rounds to 3.0; both collapse to "3"
        assert_eq!(convert("10 ft.", PrecisionMode::GameFriendly), "3 m.");
        assert_eq!(convert("10 ft.", PrecisionMode::Exact), "3 m.");
    }

    #[test]
    fn test_convert_oneMile_shouldDifferByMode() {
        assert_eq!(convert("1 mi.", PrecisionMode::GameFriendly), "1,584 km.");
        assert_eq!(convert("1 mi.", PrecisionMode::Exact), "1,609 km.");
    }

    #[test]
    fn test_convert_largeMiles_shouldUseTwoDecimals() {
        // 16.09344 km is at least 10, so two decimals
        assert_eq!(convert("10 miles", PrecisionMode::Exact), "16,09 km");
        assert_eq!(convert("10 miles", PrecisionMode::GameFriendly), "15,84 km");
    }

    #[test]
    fn test_convert_inchesAndPounds() {
        assert_eq!(convert("6 in.", PrecisionMode::GameFriendly), "15 cm.");
        assert_eq!(convert("8 lb.", PrecisionMode::GameFriendly), "4 kg.");
        assert_eq!(convert("3 lbs", PrecisionMode::Exact), "1,4 kg");
    }

    #[test]
    fn test_convert_yards() {
        assert_eq!(convert("100 yards", PrecisionMode::GameFriendly), "90 m");
        assert_eq!(convert("100 yd.", PrecisionMode::Exact), "91,4 m.");
    }

    #[test]
    fn test_convert_shouldBeCaseInsensitiveAndHandlePlurals() {
        assert_eq!(convert("30 FT", PrecisionMode::GameFriendly), "9 m");
        assert_eq!(convert("2 Feet", PrecisionMode::GameFriendly), "0,6 m");
    }

    #[test]
    fn test_convert_shouldProcessMilesBeforeFeet() {
        // A text mixing classes; the miles measure must not be re-read as feet
        let out = convert("travel 1 mi. then 30 ft.", PrecisionMode::GameFriendly);
        assert_eq!(out, "travel 1,584 km. then 9 m.");
    }

    #[test]
    fn test_convert_shouldLeavePlainTextAlone() {
        let text = "The owlbear hoots in the dark.";
        assert_eq!(convert(text, PrecisionMode::Exact), text);
    }

    #[test]
    fn test_localizesUnits_shouldMatchGermanCodes() {
        assert!(localizes_units("DE"));
        assert!(localizes_units("de"));
        assert!(localizes_units("DE-CH"));
        assert!(!localizes_units("EN-GB"));
        assert!(!localizes_units("FR"));
    }
}
