//! Distance units and the conversions between speed and pace.

use core::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

pub const METRES_PER_KM: f64 = 1000.0;
pub const METRES_PER_MILE: f64 = 1609.344;

/// Number of km in a mile.
pub const KM_PER_MILE: f64 = METRES_PER_MILE / METRES_PER_KM;

/// The unit used to cut an activity into splits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitUnit {
    Km,
    Mile,
}

impl SplitUnit {
    /// Length of one split, in metres.
    pub fn length_metres(self) -> f64 {
        match self {
            SplitUnit::Km => METRES_PER_KM,
            SplitUnit::Mile => METRES_PER_MILE,
        }
    }
}

impl FromStr for SplitUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "km" => Ok(SplitUnit::Km),
            "mile" => Ok(SplitUnit::Mile),
            _ => Err(Error::InvalidArgument(format!(
                "split unit must be \"km\" or \"mile\", not \"{s}\""
            ))),
        }
    }
}

impl fmt::Display for SplitUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitUnit::Km => write!(f, "km"),
            SplitUnit::Mile => write!(f, "mile"),
        }
    }
}

/// The user's preferred system of units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// The split unit that goes with this system.
    pub fn split_unit(self) -> SplitUnit {
        match self {
            UnitSystem::Metric => SplitUnit::Km,
            UnitSystem::Imperial => SplitUnit::Mile,
        }
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(Error::InvalidArgument(format!(
                "unit system must be \"metric\" or \"imperial\", not \"{s}\""
            ))),
        }
    }
}

/// Calculates a pace, in seconds per unit, from a distance in metres and
/// the seconds it took to cover it. Returns None for a zero distance,
/// which happens whenever the GPS reports the same position twice.
pub fn pace_secs(unit_length_metres: f64, metres: f64, seconds: f64) -> Option<f64> {
    if metres > 0.0 {
        Some(unit_length_metres / metres * seconds)
    } else {
        None
    }
}

/// Converts a pace in seconds per km into a speed in km/h.
pub fn kmh_from_pace(secs_per_km: f64) -> Option<f64> {
    if secs_per_km > 0.0 {
        Some(3600.0 / secs_per_km)
    } else {
        None
    }
}

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh / KM_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_unit_parses_known_names() {
        assert_eq!("km".parse::<SplitUnit>().unwrap(), SplitUnit::Km);
        assert_eq!("mile".parse::<SplitUnit>().unwrap(), SplitUnit::Mile);
    }

    #[test]
    fn split_unit_rejects_unknown_names() {
        let err = "furlong".parse::<SplitUnit>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn unit_systems_parse_case_insensitively() {
        assert_eq!("Imperial".parse::<UnitSystem>().unwrap(), UnitSystem::Imperial);
        assert_eq!("metric".parse::<UnitSystem>().unwrap().split_unit(), SplitUnit::Km);
        let err = "nautical".parse::<UnitSystem>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn pace_is_undefined_for_zero_distance() {
        assert_eq!(pace_secs(METRES_PER_KM, 0.0, 10.0), None);
    }

    #[test]
    fn five_minute_km_is_twelve_kmh() {
        let pace = pace_secs(METRES_PER_KM, 100.0, 30.0).unwrap();
        assert!((pace - 300.0).abs() < 1e-9);
        assert!((kmh_from_pace(pace).unwrap() - 12.0).abs() < 1e-9);
        assert!((kmh_to_mph(KM_PER_MILE * 10.0) - 10.0).abs() < 1e-9);
    }
}
