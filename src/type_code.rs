//! Extended squitter type code classification.

use std::fmt;

use serde_json::Value;

/// Message family selected by the 5-bit type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    AircraftIdentification,
    SurfacePosition,
    AirbornePositionBaro,
    AirborneVelocities,
    AirbornePositionGnss,
    Reserved,
    AircraftStatus,
    TargetStateAndStatus,
    AircraftOperationStatus,
    Invalid,
}

impl Category {
    pub const fn name(self) -> &'static str {
        match self {
            Category::AircraftIdentification => "Aircraft identification",
            Category::SurfacePosition => "Surface position",
            Category::AirbornePositionBaro => "Airborne position (w/ Baro Altitude)",
            Category::AirborneVelocities => "Airborne velocities",
            Category::AirbornePositionGnss => "Airborne position (w/ GNSS Height)",
            Category::Reserved => "Reserved",
            Category::AircraftStatus => "Aircraft status",
            Category::TargetStateAndStatus => "Target state and status information",
            Category::AircraftOperationStatus => "Aircraft operation status",
            Category::Invalid => "Invalid type code",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type code paired with its category. `code` is 0 whenever the category is
/// [`Category::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCategory {
    pub code: u8,
    pub category: Category,
}

impl TypeCategory {
    pub const INVALID: TypeCategory = TypeCategory {
        code: 0,
        category: Category::Invalid,
    };

    pub const fn name(&self) -> &'static str {
        self.category.name()
    }

    pub fn is_identification(&self) -> bool {
        self.category == Category::AircraftIdentification
    }
}

/// Map a type code to its category.
///
/// 30 is deliberately absent from the table and lands in the invalid arm,
/// same as 0 and anything above 31.
pub fn classify(code: u64) -> TypeCategory {
    let category = match code {
        1..=4 => Category::AircraftIdentification,
        5..=8 => Category::SurfacePosition,
        9..=18 => Category::AirbornePositionBaro,
        19 => Category::AirborneVelocities,
        20..=22 => Category::AirbornePositionGnss,
        23..=27 => Category::Reserved,
        28 => Category::AircraftStatus,
        29 => Category::TargetStateAndStatus,
        31 => Category::AircraftOperationStatus,
        _ => return TypeCategory::INVALID,
    };

    TypeCategory {
        // every matched arm is <= 31
        code: code as u8,
        category,
    }
}

/// Classify an arbitrary JSON value. Non-numeric and negative values are
/// invalid.
pub fn classify_value(value: &Value) -> TypeCategory {
    value.as_u64().map_or(TypeCategory::INVALID, classify)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_class(code: u64, name: &str) {
        let tc = classify(code);
        assert_eq!(u64::from(tc.code), code, "code {}", code);
        assert_eq!(tc.name(), name, "code {}", code);
    }

    #[test]
    fn test_identification() {
        for code in 1..=4 {
            assert_class(code, "Aircraft identification");
            assert!(classify(code).is_identification());
        }
    }

    #[test]
    fn test_positions() {
        for code in 5..=8 {
            assert_class(code, "Surface position");
        }
        for code in 9..=18 {
            assert_class(code, "Airborne position (w/ Baro Altitude)");
        }
        for code in 20..=22 {
            assert_class(code, "Airborne position (w/ GNSS Height)");
        }
    }

    #[test]
    fn test_single_codes() {
        assert_class(19, "Airborne velocities");
        assert_class(28, "Aircraft status");
        assert_class(29, "Target state and status information");
        assert_class(31, "Aircraft operation status");
    }

    #[test]
    fn test_reserved() {
        for code in 23..=27 {
            assert_class(code, "Reserved");
        }
    }

    #[test]
    fn test_invalid_codes() {
        for code in [0, 30, 32, 255, u64::MAX] {
            assert_eq!(classify(code), TypeCategory::INVALID);
        }
        assert_eq!(TypeCategory::INVALID.name(), "Invalid type code");
        assert!(!classify(30).is_identification());
    }

    #[test]
    fn test_total_over_five_bits() {
        for code in 0..32u64 {
            let tc = classify(code);
            let valid = (1..=31).contains(&code) && code != 30;
            assert_eq!(tc.category != Category::Invalid, valid, "code {}", code);
        }
    }

    #[test]
    fn test_classify_value() {
        assert_eq!(classify_value(&json!(4)).name(), "Aircraft identification");
        assert_eq!(classify_value(&Value::Null), TypeCategory::INVALID);
        assert_eq!(classify_value(&json!("4")), TypeCategory::INVALID);
        assert_eq!(classify_value(&json!(-3)), TypeCategory::INVALID);
        assert_eq!(classify_value(&json!({})), TypeCategory::INVALID);
    }
}
