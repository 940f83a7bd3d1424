use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodType {
    Banana,
    Apple,
    Avocado,
    Tomato,
    #[default]
    Generic,
}

/// Ripening behaviour of one kind of produce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodProfile {
    pub name: &'static str,
    /// Relative emission speed, 1.0 = generic produce.
    pub base_ripening_rate: f64,
    /// Exponential gain per °C away from `optimal_temp_c`.
    pub temperature_sensitivity: f64,
    /// Autocatalytic gain per ppm of ethylene already present.
    pub ethylene_sensitivity: f64,
    pub optimal_temp_c: f64,
    pub optimal_humidity: f64,
}

/// Indexed by `FoodType` discriminant.
const PROFILES: [FoodProfile; 5] = [
    FoodProfile {
        name: "Banana",
        base_ripening_rate: 1.2,
        temperature_sensitivity: 0.07,
        ethylene_sensitivity: 0.009,
        optimal_temp_c: 13.0,
        optimal_humidity: 90.0,
    },
    FoodProfile {
        name: "Apple",
        base_ripening_rate: 1.0,
        temperature_sensitivity: 0.06,
        ethylene_sensitivity: 0.008,
        optimal_temp_c: 4.0,
        optimal_humidity: 90.0,
    },
    FoodProfile {
        name: "Avocado",
        base_ripening_rate: 1.4,
        temperature_sensitivity: 0.08,
        ethylene_sensitivity: 0.01,
        optimal_temp_c: 7.0,
        optimal_humidity: 85.0,
    },
    FoodProfile {
        name: "Tomato",
        base_ripening_rate: 1.1,
        temperature_sensitivity: 0.065,
        ethylene_sensitivity: 0.008,
        optimal_temp_c: 10.0,
        optimal_humidity: 85.0,
    },
    FoodProfile {
        name: "Generic",
        base_ripening_rate: 1.0,
        temperature_sensitivity: 0.066,
        ethylene_sensitivity: 0.008,
        optimal_temp_c: 10.0,
        optimal_humidity: 85.0,
    },
];

impl FoodType {
    pub const ALL: [FoodType; 5] = [
        FoodType::Banana,
        FoodType::Apple,
        FoodType::Avocado,
        FoodType::Tomato,
        FoodType::Generic,
    ];

    pub fn profile(self) -> FoodProfile {
        PROFILES[self as usize]
    }
}
