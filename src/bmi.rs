// Unit conversion, BMI and its category

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pounds in one kilogram.
pub const LBS_PER_KG: f64 = 2.205;

/// Centimeters in one foot.
pub const CM_PER_FOOT: f64 = 30.48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "lbs")]
    Pounds,
}

impl WeightUnit {
    pub const ALL: [WeightUnit; 2] = [WeightUnit::Kilograms, WeightUnit::Pounds];

    /// Case-insensitive parse of `kg` or `lbs`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Some(WeightUnit::Kilograms),
            "lbs" => Some(WeightUnit::Pounds),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kilograms => "kg",
            WeightUnit::Pounds => "lbs",
        }
    }

    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kilograms => value,
            WeightUnit::Pounds => value / LBS_PER_KG,
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown weight unit: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeightUnit {
    #[serde(rename = "cm")]
    Centimeters,
    /// Decimal feet
    #[serde(rename = "ft/in")]
    FeetInches,
    #[serde(rename = "m")]
    Meters,
}

impl HeightUnit {
    pub const ALL: [HeightUnit; 3] = [
        HeightUnit::Centimeters,
        HeightUnit::FeetInches,
        HeightUnit::Meters,
    ];

    /// Case-insensitive parse of `cm`, `ft/in` or `m`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cm" => Some(HeightUnit::Centimeters),
            "ft/in" | "ft" => Some(HeightUnit::FeetInches),
            "m" => Some(HeightUnit::Meters),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeightUnit::Centimeters => "cm",
            HeightUnit::FeetInches => "ft/in",
            HeightUnit::Meters => "m",
        }
    }

    pub fn to_meters(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Centimeters => value / 100.0,
            HeightUnit::FeetInches => value * CM_PER_FOOT / 100.0,
            HeightUnit::Meters => value,
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown height unit: {}", s))
    }
}

/// BMI from kilograms and meters.
pub fn compute_bmi(kg: f64, meters: f64) -> f64 {
    kg / meters.powi(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Healthy Weight")]
    HealthyWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obese")]
    Obese,
}

impl Category {
    /// Values between 24.9 and 25.0 (and 29.9 and 30.0) fall into the
    /// higher category.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Category::Underweight
        } else if bmi <= 24.9 {
            Category::HealthyWeight
        } else if bmi <= 29.9 {
            Category::Overweight
        } else {
            Category::Obese
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::HealthyWeight => "Healthy Weight",
            Category::Overweight => "Overweight",
            Category::Obese => "Obese",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A computed BMI and its category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: Category,
}

impl BmiResult {
    pub fn new(kg: f64, meters: f64) -> Self {
        let bmi = compute_bmi(kg, meters);
        Self {
            bmi,
            category: Category::from_bmi(bmi),
        }
    }

    /// e.g. `Your BMI is 22.86 which means you're Healthy Weight.`
    pub fn message(&self) -> String {
        format!(
            "Your BMI is {:.2} which means you're {}.",
            self.bmi, self.category
        )
    }
}

impl fmt::Display for BmiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}
