// Account profile types: rank, unit, role and display-name rules

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Rank
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "Soldado PM")]
    Soldado,
    #[serde(rename = "Cabo PM")]
    Cabo,
    #[serde(rename = "3º Sgt PM")]
    TerceiroSargento,
    #[serde(rename = "2º Sgt PM")]
    SegundoSargento,
    #[serde(rename = "1º Sgt PM")]
    PrimeiroSargento,
    #[serde(rename = "Subten PM")]
    Subtenente,
    #[serde(rename = "Tenente PM")]
    Tenente,
    #[serde(rename = "Capitão PM")]
    Capitao,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::Soldado,
        Rank::Cabo,
        Rank::TerceiroSargento,
        Rank::SegundoSargento,
        Rank::PrimeiroSargento,
        Rank::Subtenente,
        Rank::Tenente,
        Rank::Capitao,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Soldado => "Soldado PM",
            Rank::Cabo => "Cabo PM",
            Rank::TerceiroSargento => "3º Sgt PM",
            Rank::SegundoSargento => "2º Sgt PM",
            Rank::PrimeiroSargento => "1º Sgt PM",
            Rank::Subtenente => "Subten PM",
            Rank::Tenente => "Tenente PM",
            Rank::Capitao => "Capitão PM",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|rank| rank.label() == label)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Unit
// ============================================================================

/// Operational unit. The same four units are written three different ways
/// depending on where they appear, and parsing accepts any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Unit {
    FirstPlatoon,
    SecondPlatoon,
    ThirdPlatoon,
    SecondCompany,
}

impl Unit {
    pub const ALL: [Unit; 4] = [
        Unit::FirstPlatoon,
        Unit::SecondPlatoon,
        Unit::ThirdPlatoon,
        Unit::SecondCompany,
    ];

    /// Label used on account profiles
    pub fn label(&self) -> &'static str {
        match self {
            Unit::FirstPlatoon => "1º pelotão",
            Unit::SecondPlatoon => "2º pelotão",
            Unit::ThirdPlatoon => "3º pelotão",
            Unit::SecondCompany => "2ª Cia",
        }
    }

    /// Label used for integrated teams and the dashboard chart
    pub fn integrated_label(&self) -> &'static str {
        match self {
            Unit::FirstPlatoon => "1º pel.",
            Unit::SecondPlatoon => "2º pel.",
            Unit::ThirdPlatoon => "3º pel.",
            Unit::SecondCompany => "2ª Cia.",
        }
    }

    /// Compact label used by the report form
    pub fn short_label(&self) -> &'static str {
        match self {
            Unit::FirstPlatoon => "1º",
            Unit::SecondPlatoon => "2º",
            Unit::ThirdPlatoon => "3º",
            Unit::SecondCompany => "2ª Cia.",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|unit| {
            unit.label() == label || unit.integrated_label() == label || unit.short_label() == label
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Unit::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown unit: {}", label)))
    }
}

// ============================================================================
// Role
// ============================================================================

/// Resolved once at authentication and carried by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Regular,
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => "regular",
            Role::Administrator => "administrator",
        }
    }
}

// ============================================================================
// Account
// ============================================================================

/// Reserved id of the administrator's credential
pub const ADMIN_ACCOUNT_ID: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub rank: Rank,
    pub unit: Unit,
}

/// First letter upper case, the rest lower case. Surrounding whitespace is dropped.
pub fn normalize_display_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Case-insensitive comparison key for display names
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Letters, spaces, hyphens and apostrophes, with at least one letter
pub fn is_valid_person_name(name: &str) -> bool {
    let trimmed = name.trim();
    trimmed.chars().any(char::is_alphabetic)
        && trimmed
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '\u{2019}'))
}
