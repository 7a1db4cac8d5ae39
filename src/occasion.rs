//! Occasion tag chosen for the outfit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    Office,
    Casual,
    Date,
    Vacation,
    Wedding,
    Party,
    Meeting,
    Graduation,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown occasion: {0}")]
pub struct UnknownOccasion(pub String);

impl Occasion {
    /// Display order of the occasion picker.
    pub const ALL: [Occasion; 8] = [
        Self::Office,
        Self::Casual,
        Self::Date,
        Self::Vacation,
        Self::Wedding,
        Self::Party,
        Self::Meeting,
        Self::Graduation,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Casual => "casual",
            Self::Date => "date",
            Self::Vacation => "vacation",
            Self::Wedding => "wedding",
            Self::Party => "party",
            Self::Meeting => "meeting",
            Self::Graduation => "graduation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Office => "Office",
            Self::Casual => "Casual",
            Self::Date => "Date Night",
            Self::Vacation => "Vacation",
            Self::Wedding => "Wedding",
            Self::Party => "Party",
            Self::Meeting => "Business Meeting",
            Self::Graduation => "Graduation",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Office => "Professional workplace attire",
            Self::Casual => "Everyday comfortable wear",
            Self::Date => "Romantic dinner or evening out",
            Self::Vacation => "Travel and leisure activities",
            Self::Wedding => "Formal ceremony attire",
            Self::Party => "Social gatherings and celebrations",
            Self::Meeting => "Important business presentations",
            Self::Graduation => "Academic ceremonies",
        }
    }
}

impl fmt::Display for Occasion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Occasion {
    type Err = UnknownOccasion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.id() == s)
            .ok_or_else(|| UnknownOccasion(s.to_string()))
    }
}

/// The chosen occasion, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccasionSelection {
    selected: Option<Occasion>,
}

impl OccasionSelection {
    pub fn select(&mut self, occasion: Occasion) {
        self.selected = Some(occasion);
    }

    pub fn selected(&self) -> Option<Occasion> {
        self.selected
    }
}
