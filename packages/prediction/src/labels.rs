//! The crop label map.
//!
//! A fixed bidirectional mapping between the classifier's integer
//! labels and crop names, loaded nowhere — it is the training-time
//! encoding, frozen in code. Decoding is total over the trained output
//! domain 0..=9.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The crops the recommendation model was trained on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Crop {
    /// Label 0.
    Cassava = 0,
    /// Label 1.
    Cotton = 1,
    /// Label 2.
    #[serde(rename = "Guna melon")]
    #[strum(serialize = "Guna melon")]
    GunaMelon = 2,
    /// Label 3.
    Maize = 3,
    /// Label 4.
    Okra = 4,
    /// Label 5.
    Rice = 5,
    /// Label 6.
    Soybeans = 6,
    /// Label 7.
    #[serde(rename = "Sweet potato")]
    #[strum(serialize = "Sweet potato")]
    SweetPotato = 7,
    /// Label 8.
    Wheat = 8,
    /// Label 9.
    Yam = 9,
}

/// Error returned when decoding a label outside the trained domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownLabelError {
    /// The label that has no crop mapping.
    pub code: u8,
}

impl std::fmt::Display for UnknownLabelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown crop label {}: expected 0-9", self.code)
    }
}

impl std::error::Error for UnknownLabelError {}

impl Crop {
    /// Number of trained crop classes.
    pub const COUNT: usize = 10;

    /// The classifier label for this crop.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a classifier label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label is not in 0..=9.
    pub const fn from_code(code: u8) -> Result<Self, UnknownLabelError> {
        match code {
            0 => Ok(Self::Cassava),
            1 => Ok(Self::Cotton),
            2 => Ok(Self::GunaMelon),
            3 => Ok(Self::Maize),
            4 => Ok(Self::Okra),
            5 => Ok(Self::Rice),
            6 => Ok(Self::Soybeans),
            7 => Ok(Self::SweetPotato),
            8 => Ok(Self::Wheat),
            9 => Ok(Self::Yam),
            _ => Err(UnknownLabelError { code }),
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Cassava,
            Self::Cotton,
            Self::GunaMelon,
            Self::Maize,
            Self::Okra,
            Self::Rice,
            Self::Soybeans,
            Self::SweetPotato,
            Self::Wheat,
            Self::Yam,
        ]
    }
}
