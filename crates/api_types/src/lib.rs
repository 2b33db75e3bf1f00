use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category of a registered item.
///
/// The wire names are the snake_case identifiers the registry backend
/// validates against; `label` is the human form shown in the UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DokumentyIPortfele,
    Elektronika,
    OdziezIAkcesoria,
    Klucze,
    BizuteriaIZegarki,
    Pieniadze,
    #[default]
    Inne,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::DokumentyIPortfele,
        Self::Elektronika,
        Self::OdziezIAkcesoria,
        Self::Klucze,
        Self::BizuteriaIZegarki,
        Self::Pieniadze,
        Self::Inne,
    ];

    /// Returns the canonical wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DokumentyIPortfele => "dokumenty_i_portfele",
            Self::Elektronika => "elektronika",
            Self::OdziezIAkcesoria => "odziez_i_akcesoria",
            Self::Klucze => "klucze",
            Self::BizuteriaIZegarki => "bizuteria_i_zegarki",
            Self::Pieniadze => "pieniadze",
            Self::Inne => "inne",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DokumentyIPortfele => "Dokumenty i portfele",
            Self::Elektronika => "Elektronika",
            Self::OdziezIAkcesoria => "Odzież i akcesoria",
            Self::Klucze => "Klucze",
            Self::BizuteriaIZegarki => "Biżuteria i zegarki",
            Self::Pieniadze => "Pieniądze",
            Self::Inne => "Inne",
        }
    }

    /// Parses a wire name; values outside the closed set yield `None`.
    pub fn parse_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// Pickup status of a registered item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    DoOdbioru,
    Odebrano,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 2] = [Self::DoOdbioru, Self::Odebrano];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoOdbioru => "do_odbioru",
            Self::Odebrano => "odebrano",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DoOdbioru => "Do odbioru",
            Self::Odebrano => "Odebrano",
        }
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    /// Successful login body. `powiat` is the officer's jurisdiction,
    /// display-only on this side; everything else about the session stays
    /// on the server.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub message: Option<String>,
        pub powiat: String,
    }
}

pub mod item {
    use super::*;

    /// The writable surface of a new registry record.
    ///
    /// Office data (powiat, pickup address, contact email/phone) is
    /// attached server-side from the session and never appears here.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ItemNew {
        pub data_znalezienia: NaiveDate,
        pub data_przekazania: NaiveDate,
        pub kategoria: Category,
        pub opis: String,
        pub adres_znalezienia: String,
        pub adres_znalezienia_opis: String,
        pub status: ItemStatus,
    }

    /// Error body of a failed record creation.
    ///
    /// The endpoint went through three contract generations and the live
    /// backend may still emit any of them, so the shapes are modelled as a
    /// closed variant type with an explicit fallback arm instead of being
    /// probed dynamically.
    #[derive(Debug, Clone, PartialEq, Deserialize)]
    #[serde(untagged)]
    pub enum SaveErrorBody {
        /// Legacy generation: one free-text message, possibly embedding a
        /// schema-validation field path.
        Message { message: String },
        /// Current generation: the names of the rejected fields.
        Fields { fields: Vec<String> },
        /// Anything the other two arms do not recognize.
        Unknown(serde_json::Value),
    }
}

pub mod autocomplete {
    use super::*;

    /// AI suggestion for the form. Both keys are optional; an absent key
    /// means the model offered nothing for that field.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct AutocompleteResponse {
        pub kategoria: Option<String>,
        pub opis: Option<String>,
    }

    /// Failure body of the autocomplete endpoint. Older deployments used
    /// `message`, current ones use `error`.
    #[derive(Debug, Clone, Deserialize)]
    #[serde(untagged)]
    pub enum AutocompleteError {
        Current { error: String },
        Legacy { message: String },
    }

    impl AutocompleteError {
        pub fn message(&self) -> &str {
            match self {
                Self::Current { error } => error,
                Self::Legacy { message } => message,
            }
        }
    }
}
