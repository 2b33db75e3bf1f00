use std::collections::HashMap;

use api_types::{
    Category, ItemStatus,
    autocomplete::AutocompleteResponse,
    item::ItemNew,
};
use chrono::NaiveDate;

/// Wire field name → user-visible error message. Absence of a key means
/// the field is valid; keys outside the record's field set are tolerated
/// (they simply never match a rendered field).
pub type FieldErrorMap = HashMap<String, String>;

const DATE_FORMAT_ERROR: &str = "Wprowadź prawidłową datę (RRRR-MM-DD).";

/// The record's writable fields, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DataZnalezienia,
    DataPrzekazania,
    Kategoria,
    Status,
    AdresZnalezienia,
    AdresZnalezieniaOpis,
    Opis,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Self::DataZnalezienia,
        Self::DataPrzekazania,
        Self::Kategoria,
        Self::Status,
        Self::AdresZnalezienia,
        Self::AdresZnalezieniaOpis,
        Self::Opis,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::DataZnalezienia => "data_znalezienia",
            Self::DataPrzekazania => "data_przekazania",
            Self::Kategoria => "kategoria",
            Self::Status => "status",
            Self::AdresZnalezienia => "adres_znalezienia",
            Self::AdresZnalezieniaOpis => "adres_znalezienia_opis",
            Self::Opis => "opis",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DataZnalezienia => "Data znalezienia (wymagane)",
            Self::DataPrzekazania => "Data przekazania do biura",
            Self::Kategoria => "Kategoria (wymagane)",
            Self::Status => "Status (wymagane)",
            Self::AdresZnalezienia => "Adres znalezienia",
            Self::AdresZnalezieniaOpis => "Szczegóły miejsca",
            Self::Opis => "Opis przedmiotu (wymagane)",
        }
    }

    /// Whether the field is edited as free text (dates are edited as ISO
    /// text and parsed on submit).
    pub fn is_text(self) -> bool {
        !matches!(self, Self::Kategoria | Self::Status)
    }
}

/// The in-progress record. Every field always holds exactly one value;
/// date fields keep the text as typed and are validated when a submission
/// snapshot is taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub data_znalezienia: String,
    pub data_przekazania: String,
    pub kategoria: Category,
    pub opis: String,
    pub adres_znalezienia: String,
    pub adres_znalezienia_opis: String,
    pub status: ItemStatus,
}

impl ItemDraft {
    fn new(today: NaiveDate) -> Self {
        let today = today.format("%Y-%m-%d").to_string();
        Self {
            data_znalezienia: today.clone(),
            data_przekazania: today,
            kategoria: Category::default(),
            opis: String::new(),
            adres_znalezienia: String::new(),
            adres_znalezienia_opis: String::new(),
            status: ItemStatus::default(),
        }
    }
}

/// The authoritative record plus its field error state.
#[derive(Debug)]
pub struct FormStore {
    draft: ItemDraft,
    defaults: ItemDraft,
    errors: FieldErrorMap,
}

impl FormStore {
    pub fn new(today: NaiveDate) -> Self {
        let defaults = ItemDraft::new(today);
        Self {
            draft: defaults.clone(),
            defaults,
            errors: FieldErrorMap::new(),
        }
    }

    pub fn draft(&self) -> &ItemDraft {
        &self.draft
    }

    /// Current text of a text-edited field.
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::DataZnalezienia => &self.draft.data_znalezienia,
            Field::DataPrzekazania => &self.draft.data_przekazania,
            Field::AdresZnalezienia => &self.draft.adres_znalezienia,
            Field::AdresZnalezieniaOpis => &self.draft.adres_znalezienia_opis,
            Field::Opis => &self.draft.opis,
            Field::Kategoria | Field::Status => "",
        }
    }

    /// Replaces a text field's value. A user edit always clears that
    /// field's error, so a stale message never survives a correction.
    pub fn set_text(&mut self, field: Field, value: String) {
        self.errors.remove(field.wire_name());
        match field {
            Field::DataZnalezienia => self.draft.data_znalezienia = value,
            Field::DataPrzekazania => self.draft.data_przekazania = value,
            Field::AdresZnalezienia => self.draft.adres_znalezienia = value,
            Field::AdresZnalezieniaOpis => self.draft.adres_znalezienia_opis = value,
            Field::Opis => self.draft.opis = value,
            Field::Kategoria | Field::Status => {}
        }
    }

    pub fn set_category(&mut self, category: Category) {
        self.errors.remove(Field::Kategoria.wire_name());
        self.draft.kategoria = category;
    }

    pub fn set_status(&mut self, status: ItemStatus) {
        self.errors.remove(Field::Status.wire_name());
        self.draft.status = status;
    }

    /// Applies an AI suggestion without clobbering user input: the
    /// description is only replaced by a non-empty suggestion, and a
    /// category outside the closed set (or explicitly empty) falls back
    /// to `inne`. Missing keys leave the fields untouched.
    pub fn merge_from_analysis(&mut self, suggestion: &AutocompleteResponse) {
        if let Some(kategoria) = suggestion.kategoria.as_deref() {
            self.draft.kategoria = Category::parse_wire(kategoria).unwrap_or(Category::Inne);
        }
        if let Some(opis) = suggestion.opis.as_deref() {
            if !opis.is_empty() {
                self.draft.opis = opis.to_string();
            }
        }
    }

    /// Returns every field not in `preserve` to its default and drops all
    /// error state.
    pub fn reset(&mut self, preserve: &[Field]) {
        for field in Field::ALL {
            if preserve.contains(&field) {
                continue;
            }
            match field {
                Field::DataZnalezienia => {
                    self.draft.data_znalezienia = self.defaults.data_znalezienia.clone();
                }
                Field::DataPrzekazania => {
                    self.draft.data_przekazania = self.defaults.data_przekazania.clone();
                }
                Field::Kategoria => self.draft.kategoria = self.defaults.kategoria,
                Field::Status => self.draft.status = self.defaults.status,
                Field::AdresZnalezienia => {
                    self.draft.adres_znalezienia = self.defaults.adres_znalezienia.clone();
                }
                Field::AdresZnalezieniaOpis => {
                    self.draft.adres_znalezienia_opis =
                        self.defaults.adres_znalezienia_opis.clone();
                }
                Field::Opis => self.draft.opis = self.defaults.opis.clone(),
            }
        }
        self.errors.clear();
    }

    /// The wire record for submission. Date text is validated here; an
    /// unparsable date yields that field's error and no record.
    pub fn snapshot(&self) -> std::result::Result<ItemNew, FieldErrorMap> {
        let mut errors = FieldErrorMap::new();

        let data_znalezienia = parse_date(&self.draft.data_znalezienia);
        if data_znalezienia.is_none() {
            errors.insert(
                Field::DataZnalezienia.wire_name().to_string(),
                DATE_FORMAT_ERROR.to_string(),
            );
        }
        let data_przekazania = parse_date(&self.draft.data_przekazania);
        if data_przekazania.is_none() {
            errors.insert(
                Field::DataPrzekazania.wire_name().to_string(),
                DATE_FORMAT_ERROR.to_string(),
            );
        }

        match (data_znalezienia, data_przekazania) {
            (Some(data_znalezienia), Some(data_przekazania)) => Ok(ItemNew {
                data_znalezienia,
                data_przekazania,
                kategoria: self.draft.kategoria,
                opis: self.draft.opis.clone(),
                adres_znalezienia: self.draft.adres_znalezienia.clone(),
                adres_znalezienia_opis: self.draft.adres_znalezienia_opis.clone(),
                status: self.draft.status,
            }),
            _ => Err(errors),
        }
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(field.wire_name()).map(String::as_str)
    }

    pub fn errors(&self) -> &FieldErrorMap {
        &self.errors
    }

    /// Installs the errors of a failed submission attempt.
    pub fn set_errors(&mut self, errors: FieldErrorMap) {
        self.errors = errors;
    }

    /// Cleared at the start of every submission attempt; the map is only
    /// repopulated from that attempt's response.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> FormStore {
        FormStore::new(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
    }

    #[test]
    fn defaults_are_complete() {
        let store = store();
        let draft = store.draft();
        assert_eq!(draft.data_znalezienia, "2026-03-14");
        assert_eq!(draft.data_przekazania, "2026-03-14");
        assert_eq!(draft.kategoria, Category::Inne);
        assert_eq!(draft.status, ItemStatus::DoOdbioru);
        assert!(draft.opis.is_empty());
        assert!(store.snapshot().is_ok());
    }

    #[test]
    fn editing_a_field_clears_its_error() {
        let mut store = store();
        store.set_errors(FieldErrorMap::from([
            ("opis".to_string(), "Błąd pola".to_string()),
            ("adres_znalezienia".to_string(), "Błąd pola".to_string()),
        ]));

        store.set_text(Field::Opis, "czarny portfel".to_string());

        assert!(store.error(Field::Opis).is_none());
        assert!(store.error(Field::AdresZnalezienia).is_some());
    }

    #[test]
    fn merge_applies_both_suggestions() {
        let mut store = store();
        store.merge_from_analysis(&AutocompleteResponse {
            kategoria: Some("pieniadze".to_string()),
            opis: Some("duzo pieniedzy".to_string()),
        });

        assert_eq!(store.draft().kategoria, Category::Pieniadze);
        assert_eq!(store.draft().opis, "duzo pieniedzy");
    }

    #[test]
    fn merge_preserves_description_when_suggestion_is_missing_or_empty() {
        let mut store = store();
        store.set_text(Field::Opis, "opis urzędnika".to_string());

        store.merge_from_analysis(&AutocompleteResponse {
            kategoria: Some("klucze".to_string()),
            opis: None,
        });
        assert_eq!(store.draft().opis, "opis urzędnika");

        store.merge_from_analysis(&AutocompleteResponse {
            kategoria: None,
            opis: Some(String::new()),
        });
        assert_eq!(store.draft().opis, "opis urzędnika");
        assert_eq!(store.draft().kategoria, Category::Klucze);
    }

    #[test]
    fn merge_maps_unrecognized_category_to_inne() {
        let mut store = store();
        store.set_category(Category::Elektronika);

        store.merge_from_analysis(&AutocompleteResponse {
            kategoria: Some(String::new()),
            opis: None,
        });
        assert_eq!(store.draft().kategoria, Category::Inne);

        store.set_category(Category::Elektronika);
        store.merge_from_analysis(&AutocompleteResponse {
            kategoria: None,
            opis: None,
        });
        assert_eq!(store.draft().kategoria, Category::Elektronika);
    }

    #[test]
    fn reset_preserves_only_named_fields() {
        let mut store = store();
        store.set_text(Field::DataZnalezienia, "2026-02-01".to_string());
        store.set_text(Field::DataPrzekazania, "2026-02-02".to_string());
        store.set_text(Field::Opis, "parasol".to_string());
        store.set_text(Field::AdresZnalezienia, "Dworzec Centralny".to_string());
        store.set_category(Category::Klucze);
        store.set_status(ItemStatus::Odebrano);

        store.reset(&[Field::DataZnalezienia, Field::DataPrzekazania]);

        let draft = store.draft();
        assert_eq!(draft.data_znalezienia, "2026-02-01");
        assert_eq!(draft.data_przekazania, "2026-02-02");
        assert_eq!(draft.kategoria, Category::Inne);
        assert_eq!(draft.status, ItemStatus::DoOdbioru);
        assert!(draft.opis.is_empty());
        assert!(draft.adres_znalezienia.is_empty());
    }

    #[test]
    fn snapshot_rejects_malformed_dates() {
        let mut store = store();
        store.set_text(Field::DataZnalezienia, "14-03-2026".to_string());

        let errors = store.snapshot().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("data_znalezienia"));
    }

    #[test]
    fn snapshot_builds_the_wire_record() {
        let mut store = store();
        store.set_text(Field::Opis, "czarny portfel".to_string());
        store.set_category(Category::DokumentyIPortfele);

        let item = store.snapshot().unwrap();
        assert_eq!(
            item.data_znalezienia,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
        );
        assert_eq!(item.kategoria, Category::DokumentyIPortfele);
        assert_eq!(item.opis, "czarny portfel");
    }
}
