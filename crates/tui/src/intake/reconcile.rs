use std::sync::LazyLock;

use api_types::item::SaveErrorBody;
use regex::Regex;

use super::form::FieldErrorMap;

/// Banner shown whenever field-level errors were extracted.
pub const VALIDATION_BANNER: &str =
    "Wystąpiły błędy walidacji w formularzu. Sprawdź zaznaczone pola.";

const SAVE_FAILED_PREFIX: &str = "Błąd zapisu";
const TYPE_MISMATCH_MARKER: &str = "not of type";
const TYPE_MISMATCH_MESSAGE: &str = "Wprowadź prawidłowy tekst/liczbę";

/// Legacy schema-validation message, e.g.
/// `Błąd walidacji schemy: 123 is not of type 'string' w polu deque(['opis'])`.
/// Kept purely as a compatibility shim for unmigrated deployments; the
/// typed `fields` contract needs no pattern matching.
static SCHEMA_ERROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Błąd walidacji schemy: (.*?) w polu deque\(\['(.*?)'\]\)")
        .expect("static pattern compiles")
});

/// UI-facing result of reconciling a backend error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub field_errors: FieldErrorMap,
    pub global: String,
}

/// Translates whatever the create-record endpoint returned into per-field
/// errors plus one global message. Pure; tolerant of all three contract
/// generations.
pub fn reconcile(body: &SaveErrorBody) -> Reconciled {
    match body {
        SaveErrorBody::Message { message } => reconcile_message(message),
        SaveErrorBody::Fields { fields } => reconcile_fields(fields),
        SaveErrorBody::Unknown(value) => Reconciled {
            field_errors: FieldErrorMap::new(),
            global: format!("{SAVE_FAILED_PREFIX}: {}", stringify(value)),
        },
    }
}

fn reconcile_message(message: &str) -> Reconciled {
    let Some(caps) = SCHEMA_ERROR.captures(message) else {
        // No field path embedded: the whole message becomes the banner.
        return Reconciled {
            field_errors: FieldErrorMap::new(),
            global: format!("{SAVE_FAILED_PREFIX}: {message}"),
        };
    };

    let description = &caps[1];
    let field = &caps[2];
    let detail = if description.contains(TYPE_MISMATCH_MARKER) {
        TYPE_MISMATCH_MESSAGE
    } else {
        description
    };

    let mut field_errors = FieldErrorMap::new();
    field_errors.insert(
        field.to_string(),
        format!("Błąd pola \"{}\": {detail}", field_label(field)),
    );

    Reconciled {
        field_errors,
        global: VALIDATION_BANNER.to_string(),
    }
}

fn reconcile_fields(fields: &[String]) -> Reconciled {
    let mut field_errors = FieldErrorMap::new();
    for field in fields {
        field_errors.insert(
            field.clone(),
            format!(
                "Pole \"{}\" jest wymagane lub nieprawidłowe.",
                field_label(field)
            ),
        );
    }

    Reconciled {
        field_errors,
        global: VALIDATION_BANNER.to_string(),
    }
}

/// Static field → label table; unmapped names fall back to the raw name
/// so unknown-field errors still read sensibly.
fn field_label(field: &str) -> &str {
    match field {
        "data_znalezienia" => "Data znalezienia",
        "data_przekazania" => "Data przekazania",
        "kategoria" => "Kategoria",
        "status" => "Status",
        "opis" => "Opis przedmiotu",
        "adres_znalezienia" => "Adres znalezienia",
        "adres_znalezienia_opis" => "Szczegóły miejsca",
        "telefon_kontaktowy" => "Telefon kontaktowy",
        other => other,
    }
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message_body(message: &str) -> SaveErrorBody {
        SaveErrorBody::Message {
            message: message.to_string(),
        }
    }

    #[test]
    fn legacy_type_mismatch_yields_generic_field_message() {
        let body = message_body(
            "Błąd walidacji schemy: 123 is not of type 'string' w polu deque(['opis'])",
        );
        let result = reconcile(&body);

        assert_eq!(result.field_errors.len(), 1);
        let opis = &result.field_errors["opis"];
        assert!(opis.contains("Opis przedmiotu"));
        assert!(opis.contains(TYPE_MISMATCH_MESSAGE));
        assert_eq!(result.global, VALIDATION_BANNER);
    }

    #[test]
    fn legacy_other_description_passes_through() {
        let body = message_body(
            "Błąd walidacji schemy: za długi tekst w polu deque(['adres_znalezienia'])",
        );
        let result = reconcile(&body);

        let adres = &result.field_errors["adres_znalezienia"];
        assert!(adres.contains("za długi tekst"));
        assert!(!adres.contains(TYPE_MISMATCH_MESSAGE));
    }

    #[test]
    fn legacy_message_without_field_path_becomes_global() {
        let body = message_body("unauthorized");
        let result = reconcile(&body);

        assert!(result.field_errors.is_empty());
        assert_eq!(result.global, "Błąd zapisu: unauthorized");
    }

    #[test]
    fn unknown_field_name_falls_back_to_raw_name() {
        let body = message_body(
            "Błąd walidacji schemy: 5 is not of type 'string' w polu deque(['numer_seryjny'])",
        );
        let result = reconcile(&body);

        assert!(result.field_errors["numer_seryjny"].contains("numer_seryjny"));
    }

    #[test]
    fn field_list_yields_one_entry_per_field() {
        let body = SaveErrorBody::Fields {
            fields: vec!["opis".to_string(), "adres_znalezienia".to_string()],
        };
        let result = reconcile(&body);

        assert_eq!(result.field_errors.len(), 2);
        assert!(result.field_errors["opis"].contains("Opis przedmiotu"));
        assert!(result.field_errors["adres_znalezienia"].contains("Adres znalezienia"));
        assert_eq!(result.global, VALIDATION_BANNER);
    }

    #[test]
    fn unrecognized_payload_degrades_to_global_only() {
        let body = SaveErrorBody::Unknown(json!({"detail": {"code": 502}}));
        let result = reconcile(&body);

        assert!(result.field_errors.is_empty());
        assert!(result.global.starts_with("Błąd zapisu"));
        assert!(result.global.contains("502"));
    }

    #[test]
    fn plain_string_payload_is_kept_verbatim_in_global() {
        let body = SaveErrorBody::Unknown(json!("proxy timeout"));
        let result = reconcile(&body);

        assert_eq!(result.global, "Błąd zapisu: proxy timeout");
    }
}
