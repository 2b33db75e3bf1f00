use api_types::{
    account::{LoginRequest, LoginResponse},
    autocomplete::{AutocompleteError, AutocompleteResponse},
    item::{ItemNew, SaveErrorBody},
};
use reqwest::Url;

use crate::error::{AppError, Result};

/// Classified outcome of a backend call. Nothing here escapes past the
/// app layer; every arm ends up as user-visible state.
#[derive(Debug)]
pub enum ClientError {
    /// Rejected credentials on login.
    Unauthorized,
    /// The classification service rejected the upload.
    Analysis(String),
    /// Record creation refused; carries the raw error body for the
    /// reconciler.
    Validation(SaveErrorBody),
    /// A staged photo could not be read from disk.
    File(String),
    /// Non-2xx response outside the shapes above.
    Server(String),
    /// Connectivity or timeout.
    Transport(reqwest::Error),
}

/// One photo ready for multipart upload.
#[derive(Debug, Clone)]
pub struct PhotoPart {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> std::result::Result<LoginResponse, ClientError> {
        let endpoint = self
            .base_url
            .join("api/konta/logowanie")
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;

        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let res = self
            .http
            .post(endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<LoginResponse>()
                .await
                .map_err(ClientError::Transport);
        }

        let status = res.status();
        tracing::warn!(%status, "login rejected");
        match status.as_u16() {
            401 => Err(ClientError::Unauthorized),
            _ => {
                let body = res.text().await.unwrap_or_default();
                Err(ClientError::Server(body))
            }
        }
    }

    /// Liveness probe; drives the connection indicator only, so every
    /// failure collapses to `false`.
    pub async fn health(&self) -> bool {
        let Ok(endpoint) = self.base_url.join("zdrowie") else {
            return false;
        };
        match self.http.get(endpoint).send().await {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        }
    }

    /// Sends the staged photos to the classification service, every part
    /// under the shared `photos` field name.
    pub async fn autocomplete(
        &self,
        photos: Vec<PhotoPart>,
    ) -> std::result::Result<AutocompleteResponse, ClientError> {
        let endpoint = self
            .base_url
            .join("api/narzedzia/auto_uzupelnianie")
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;

        let mut form = reqwest::multipart::Form::new();
        for photo in photos {
            let part = reqwest::multipart::Part::bytes(photo.bytes).file_name(photo.file_name);
            form = form.part("photos", part);
        }

        let res = self
            .http
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return res
                .json::<AutocompleteResponse>()
                .await
                .map_err(ClientError::Transport);
        }

        let status = res.status();
        let message = res
            .json::<AutocompleteError>()
            .await
            .map(|err| err.message().to_string())
            .unwrap_or_else(|_| format!("analiza odrzucona ({status})"));
        tracing::warn!(%status, "autocomplete rejected");
        Err(ClientError::Analysis(message))
    }

    /// Creates the record. Success is any 2xx with no required body; every
    /// rejection carries its raw payload back for reconciliation.
    pub async fn create_item(&self, item: &ItemNew) -> std::result::Result<(), ClientError> {
        let endpoint = self
            .base_url
            .join("api/rzeczy_znalezione")
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;

        let res = self
            .http
            .post(endpoint)
            .json(item)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if res.status().is_success() {
            return Ok(());
        }

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str::<SaveErrorBody>(&text)
            .unwrap_or_else(|_| SaveErrorBody::Unknown(serde_json::Value::String(text)));
        tracing::warn!(%status, "record creation rejected");
        Err(ClientError::Validation(body))
    }
}
