use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Settings;
use crate::server::error::ClientError;
use crate::server::types::{CardProperty, FileLogEntry, FileLogResult, FileName};

/// Read side of the card server plus the upload form target.
#[async_trait]
pub trait CardBackend: Send + Sync {
    async fn list_uploads(&self) -> Result<Vec<FileName>, ClientError>;

    async fn file_log(&self, file: &str) -> Result<FileLogEntry, ClientError>;

    async fn card_view(&self, file: &str) -> Result<Vec<CardProperty>, ClientError>;

    async fn upload(&self, path: &Path) -> Result<(), ClientError>;
}

#[derive(Clone, Debug)]
pub struct ServerClient {
    client: reqwest::Client,
    base: Url,
    upload_path: String,
    upload_field: String,
}

impl ServerClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base: settings.server_url.clone(),
            upload_path: settings.upload_path.clone(),
            upload_field: settings.upload_field.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    pub fn download_url(&self, file: &str) -> Result<Url, ClientError> {
        download_url(&self.base, file)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        file: Option<&str>,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        let mut request = self.client.get(url.clone());
        if let Some(file) = file {
            request = request.query(&[("file", file)]);
        }

        tracing::debug!(%url, ?file, "GET");
        let response = request
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status { url, status });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }
}

#[async_trait]
impl CardBackend for ServerClient {
    async fn list_uploads(&self) -> Result<Vec<FileName>, ClientError> {
        self.get_json("uploadDirectory", None).await
    }

    async fn file_log(&self, file: &str) -> Result<FileLogEntry, ClientError> {
        self.get_json("fileLog", Some(file)).await
    }

    async fn card_view(&self, file: &str) -> Result<Vec<CardProperty>, ClientError> {
        self.get_json("cardView", Some(file)).await
    }

    async fn upload(&self, path: &Path) -> Result<(), ClientError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let form = Form::new().part(
            self.upload_field.clone(),
            Part::bytes(content).file_name(file_name.clone()),
        );

        let url = self.endpoint(&self.upload_path)?;
        tracing::debug!(%url, file = %file_name, "POST upload");
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            status if status.is_success() || status.is_redirection() => Ok(()),
            status => Err(ClientError::Status { url, status }),
        }
    }
}

/// Static download location of an uploaded file: `<server>/uploads/<file>`.
pub fn download_url(base: &Url, file: &str) -> Result<Url, ClientError> {
    let mut url = base.join("uploads/")?;
    url.path_segments_mut()
        .map_err(|_| ClientError::BaseUrl(base.clone()))?
        .pop_if_empty()
        .push(file);
    Ok(url)
}

/// Fetches every file summary concurrently and returns the outcomes in
/// listing order. A failed fetch is logged and carries no entry.
pub async fn fetch_file_logs<B>(backend: &B, files: &[FileName]) -> Vec<FileLogResult>
where
    B: CardBackend + ?Sized,
{
    let fetches = files.iter().enumerate().map(|(index, name)| async move {
        let entry = match backend.file_log(name).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "file log fetch failed");
                None
            }
        };
        FileLogResult {
            index,
            name: name.clone(),
            entry,
        }
    });

    join_all(fetches).await
}
