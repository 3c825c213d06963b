//! Boundary to the node agent's filesystem API.
//!
//! Every call is a single request with no internal retry. A failed call never
//! affects other in-flight calls.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::{FileManagerConfig, ServerContext};
use crate::error::FileManagerError;
use crate::models::file_entry::FileEntry;
use crate::models::operation::FileAction;
use crate::models::upload::UploadFile;
use crate::models::wire::{
    AgentErrorBody, ChmodRequest, CompressRequest, ExtractRequest, ListResponse, SearchResponse,
    TransferRequest,
};
use crate::remote_path::RemotePath;

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

#[async_trait]
pub trait FilesystemApi: Send + Sync {
    async fn list(&self, path: &RemotePath, show_hidden: bool) -> Result<Vec<FileEntry>, FileManagerError>;

    async fn search(
        &self,
        query: &str,
        path: &RemotePath,
        show_hidden: bool,
    ) -> Result<Vec<FileEntry>, FileManagerError>;

    async fn read_contents(&self, path: &RemotePath, name: &str) -> Result<String, FileManagerError>;

    /// An empty `content` creates the file.
    async fn write(&self, path: &RemotePath, name: &str, content: &str) -> Result<(), FileManagerError>;

    async fn create_directory(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError>;

    async fn rename(&self, from: &str, to: &str) -> Result<(), FileManagerError>;

    async fn copy(&self, from: &str, to: &str) -> Result<(), FileManagerError>;

    async fn delete(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError>;

    async fn chmod(&self, path: &str, mode: &str) -> Result<(), FileManagerError>;

    async fn compress(&self, files: &[String], destination: &str) -> Result<(), FileManagerError>;

    async fn extract(&self, path: &RemotePath, file: &str) -> Result<(), FileManagerError>;

    /// `progress` receives `(bytes_sent, bytes_total)`.
    async fn upload(
        &self,
        path: &RemotePath,
        file: &UploadFile,
        progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<(), FileManagerError>;

    async fn download(&self, path: &RemotePath, name: &str) -> Result<Vec<u8>, FileManagerError>;
}

/// HTTP client bound to one server instance on one node agent.
pub struct NodeAgentClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl NodeAgentClient {
    pub fn new(server: &ServerContext, config: &FileManagerConfig) -> Result<Self, FileManagerError> {
        let base_url = Url::parse(&server.filesystem_base_url())
            .map_err(|e| FileManagerError::Config(format!("invalid node address: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FileManagerError::Config(format!(
                "node address cannot be used as a base URL: {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: server.validation_token.clone(),
        })
    }

    /// `{base}/{operation}/{path segments...}/{name}`, each segment
    /// percent-encoded. A bare root path keeps its trailing slash.
    pub fn endpoint(&self, operation: &str, path: Option<&RemotePath>, name: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(operation);
            if let Some(path) = path {
                for segment in path.segments() {
                    segments.push(segment);
                }
                if path.is_root() && name.is_none() {
                    segments.push("");
                }
            }
            if let Some(name) = name {
                segments.push(name);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "node agent request");
        self.http.request(method, url).bearer_auth(&self.token)
    }

    async fn send_json<T: serde::Serialize + ?Sized>(
        &self,
        operation: &str,
        body: &T,
    ) -> Result<(), String> {
        let url = self.endpoint(operation, None, None);
        let response = self
            .request(Method::POST, url)
            .json(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        expect_success(response).await.map(|_| ())
    }
}

async fn expect_success(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!(%status, error = %message, "node agent returned an error");
    Err(message)
}

/// Prefers the agent's own message, falling back to the status line.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<AgentErrorBody>(body)
        .ok()
        .and_then(AgentErrorBody::into_message)
        .unwrap_or_else(|| {
            format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown Status")
            )
        })
}

#[async_trait]
impl FilesystemApi for NodeAgentClient {
    async fn list(&self, path: &RemotePath, show_hidden: bool) -> Result<Vec<FileEntry>, FileManagerError> {
        let url = self.endpoint("list", Some(path), None);
        let response = self
            .request(Method::GET, url)
            .query(&[("showHidden", show_hidden)])
            .send()
            .await
            .map_err(|e| FileManagerError::List(e.to_string()))?;
        let response = expect_success(response).await.map_err(FileManagerError::List)?;
        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| FileManagerError::List(e.to_string()))?;
        Ok(body.contents)
    }

    async fn search(
        &self,
        query: &str,
        path: &RemotePath,
        show_hidden: bool,
    ) -> Result<Vec<FileEntry>, FileManagerError> {
        let url = self.endpoint("search", None, None);
        let path = path.to_string();
        let show_hidden = show_hidden.to_string();
        let response = self
            .request(Method::GET, url)
            .query(&[
                ("query", query),
                ("path", path.as_str()),
                ("showHidden", show_hidden.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FileManagerError::List(e.to_string()))?;
        let response = expect_success(response).await.map_err(FileManagerError::List)?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FileManagerError::List(e.to_string()))?;
        Ok(body.results)
    }

    async fn read_contents(&self, path: &RemotePath, name: &str) -> Result<String, FileManagerError> {
        let url = self.endpoint("contents", Some(path), Some(name));
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| FileManagerError::Read(e.to_string()))?;
        let response = expect_success(response).await.map_err(FileManagerError::Read)?;
        response
            .text()
            .await
            .map_err(|e| FileManagerError::Read(e.to_string()))
    }

    async fn write(&self, path: &RemotePath, name: &str, content: &str) -> Result<(), FileManagerError> {
        let url = self.endpoint("write", Some(path), Some(name));
        let response = self
            .request(Method::POST, url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(content.to_owned())
            .send()
            .await
            .map_err(|e| FileManagerError::Write(e.to_string()))?;
        expect_success(response).await.map_err(FileManagerError::Write)?;
        Ok(())
    }

    async fn create_directory(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError> {
        let url = self.endpoint("create-directory", Some(path), Some(name));
        let result = match self.request(Method::POST, url).send().await {
            Ok(response) => expect_success(response).await.map(|_| ()),
            Err(e) => Err(e.to_string()),
        };
        result.map_err(|message| {
            FileManagerError::operation(FileAction::CreateDirectory, path.child(name), message)
        })
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), FileManagerError> {
        self.send_json("rename", &TransferRequest { from, to })
            .await
            .map_err(|message| FileManagerError::operation(FileAction::Rename, from, message))
    }

    async fn copy(&self, from: &str, to: &str) -> Result<(), FileManagerError> {
        self.send_json("copy", &TransferRequest { from, to })
            .await
            .map_err(|message| FileManagerError::operation(FileAction::Copy, from, message))
    }

    async fn delete(&self, path: &RemotePath, name: &str) -> Result<(), FileManagerError> {
        let url = self.endpoint("delete", Some(path), Some(name));
        let result = match self.request(Method::DELETE, url).send().await {
            Ok(response) => expect_success(response).await.map(|_| ()),
            Err(e) => Err(e.to_string()),
        };
        result.map_err(|message| FileManagerError::operation(FileAction::Delete, path.child(name), message))
    }

    async fn chmod(&self, path: &str, mode: &str) -> Result<(), FileManagerError> {
        self.send_json("chmod", &ChmodRequest { path, mode })
            .await
            .map_err(|message| FileManagerError::operation(FileAction::Chmod, path, message))
    }

    async fn compress(&self, files: &[String], destination: &str) -> Result<(), FileManagerError> {
        self.send_json("compress", &CompressRequest { files, destination })
            .await
            .map_err(|message| FileManagerError::operation(FileAction::Compress, destination, message))
    }

    async fn extract(&self, path: &RemotePath, file: &str) -> Result<(), FileManagerError> {
        let url = self.endpoint("extract", Some(path), None);
        let result = match self
            .request(Method::POST, url)
            .json(&ExtractRequest { file })
            .send()
            .await
        {
            Ok(response) => expect_success(response).await.map(|_| ()),
            Err(e) => Err(e.to_string()),
        };
        result.map_err(|message| FileManagerError::operation(FileAction::Extract, path.child(file), message))
    }

    async fn upload(
        &self,
        path: &RemotePath,
        file: &UploadFile,
        progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<(), FileManagerError> {
        let upload_error = |message: String| FileManagerError::Upload {
            file: file.name.clone(),
            message,
        };

        let total = file.data.len() as u64;
        let chunks: Vec<Vec<u8>> = file
            .data
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();
        let (sent_tx, mut sent_rx) = tokio::sync::mpsc::unbounded_channel::<u64>();
        let mut sent = 0u64;
        let body = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            let _ = sent_tx.send(sent);
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = reqwest::multipart::Part::stream_with_length(reqwest::Body::wrap_stream(body), total)
            .file_name(file.name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| upload_error(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let url = self.endpoint("upload", Some(path), None);
        let send = self.request(Method::POST, url).multipart(form).send();
        tokio::pin!(send);

        let response = loop {
            tokio::select! {
                result = &mut send => break result,
                Some(bytes) = sent_rx.recv() => progress(bytes, total),
            }
        };

        let response = response.map_err(|e| upload_error(e.to_string()))?;
        expect_success(response).await.map_err(upload_error)?;
        progress(total, total);
        Ok(())
    }

    async fn download(&self, path: &RemotePath, name: &str) -> Result<Vec<u8>, FileManagerError> {
        let download_error = |message: String| FileManagerError::Download {
            file: name.to_string(),
            message,
        };
        let url = self.endpoint("download", Some(path), Some(name));
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        let response = expect_success(response).await.map_err(download_error)?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| download_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
