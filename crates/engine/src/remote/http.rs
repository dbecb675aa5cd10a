// HTTP adapter for the remote note service REST API.

use reqwest::{Client, RequestBuilder, Response};
use url::Url;

use notula_common::note::{Note, NoteId};
use notula_common::protocol::{
    self, CreateNoteRequest, CreateNoteResponse, ErrorResponse, NoteListResponse, SetPinRequest,
    UpdateNoteRequest,
};

use async_trait::async_trait;

use super::{RemoteClient, RemoteError, RemoteResult};

pub struct HttpRemoteClient {
    http: Client,
    /// Base URL without a trailing slash, e.g. `https://notes.example.com/api`.
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemoteClient {
    pub fn new(base_url: &str, auth_token: Option<String>) -> RemoteResult<Self> {
        let base_url = validate_base_url(base_url)?;
        Ok(Self { http: Client::new(), base_url, auth_token })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|error| RemoteError::new(format!("transport error: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Prefer the structured error body; fall back to the status line.
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| format!("HTTP {status}"));
        Err(RemoteError::new(format!("server rejected request ({status}): {message}")))
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn fetch_all(&self) -> RemoteResult<Vec<Note>> {
        let response = self.send(self.http.get(self.endpoint(protocol::NOTES_PATH))).await?;
        let body: NoteListResponse = response
            .json()
            .await
            .map_err(|error| RemoteError::new(format!("malformed note list response: {error}")))?;
        Ok(body.notes.into_iter().map(Note::from).collect())
    }

    async fn create(&self, note: &Note) -> RemoteResult<NoteId> {
        let request = CreateNoteRequest {
            title: note.title.clone(),
            body: note.body.clone(),
            created_at: note.created_at,
            is_pinned: note.is_pinned,
        };
        let response =
            self.send(self.http.post(self.endpoint(protocol::NOTES_PATH)).json(&request)).await?;
        let body: CreateNoteResponse = response
            .json()
            .await
            .map_err(|error| RemoteError::new(format!("malformed create response: {error}")))?;
        Ok(NoteId::from(body.id))
    }

    async fn update(&self, id: &NoteId, title: &str, body: &str) -> RemoteResult<()> {
        let request = UpdateNoteRequest { title: title.to_string(), body: body.to_string() };
        self.send(self.http.put(self.endpoint(&protocol::note_path(id))).json(&request)).await?;
        Ok(())
    }

    async fn delete(&self, id: &NoteId) -> RemoteResult<()> {
        self.send(self.http.delete(self.endpoint(&protocol::note_path(id)))).await?;
        Ok(())
    }

    async fn set_pin(&self, id: &NoteId, pinned: bool) -> RemoteResult<()> {
        let request = SetPinRequest { is_pinned: pinned };
        self.send(self.http.put(self.endpoint(&protocol::pin_path(id))).json(&request)).await?;
        Ok(())
    }
}

fn validate_base_url(raw: &str) -> RemoteResult<String> {
    let url = Url::parse(raw)
        .map_err(|error| RemoteError::new(format!("invalid remote URL `{raw}`: {error}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(RemoteError::new(format!(
            "remote URL `{raw}` must use http or https, not `{}`",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(RemoteError::new(format!("remote URL `{raw}` has no host")));
    }

    Ok(raw.trim_end_matches('/').to_string())
}
