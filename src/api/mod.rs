use crate::config::EnvConfig;
use crate::error::{ApiResult, ClientError};
use crate::filters::FilterSet;
use crate::models::{
    Credentials, Note, NoteFeature, NotePayload, RegisterRequest, Registration, UserRead,
    UserUpdate,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The backend operations the sync engine needs.
#[allow(async_fn_in_trait)]
pub trait NotesApi {
    /// `GET /note/geojson?<filters>`
    async fn list_notes(&self, filters: &FilterSet) -> ApiResult<Vec<Note>>;
    /// `POST /note`
    async fn create_note(&self, payload: &NotePayload) -> ApiResult<Note>;
    /// `PUT /note/{code}`
    async fn update_note(&self, code: &str, payload: &NotePayload) -> ApiResult<Note>;
    /// `DELETE /note/{code}`
    async fn delete_note(&self, code: &str) -> ApiResult<()>;
    /// `POST /user/login`; the session cookie is set by the response.
    async fn login(&self, credentials: &Credentials) -> ApiResult<()>;
    /// `GET /user/logout`
    async fn logout(&self) -> ApiResult<()>;
    /// `POST /user/register`
    async fn register(&self, registration: &Registration) -> ApiResult<()>;
    /// `PUT /user/own`
    async fn update_own_user(&self, update: &UserUpdate) -> ApiResult<UserRead>;
}

/// Build the user-facing error for a non-success response.
///
/// The backend answers with `{"type","code","message"}` from its use cases or
/// `{"detail": ...}` from the framework; anything else is shown raw.
pub(crate) fn rejection(status: u16, body: &str) -> ClientError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.get("message")
            .and_then(|m| m.as_str())
            .or_else(|| v.get("detail").and_then(|d| d.as_str()))
            .or_else(|| {
                v.get("detail")
                    .and_then(|d| d.get(0))
                    .and_then(|d| d.get("msg"))
                    .and_then(|m| m.as_str())
            })
            .map(str::to_string)
    });

    let message = from_json
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty() && parsed.is_none()).then(|| raw.to_string())
        })
        .unwrap_or_else(|| format!("Request failed ({status})"));

    ClientError::ServerRejected { status, message }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) locale: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            locale: locale.into(),
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.api_url.clone(), config.locale.clone())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn notes_path(filters: &FilterSet) -> String {
        format!("/note/geojson?{}", filters.to_query_string())
    }

    pub(crate) fn note_path(code: &str) -> String {
        format!("/note/{}", urlencoding::encode(code))
    }

    /// Request with the headers every call carries.
    fn builder(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = reqwest::Client::new()
            .request(method, self.url(path))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, self.locale.as_str());

        // Send the session cookie cross-origin.
        #[cfg(target_arch = "wasm32")]
        let req = req.fetch_credentials_include();

        req
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let mut req = self.builder(method, path);
        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ClientError::network)?;
        let status = res.status();

        if status.is_success() {
            res.json().await.map_err(ClientError::network)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(rejection(status.as_u16(), &body))
        }
    }
}

impl NotesApi for ApiClient {
    async fn list_notes(&self, filters: &FilterSet) -> ApiResult<Vec<Note>> {
        let features: Vec<NoteFeature> = self
            .request(Method::GET, &Self::notes_path(filters), None::<&()>)
            .await?;
        Ok(features.into_iter().map(Note::from).collect())
    }

    async fn create_note(&self, payload: &NotePayload) -> ApiResult<Note> {
        self.request(Method::POST, "/note", Some(payload)).await
    }

    async fn update_note(&self, code: &str, payload: &NotePayload) -> ApiResult<Note> {
        self.request(Method::PUT, &Self::note_path(code), Some(payload))
            .await
    }

    async fn delete_note(&self, code: &str) -> ApiResult<()> {
        self.request::<serde_json::Value>(Method::DELETE, &Self::note_path(code), None::<&()>)
            .await
            .map(|_| ())
    }

    async fn login(&self, credentials: &Credentials) -> ApiResult<()> {
        self.request::<serde_json::Value>(Method::POST, "/user/login", Some(credentials))
            .await
            .map(|_| ())
    }

    async fn logout(&self) -> ApiResult<()> {
        self.request::<serde_json::Value>(Method::GET, "/user/logout", None::<&()>)
            .await
            .map(|_| ())
    }

    async fn register(&self, registration: &Registration) -> ApiResult<()> {
        let body = RegisterRequest {
            email: registration.email.trim().to_string(),
            username: registration.username.trim().to_string(),
            password: registration.password.clone(),
        };
        self.request::<serde_json::Value>(Method::POST, "/user/register", Some(&body))
            .await
            .map(|_| ())
    }

    async fn update_own_user(&self, update: &UserUpdate) -> ApiResult<UserRead> {
        self.request(Method::PUT, "/user/own", Some(update)).await
    }
}
