use std::sync::Arc;

use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{multipart, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::{Error, Result};
use super::models::*;
use super::session::{normalize_user, Session};

/// Rendering type the backend uses for the reading pane (HTML body).
pub const RENDER_HTML: u8 = 1;

const UPLOAD_CHUNK: usize = 16 * 1024;

const LOGIN_FAILED: &str =
    "The login is fail check you user name and password then try again.";

/// Client for the webmail REST backend. Cheap to clone; the session is fixed at
/// construction, so a login produces a new client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("webmail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::http("client"))?;
        Ok(ApiClient {
            http,
            base,
            session: None,
        })
    }

    pub fn with_session(&self, session: Session) -> Self {
        ApiClient {
            http: self.http.clone(),
            base: self.base.clone(),
            session: Some(session),
        }
    }

    pub fn without_session(&self) -> Self {
        ApiClient {
            http: self.http.clone(),
            base: self.base.clone(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base.join(endpoint)?)
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotLoggedIn)
    }

    /// POST with the `userName` / `jwtKey` headers every mailbox call carries.
    fn authed_post(&self, endpoint: &'static str) -> Result<RequestBuilder> {
        let session = self.require_session()?;
        log::debug!("POST {endpoint}");
        Ok(self
            .http
            .post(self.url(endpoint)?)
            .header("userName", &session.user_name)
            .header("jwtKey", &session.jwt_key))
    }

    async fn send(endpoint: &'static str, rb: RequestBuilder) -> Result<Response> {
        let resp = rb.send().await.map_err(Error::http(endpoint))?;
        let status = resp.status();
        if !status.is_success() {
            log::warn!("{endpoint} returned {status}");
            return Err(Error::Status { endpoint, status });
        }
        Ok(resp)
    }

    async fn decode<R: DeserializeOwned>(endpoint: &'static str, resp: Response) -> Result<R> {
        let bytes = resp.bytes().await.map_err(Error::http(endpoint))?;
        Self::parse(endpoint, &bytes)
    }

    fn parse<R: DeserializeOwned>(endpoint: &'static str, bytes: &[u8]) -> Result<R> {
        serde_json::from_slice(bytes).map_err(|e| {
            log::warn!("{endpoint}: undecodable response: {e}");
            Error::Decode {
                endpoint,
                detail: e.to_string(),
            }
        })
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<R> {
        let rb = self
            .authed_post(endpoint)?
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let resp = Self::send(endpoint, rb).await?;
        Self::decode(endpoint, resp).await
    }

    async fn post_json_text<B: Serialize>(&self, endpoint: &'static str, body: &B) -> Result<String> {
        let rb = self
            .authed_post(endpoint)?
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let resp = Self::send(endpoint, rb).await?;
        resp.text().await.map_err(Error::http(endpoint))
    }

    async fn post_empty_text(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> Result<String> {
        let rb = self.authed_post(endpoint)?.query(query).body("");
        let resp = Self::send(endpoint, rb).await?;
        resp.text().await.map_err(Error::http(endpoint))
    }

    // -- auth ----------------------------------------------------------------

    /// Authenticate and return the session to use for subsequent calls.
    pub async fn login(&self, user: &str, password: &str) -> Result<Session> {
        const ENDPOINT: &str = "auth/login";
        let user = normalize_user(user);
        log::debug!("POST {ENDPOINT} as {user}");
        let rb = self
            .http
            .post(self.url(ENDPOINT)?)
            .header("userName", &user)
            .header("password", password)
            .header("jwtKey", "")
            .body("");
        let resp = Self::send(ENDPOINT, rb).await?;
        let login: LoginResponse = Self::decode(ENDPOINT, resp).await?;
        if login.message == "Success" {
            log::info!("Logged in as {user}");
            return Ok(Session {
                user_name: user,
                jwt_key: login.jwt_key,
            });
        }
        log::warn!("Login rejected for {user}: {:?}", login.message);
        Err(Error::Backend(if login.error.is_empty() {
            LOGIN_FAILED.to_string()
        } else {
            format!("{LOGIN_FAILED} ({})", login.error)
        }))
    }

    pub async fn logout(&self) -> Result<()> {
        const ENDPOINT: &str = "auth/logout";
        let session = self.require_session()?;
        log::debug!("POST {ENDPOINT}");
        let rb = self
            .http
            .post(self.url(ENDPOINT)?)
            .header("userName", &session.user_name)
            .header("Authorization", &session.jwt_key)
            .body("");
        Self::send(ENDPOINT, rb).await?;
        Ok(())
    }

    // -- folders -------------------------------------------------------------

    pub async fn folders(&self) -> Result<Vec<Folder>> {
        const ENDPOINT: &str = "getAllFolderList";
        let text = self.post_empty_text(ENDPOINT, &[]).await?;
        let wire: Vec<FolderResponse> = Self::parse(ENDPOINT, text.as_bytes())?;
        Ok(wire.into_iter().map(Folder::from).collect())
    }

    pub async fn create_folder(&self, name: &str) -> Result<()> {
        let body = CreateFolderRequest { name: name.into() };
        self.post_json_text("createFolder", &body).await.map(drop)
    }

    pub async fn delete_folders(&self, names: Vec<String>) -> Result<()> {
        let body = DeleteFolderRequest {
            selected_folder: names,
        };
        self.post_json_text("deleteFolder", &body).await.map(drop)
    }

    pub async fn move_folders(&self, names: Vec<String>, target: Vec<String>) -> Result<()> {
        let body = MoveFolderRequest {
            selected_folder: names,
            target_folder: target,
        };
        self.post_json_text("moveFolder", &body).await.map(drop)
    }

    pub async fn subscribe_folder(&self, name: &str) -> Result<String> {
        self.post_empty_text("subscribeFolder", &[("folderName", name)]).await
    }

    pub async fn subscribe_all(&self) -> Result<String> {
        self.post_empty_text("subscribALLFolders", &[]).await
    }

    /// Number of messages in `folder`; also the number of its newest message.
    pub async fn message_count(&self, folder: &str) -> Result<u32> {
        const ENDPOINT: &str = "getMessageCount";
        let rb = self.authed_post(ENDPOINT)?.form(&[("folder", folder)]);
        let resp = Self::send(ENDPOINT, rb).await?;
        let text = resp.text().await.map_err(Error::http(ENDPOINT))?;
        parse_count(&text).ok_or_else(|| Error::Decode {
            endpoint: ENDPOINT,
            detail: format!("not a count: {text:?}"),
        })
    }

    /// Message count of the inbox, without naming a folder.
    pub async fn inbox_message_count(&self) -> Result<u32> {
        const ENDPOINT: &str = "getInboxMessageCount";
        let text = self.post_empty_text(ENDPOINT, &[]).await?;
        parse_count(&text).ok_or_else(|| Error::Decode {
            endpoint: ENDPOINT,
            detail: format!("not a count: {text:?}"),
        })
    }

    pub async fn trash_messages(&self) -> Result<String> {
        self.post_empty_text("getTrashMessages", &[]).await.map(unquote)
    }

    pub async fn unread(&self) -> Result<String> {
        self.post_empty_text("getUnread", &[]).await.map(unquote)
    }

    pub async fn trash_name(&self) -> Result<String> {
        self.post_empty_text("getTrashName", &[]).await.map(unquote)
    }

    pub async fn empty_trash(&self) -> Result<String> {
        self.post_empty_text("getTrashEmpty", &[]).await.map(unquote)
    }

    pub async fn separator(&self) -> Result<String> {
        self.post_empty_text("getSeparator", &[]).await.map(unquote)
    }

    pub async fn user_language(&self) -> Result<String> {
        self.post_empty_text("getUserLanguage", &[]).await.map(unquote)
    }

    // -- message lists -------------------------------------------------------

    pub async fn list_messages(&self, folder: &str, range: MessageRange) -> Result<Vec<MessageSummary>> {
        let body = MessageListRequest {
            range,
            folder: folder.into(),
        };
        let resp: MessageListResponse = self.post_json("listMessages", &body).await?;
        Ok(summaries(resp))
    }

    pub async fn search_messages(&self, folder: &str, key: &str) -> Result<Vec<MessageSummary>> {
        let body = SearchMessageRequest {
            searchkey: key.into(),
            folder: folder.into(),
        };
        let resp: MessageListResponse = self.post_json("searchMessages", &body).await?;
        Ok(summaries(resp))
    }

    pub async fn delete_messages(&self, folder: &str, numbers: &[u32]) -> Result<()> {
        let body = DeleteMessageRequest {
            folder: folder.into(),
            message: numbers.iter().map(u32::to_string).collect(),
        };
        self.post_json_text("deleteMessage", &body).await.map(drop)
    }

    pub async fn move_messages(&self, folder: &str, numbers: &[u32], destination: &str) -> Result<()> {
        let body = MoveMessageRequest {
            folder: folder.into(),
            message: numbers.iter().map(u32::to_string).collect(),
            destination: destination.into(),
        };
        self.post_json_text("moveMessage", &body).await.map(drop)
    }

    // -- message content -----------------------------------------------------

    pub async fn message(&self, folder: &str, number: u32) -> Result<MessageContent> {
        self.content("getMessage", folder, number).await
    }

    pub async fn reply_message(&self, folder: &str, number: u32) -> Result<MessageContent> {
        self.content("getReplyMessage", folder, number).await
    }

    pub async fn forward_message(
        &self,
        folder: &str,
        number: u32,
        forward_address: &str,
        as_attachment: bool,
    ) -> Result<MessageContent> {
        let body = ForwardMessageContentRequest {
            message: content_request(folder, number),
            forward_address: forward_address.into(),
            is_attachment: as_attachment,
        };
        let resp: MessageContentResponse = self.post_json("getForwardMessage", &body).await?;
        unwrap_content("getForwardMessage", folder, number, resp)
    }

    async fn content(&self, endpoint: &'static str, folder: &str, number: u32) -> Result<MessageContent> {
        let resp: MessageContentResponse = self
            .post_json(endpoint, &content_request(folder, number))
            .await?;
        unwrap_content(endpoint, folder, number, resp)
    }

    // -- sending & attachments -----------------------------------------------

    pub async fn send_mail(&self, request: &MailMessageSendRequest) -> Result<String> {
        log::info!(
            "Sending mail to {:?} with {} attachment(s)",
            request.to,
            request.attachment.len()
        );
        self.post_json_text("sendMail", request).await
    }

    /// Download an attachment's raw bytes.
    pub async fn attachment(&self, folder: &str, number: u32, filename: &str) -> Result<Vec<u8>> {
        const ENDPOINT: &str = "attachment";
        let session = self.require_session()?;
        log::debug!("GET {ENDPOINT} {folder}/{number}/{filename}");
        let number = number.to_string();
        let rb = self
            .http
            .get(self.url(ENDPOINT)?)
            .header(CONTENT_TYPE, "application/json")
            .header("jwtKey", &session.jwt_key)
            .query(&[
                ("folder", folder),
                ("messageNumber", number.as_str()),
                ("filename", filename),
                ("userName", session.user_name.as_str()),
            ]);
        let resp = Self::send(ENDPOINT, rb).await?;
        let bytes = resp.bytes().await.map_err(Error::http(ENDPOINT))?;
        Ok(bytes.to_vec())
    }

    /// Upload a file for a draft. `progress` receives whole percentages as the
    /// body is handed to the connection.
    pub async fn upload(
        &self,
        attachment: AttachmentData,
        progress: Arc<dyn Fn(u8) + Send + Sync>,
    ) -> Result<String> {
        const ENDPOINT: &str = "uploadFileWithAddtionalData";
        let total = attachment.data.len() as u64;
        let chunks: Vec<Vec<u8>> = attachment
            .data
            .chunks(UPLOAD_CHUNK)
            .map(<[u8]>::to_vec)
            .collect();
        let mut sent = 0u64;
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            progress(percent(sent, total));
            Ok::<_, std::io::Error>(chunk)
        });

        let part = multipart::Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(attachment.filename.clone())
            .mime_str(&attachment.mime_type)
            .map_err(Error::http(ENDPOINT))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("name", attachment.filename.clone())
            .text("email", "");

        let rb = self.authed_post(ENDPOINT)?.multipart(form);
        let resp = Self::send(ENDPOINT, rb).await?;
        log::info!("Uploaded {} ({total} bytes)", attachment.filename);
        resp.text().await.map_err(Error::http(ENDPOINT))
    }
}

fn content_request(folder: &str, number: u32) -> MessageContentRequest {
    MessageContentRequest {
        folder: folder.into(),
        message_number: number,
        rendering_type: RENDER_HTML,
    }
}

fn unwrap_content(
    endpoint: &'static str,
    folder: &str,
    number: u32,
    resp: MessageContentResponse,
) -> Result<MessageContent> {
    match resp.mail_message {
        Some(m) => Ok(MessageContent::from_wire(folder, number, m)),
        None => {
            log::error!("{endpoint}: no mailMessage for {folder}/{number}");
            Err(Error::Backend("No message content returned".into()))
        }
    }
}

fn summaries(resp: MessageListResponse) -> Vec<MessageSummary> {
    resp.message_list
        .into_iter()
        .filter_map(MessageSummary::from_wire)
        .collect()
}

fn unquote(text: String) -> String {
    text.trim().trim_matches('"').to_string()
}

/// Counts come back as bare text, sometimes JSON-quoted.
pub fn parse_count(text: &str) -> Option<u32> {
    text.trim().trim_matches('"').trim().parse().ok()
}

fn percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent * 100 + total / 2) / total).min(100) as u8
}
