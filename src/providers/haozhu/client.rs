//! HaoZhu HTTP client.

use super::errors::{HaozhuError, HaozhuErrorKind, HaozhuServiceError, Result};
use super::response::HaozhuResponse;
use super::types::{
    AccountInfo, GetMessagePayload, GetPhoneOptions, GetPhonePayload, LoginPayload, Message,
    PhoneNumber, SummaryPayload,
};
use crate::config::HaozhuConfig;
use crate::utils::retry::{OnRetryCallback, retry};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::time::Duration;
use url::Url;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug, info};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Path of the API handler below the server base URL.
const API_PATH: &str = "sms/";

/// Query keys whose values are masked in logs.
#[cfg(feature = "tracing")]
const SECRET_KEYS: &[&str] = &["pass", "token"];

/// Ordered request parameters. `None` values are left out of the request.
type Params = Vec<(&'static str, Option<String>)>;

/// Keep a string filter only if it is non-empty.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// HaoZhu HTTP client.
///
/// Holds the HTTP connection pool (the session) and the authentication
/// token. The session is opened on first use and released by
/// [`HaozhuClient::close`], at the end of [`HaozhuClient::scope`], or when the
/// client is dropped. Every operation logs in first if no token is held.
///
/// Operations take `&mut self`: a client is driven by one caller at a time.
/// Use one client per task to run requests in parallel.
///
/// # Example
///
/// ```rust,ignore
/// use haozhu::{GetPhoneOptions, HaozhuClient, HaozhuConfig};
///
/// let config = HaozhuConfig::from_env()?;
/// let client = HaozhuClient::new(config)?;
///
/// client
///     .scope(async |client: &mut HaozhuClient| {
///         let info = client.get_account_info().await?;
///         println!("Balance: {}", info.money);
///
///         let phone = client.get_phone(123, GetPhoneOptions::default()).await?;
///         let message = client.get_message(123, &phone.phone).await?;
///         println!("Code: {}", message.yzm);
///
///         client.release_phone(123, &phone.phone).await?;
///         Ok::<_, haozhu::HaozhuError>(())
///     })
///     .await?;
/// ```
pub struct HaozhuClient {
    config: HaozhuConfig,
    token: SecretString,
    session: Option<ClientWithMiddleware>,
    http_client: Option<ClientWithMiddleware>,
    on_retry: Option<OnRetryCallback<HaozhuError>>,
    #[cfg(test)]
    sessions_closed: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl std::fmt::Debug for HaozhuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HaozhuClient")
            .field("server", &self.config.server)
            .field("username", &self.config.username)
            .field("token", &"[REDACTED]")
            .field("session_open", &self.session.is_some())
            .finish()
    }
}

/// Builder for configuring a [`HaozhuClient`].
///
/// Explicit values set on the builder take precedence over the
/// configuration.
pub struct HaozhuClientBuilder {
    config: HaozhuConfig,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    server: Option<String>,
    http_client: Option<ClientWithMiddleware>,
    on_retry: Option<OnRetryCallback<HaozhuError>>,
}

impl HaozhuClientBuilder {
    /// Create a new builder starting from `config`.
    pub fn new(config: HaozhuConfig) -> Self {
        Self {
            config,
            username: None,
            password: None,
            token: None,
            server: None,
            http_client: None,
            on_retry: None,
        }
    }

    /// Set the account user name.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the account password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Use a token from an earlier login instead of logging in.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the API server base URL.
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Set a custom HTTP client with middleware.
    ///
    /// It is used as-is for every session, so the configured timeout does
    /// not apply to it.
    pub fn http_client(mut self, client: ClientWithMiddleware) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set a callback to be invoked before each retry with the failure and
    /// the upcoming wait.
    pub fn on_retry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&HaozhuError, Duration) + Send + Sync + 'static,
    {
        self.on_retry = Some(std::sync::Arc::new(callback));
        self
    }

    /// Build the [`HaozhuClient`].
    pub fn build(self) -> Result<HaozhuClient> {
        let mut config = self.config;

        if let Some(username) = self.username.filter(|u| !u.is_empty()) {
            config.username = username;
        }
        if let Some(password) = self.password.filter(|p| !p.is_empty()) {
            config.password = SecretString::from(password);
        }
        if let Some(server) = self.server {
            let trimmed = server.trim_end_matches('/');
            config.server = Url::parse(trimmed).map_err(|source| HaozhuError::InvalidServerUrl {
                url: server.clone(),
                source,
            })?;
        }
        if config.server.cannot_be_a_base() {
            return Err(HaozhuError::InvalidServerUrl {
                url: config.server.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let token = self
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .unwrap_or_else(|| config.token.clone());

        Ok(HaozhuClient {
            config,
            token,
            session: None,
            http_client: self.http_client,
            on_retry: self.on_retry,
            #[cfg(test)]
            sessions_closed: Default::default(),
        })
    }
}

impl HaozhuClient {
    /// Create a new client from a configuration.
    pub fn new(config: HaozhuConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    /// Create a client that logs in with the given credentials against the
    /// default server.
    pub fn with_credentials(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::builder(HaozhuConfig::default())
            .username(username)
            .password(password)
            .build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(config: HaozhuConfig) -> HaozhuClientBuilder {
        HaozhuClientBuilder::new(config)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &HaozhuConfig {
        &self.config
    }

    // ==================== Session ====================

    /// Open the HTTP session if it is not open yet.
    pub fn open(&mut self) -> Result<()> {
        self.ensure_session().map(|_| ())
    }

    /// Returns true if the HTTP session is open.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Release the HTTP session. Safe to call any number of times, including
    /// on a client that never opened one.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            #[cfg(test)]
            self.sessions_closed
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

            #[cfg(feature = "tracing")]
            debug!("HaoZhu session closed");
        }
    }

    /// Run `f` with an open session and close the session afterwards.
    ///
    /// The session is released exactly once whatever `f` returns. If `f`
    /// panics, the client is dropped during unwinding, which closes it
    /// instead. On the normal path the `close()` run by `Drop` finds no
    /// session and does nothing.
    pub async fn scope<F, T, E>(mut self, f: F) -> std::result::Result<T, E>
    where
        F: AsyncFnOnce(&mut HaozhuClient) -> std::result::Result<T, E>,
        E: From<HaozhuError>,
    {
        self.open()?;
        let result = f(&mut self).await;
        self.close();
        result
    }

    fn ensure_session(&mut self) -> Result<&ClientWithMiddleware> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session = match &self.http_client {
                    Some(client) => client.clone(),
                    None => {
                        let client = reqwest::Client::builder()
                            .timeout(self.config.timeout)
                            .build()
                            .map_err(HaozhuError::BuildHttpClient)?;
                        ClientBuilder::new(client).build()
                    }
                };

                #[cfg(feature = "tracing")]
                debug!(server = %self.config.server, "HaoZhu session opened");

                session
            }
        };

        Ok(self.session.insert(session))
    }

    // ==================== Token ====================

    /// Current token. Empty until login succeeds or a token is set.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Returns true if a token is held.
    pub fn is_authenticated(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }

    /// Replace the held token.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = SecretString::from(token.into());
    }

    /// Return the held token, logging in first if there is none.
    ///
    /// A token is assumed valid until replaced; an authentication error
    /// from a later call does not clear it.
    pub async fn ensure_token(&mut self) -> Result<String> {
        if !self.is_authenticated() {
            return self.login().await;
        }
        Ok(self.token.expose_secret().to_string())
    }

    // ==================== Dispatch ====================

    /// Build the request URL: `api` first, then every present parameter in
    /// the given order.
    pub fn build_request_url(
        &self,
        api: &str,
        params: &[(&'static str, Option<String>)],
    ) -> Result<Url> {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 1);
        pairs.push(("api", api));
        pairs.extend(
            params
                .iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v))),
        );
        let query = serde_urlencoded::to_string(&pairs).map_err(HaozhuError::BuildRequestUrl)?;

        let mut url = self.config.server.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), API_PATH);
        url.set_path(&path);
        url.set_query(Some(&query));
        Ok(url)
    }

    /// Issue `api` with retries on transport failures and decode the
    /// response envelope into `T`.
    async fn dispatch<T: DeserializeOwned>(
        &mut self,
        api: &str,
        params: Params,
        context: &str,
    ) -> Result<T> {
        let url = self.build_request_url(api, &params)?;
        let session = self.ensure_session()?.clone();
        let log_requests = self.config.log_requests;

        let text = retry(&self.config.retry, api, self.on_retry.as_ref(), || {
            send_request(&session, url.clone(), log_requests)
        })
        .await?;

        let response =
            HaozhuResponse::<T>::from_text(&text, context).map_err(HaozhuError::DeserializeJson)?;

        response.into_result().map_err(HaozhuError::Service)
    }

    // ==================== API ====================

    /// Log in and store the returned token.
    ///
    /// Fails with an authentication error, without any request, if the user
    /// name or password is empty.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::login",
            skip_all,
            fields(username = %self.config.username)
        )
    )]
    pub async fn login(&mut self) -> Result<String> {
        let username = self.config.username.clone();
        let password = self.config.password.expose_secret().to_string();

        if username.is_empty() || password.is_empty() {
            return Err(HaozhuError::Service(HaozhuServiceError::client(
                HaozhuErrorKind::Authentication,
                "username and password must not be empty",
            )));
        }

        let params: Params = vec![("user", Some(username)), ("pass", Some(password))];
        let payload: LoginPayload = self.dispatch("login", params, "login").await?;

        let token = payload.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            HaozhuError::Service(HaozhuServiceError::client(
                HaozhuErrorKind::Authentication,
                "login succeeded but no token was returned",
            ))
        })?;
        self.token = SecretString::from(token.clone());

        #[cfg(feature = "tracing")]
        {
            info!("Logged in to HaoZhu");
            Span::current().set_status(Status::Ok);
        }

        Ok(token)
    }

    /// Get the account balance and region quota.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "HaozhuClient::get_account_info", skip_all)
    )]
    pub async fn get_account_info(&mut self) -> Result<AccountInfo> {
        let token = self.ensure_token().await?;

        let payload: SummaryPayload = self
            .dispatch("getSummary", vec![("token", Some(token))], "get account info")
            .await?;

        Ok(payload.into_account_info())
    }

    /// Acquire a phone number for project `sid`.
    ///
    /// Fails with [`HaozhuErrorKind::PhoneNotAvailable`] when no number
    /// matches.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::get_phone",
            skip_all,
            fields(sid = sid, phone = tracing::field::Empty)
        )
    )]
    pub async fn get_phone(&mut self, sid: u64, options: GetPhoneOptions) -> Result<PhoneNumber> {
        let token = self.ensure_token().await?;
        let author = non_empty(options.author.as_deref()).or_else(|| self.default_author());

        let params: Params = vec![
            ("token", Some(token)),
            ("sid", Some(sid.to_string())),
            ("operator", options.carrier.map(|c| c.code().to_string())),
            ("province", options.province.map(|p| p.code().to_string())),
            ("phone_type", options.phone_type.map(|t| t.code().to_string())),
            ("prefix", non_empty(options.prefix.as_deref())),
            ("exclude_prefix", non_empty(options.exclude_prefix.as_deref())),
            ("uid", non_empty(options.uid.as_deref())),
            ("author", author),
        ];

        let payload: GetPhonePayload = self.dispatch("getPhone", params, "get phone").await?;
        let phone = payload.into_phone_number(sid, None);

        #[cfg(feature = "tracing")]
        {
            Span::current()
                .record("phone", phone.phone.as_str())
                .set_status(Status::Ok);
        }

        Ok(phone)
    }

    /// Take a specific phone number for project `sid`, e.g. to receive
    /// another message on a number used before.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::get_phone_specific",
            skip_all,
            fields(sid = sid, phone = %phone)
        )
    )]
    pub async fn get_phone_specific(
        &mut self,
        sid: u64,
        phone: &str,
        author: Option<&str>,
    ) -> Result<PhoneNumber> {
        let token = self.ensure_token().await?;
        let author = non_empty(author).or_else(|| self.default_author());

        let params: Params = vec![
            ("token", Some(token)),
            ("sid", Some(sid.to_string())),
            ("phone", Some(phone.to_string())),
            ("author", author),
        ];

        let payload: GetPhonePayload = self
            .dispatch("getPhone", params, "get specific phone")
            .await?;

        Ok(payload.into_phone_number(sid, Some(phone)))
    }

    /// Fetch the message received on `phone`.
    ///
    /// Fails with [`HaozhuErrorKind::MessageNotReady`] while nothing has
    /// arrived; callers are expected to poll. See
    /// [`HaozhuClient::wait_for_message`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::get_message",
            skip_all,
            fields(sid = sid, phone = %phone)
        )
    )]
    pub async fn get_message(&mut self, sid: u64, phone: &str) -> Result<Message> {
        let token = self.ensure_token().await?;

        let params: Params = vec![
            ("token", Some(token)),
            ("sid", Some(sid.to_string())),
            ("phone", Some(phone.to_string())),
        ];

        let payload: GetMessagePayload = self
            .dispatch("getMessage", params, "get message")
            .await?;
        let message = payload.into_message(sid, phone);

        #[cfg(feature = "tracing")]
        if !message.yzm.is_empty() {
            Span::current().set_status(Status::Ok);
        }

        Ok(message)
    }

    /// Poll [`HaozhuClient::get_message`] until a message arrives.
    ///
    /// Not-ready answers are retried every `poll_interval`, at most
    /// `max_polls` times in total; any other error ends the wait.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::wait_for_message",
            skip_all,
            fields(sid = sid, phone = %phone, max_polls = max_polls)
        )
    )]
    pub async fn wait_for_message(
        &mut self,
        sid: u64,
        phone: &str,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Result<Message> {
        for poll in 1..=max_polls {
            match self.get_message(sid, phone).await {
                Ok(message) => return Ok(message),
                Err(e) if e.is_message_not_ready() => {
                    #[cfg(feature = "tracing")]
                    debug!(poll = poll, max_polls = max_polls, "Message not ready yet");

                    if poll < max_polls {
                        tokio::time::sleep(poll_interval).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(HaozhuError::MessageTimeout {
            phone: phone.to_string(),
            polls: max_polls,
        })
    }

    /// Release a number so it stops receiving messages for this account.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::release_phone",
            skip_all,
            fields(sid = sid, phone = %phone)
        )
    )]
    pub async fn release_phone(&mut self, sid: u64, phone: &str) -> Result<bool> {
        let token = self.ensure_token().await?;

        let params: Params = vec![
            ("token", Some(token)),
            ("sid", Some(sid.to_string())),
            ("phone", Some(phone.to_string())),
        ];
        let _: IgnoredAny = self
            .dispatch("cancelRecv", params, "release phone")
            .await?;

        #[cfg(feature = "tracing")]
        info!(phone = %phone, "Phone released");

        Ok(true)
    }

    /// Release every number held by the account.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "HaozhuClient::release_all", skip_all)
    )]
    pub async fn release_all(&mut self) -> Result<bool> {
        let token = self.ensure_token().await?;

        let _: IgnoredAny = self
            .dispatch(
                "cancelAllRecv",
                vec![("token", Some(token))],
                "release all phones",
            )
            .await?;

        #[cfg(feature = "tracing")]
        info!("All phones released");

        Ok(true)
    }

    /// Blacklist a number so the project is never given it again.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "HaozhuClient::blacklist_phone",
            skip_all,
            fields(sid = sid, phone = %phone)
        )
    )]
    pub async fn blacklist_phone(&mut self, sid: u64, phone: &str) -> Result<bool> {
        let token = self.ensure_token().await?;

        let params: Params = vec![
            ("token", Some(token)),
            ("sid", Some(sid.to_string())),
            ("phone", Some(phone.to_string())),
        ];
        let _: IgnoredAny = self
            .dispatch("addBlacklist", params, "blacklist phone")
            .await?;

        #[cfg(feature = "tracing")]
        info!(phone = %phone, "Phone blacklisted");

        Ok(true)
    }

    fn default_author(&self) -> Option<String> {
        non_empty(self.config.author.as_deref())
    }
}

impl Drop for HaozhuClient {
    /// No-op if the session was already closed.
    fn drop(&mut self) {
        self.close();
    }
}

/// Send a GET request and return the response text.
///
/// Non-success HTTP statuses are errors. The body is returned as text so it
/// can be decoded as JSON whatever content type the server declared.
async fn send_request(
    session: &ClientWithMiddleware,
    url: Url,
    log_requests: bool,
) -> Result<String> {
    #[cfg(feature = "tracing")]
    if log_requests {
        debug!(url = %redact(&url), "HaoZhu request");
    }

    let response = session
        .get(url)
        .send()
        .await
        .map_err(HaozhuError::HttpRequest)?
        .error_for_status()
        .map_err(HaozhuError::HttpStatus)?;

    let text = response.text().await.map_err(HaozhuError::ParseResponse)?;

    #[cfg(feature = "tracing")]
    if log_requests {
        debug!(body = %text, "HaoZhu response");
    }
    #[cfg(not(feature = "tracing"))]
    let _ = log_requests;

    Ok(text)
}

/// Copy of `url` with secret query values masked.
#[cfg(feature = "tracing")]
fn redact(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if SECRET_KEYS.contains(&key.as_ref()) {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
