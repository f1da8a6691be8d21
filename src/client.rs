use crate::config::PortalConfig;
use crate::crypto;
use crate::error::{DakaError, Result};
use crate::form;
use crate::models::{FormState, PubKey, SubmitResponse, UserConfig, default_old_info};
use crate::parsers;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, USER_AGENT};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// The SSO page title; still present in the response body after a POST
/// means the credentials were rejected (the portal answers 200 either way).
const AUTH_BANNER: &str = "统一身份认证";

/// One user's check-in session: login, home-page fetch, payload build,
/// submit. Owns the cookie jar for the whole run and is discarded after.
pub struct DakaClient {
    client: reqwest::Client,
    portal: PortalConfig,
    user: UserConfig,
    info: Option<FormState>,
}

impl DakaClient {
    pub fn new(user: UserConfig, portal: PortalConfig) -> Self {
        let cookie_jar = Arc::new(Jar::default());

        // The portal sniffs for browsers; a bare reqwest UA gets bounced.
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36"
                .parse()
                .unwrap(),
        );

        let client = reqwest::Client::builder()
            .cookie_provider(cookie_jar)
            .default_headers(headers)
            .build()
            .unwrap();

        Self {
            client,
            portal,
            user,
            info: None,
        }
    }

    /// Logs into the unified identity platform.
    pub async fn login(&self) -> Result<()> {
        // --- STEP 1: GET the login page to get the "execution" token ---
        let response = self.client.get(&self.portal.login_url).send().await?;

        // The CAS service redirect is folded into the response URL; POST back to it.
        let login_action_url = response.url().clone();

        let response_text = response.text().await?;
        let document = Html::parse_document(&response_text);

        let token_selector = Selector::parse("input[name=\"execution\"]").unwrap();

        let execution_token = document
            .select(&token_selector)
            .next()
            .and_then(|element| element.value().attr("value"))
            .ok_or(DakaError::TokenNotFound)?
            .to_string();
        drop(document);

        // --- STEP 2: fetch the session public key and encrypt the password ---
        let pubkey: PubKey = self
            .client
            .get(&self.portal.pubkey_url)
            .send()
            .await?
            .json()
            .await?;
        debug!(user = %self.user.label, "fetched session public key");

        let encrypted_password =
            crypto::rsa_encrypt(&self.user.password, &pubkey.exponent, &pubkey.modulus)?;

        // --- STEP 3: POST credentials with all hidden fields ---
        let mut params = HashMap::new();
        params.insert("username", self.user.username.as_str());
        params.insert("password", encrypted_password.as_str());
        params.insert("execution", execution_token.as_str());
        params.insert("_eventId", "submit");

        let response = self
            .client
            .post(login_action_url)
            .form(&params)
            .send()
            .await?;

        // --- STEP 4: the portal returns 200 on failure too; check the body ---
        let body = response.text().await?;
        if body.contains(AUTH_BANNER) {
            return Err(DakaError::LoginFailed);
        }

        debug!(user = %self.user.label, "login accepted, session cookies set");
        Ok(())
    }

    /// Fetches the check-in home page (unless `html` is supplied), scrapes
    /// the embedded state, and builds the submission payload. The payload
    /// is retained as the session's current state and returned.
    pub async fn get_info(&mut self, html: Option<String>) -> Result<FormState> {
        let html = match html {
            Some(html) => html,
            None => {
                self.client
                    .get(&self.portal.base_url)
                    .send()
                    .await?
                    .text()
                    .await?
            }
        };

        let old_info = match parsers::checkin::parse_old_info(&html)? {
            Some(old_info) => old_info,
            None => {
                debug!(user = %self.user.label, "no cached submission on the page, using the built-in default");
                default_old_info()
            }
        };

        let def = parsers::checkin::parse_def(&html)?;
        let id = def
            .get("id")
            .cloned()
            .ok_or(DakaError::FieldMissing("def", "id"))?;

        let payload = form::build_payload(old_info, id, &self.user)?;
        self.info = Some(payload.clone());
        Ok(payload)
    }

    /// Shallow-merges `overrides` into the held payload. Keys already
    /// present are overwritten; nothing is re-derived.
    pub fn set_info(&mut self, overrides: FormState) {
        if let Some(info) = self.info.as_mut() {
            for (key, value) in overrides {
                info.insert(key, value);
            }
        }
    }

    /// The payload as it would be submitted right now.
    pub fn info(&self) -> Option<&FormState> {
        self.info.as_ref()
    }

    /// POSTs the held payload to the submit endpoint and returns the
    /// server's verdict verbatim; the caller decides what `e`/`m` mean.
    pub async fn post(&self) -> Result<SubmitResponse> {
        let info = self.info.as_ref().ok_or(DakaError::InfoNotFetched)?;

        let response = self
            .client
            .post(&self.portal.save_url)
            .form(info)
            .send()
            .await?;

        Ok(response.json().await?)
    }
}
