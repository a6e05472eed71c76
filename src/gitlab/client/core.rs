use log::{debug, info};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::Token;
use crate::error::{LabError, Result};
use crate::gitlab::timer::ScopedTimer;
use crate::gitlab::types::CurrentUser;

pub(super) const PAGE_SIZE: usize = 100;
const NEXT_PAGE_HEADER: &str = "x-next-page";

pub(crate) type Query<'a> = [(&'a str, String)];

/// An authenticated connection to one GitLab instance.
///
/// The only way to obtain a `Session` is [`Session::connect`], which verifies
/// the token with a round-trip, so every resource operation runs against a
/// credential that was valid at startup.
pub struct Session {
    client: Client,
    api_url: Url,
    token: Token,
    user: CurrentUser,
}

/// What the pagination headers say about the page after the current one.
#[derive(Debug, PartialEq, Eq)]
enum NextPage {
    Page(usize),
    Last,
    Unknown,
}

impl Session {
    /// Authenticates against `base_url` with `token`.
    ///
    /// Performs exactly one `GET /user`. Any failure, including an unreachable
    /// host, is reported as [`LabError::Auth`].
    pub async fn connect(base_url: &str, token: Token) -> Result<Self> {
        if token.is_empty() {
            return Err(LabError::Auth("no private token configured".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("labdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LabError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = api_base_url(base_url)?;
        let user_url = api_url
            .join("user")
            .map_err(|e| LabError::Config(format!("Invalid API URL: {e}")))?;

        let _timer = ScopedTimer::operation("connect");

        let response = client
            .get(user_url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| LabError::Auth(format!("could not reach {base_url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(LabError::Auth(format!("status {}: {body}", status.as_u16())));
        }

        let user: CurrentUser = response
            .json()
            .await
            .map_err(|e| LabError::Auth(format!("unexpected response from /user: {e}")))?;

        info!("Authenticated to {base_url} as {}", user.username);

        Ok(Self {
            client,
            api_url,
            token,
            user,
        })
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Instance root, e.g. `https://gitlab.com`
    pub fn instance_url(&self) -> String {
        self.api_url.origin().ascii_serialization()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| LabError::Config(format!("Invalid API path '{path}': {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.endpoint(path)?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(self.token.as_str()))
    }

    /// Sends a request and turns non-2xx statuses into errors.
    async fn send(&self, request: RequestBuilder, method: &Method, path: &str) -> Result<Response> {
        let _timer = ScopedTimer::request(format!("{method} {path}"));

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        if status == StatusCode::NOT_FOUND {
            Err(LabError::NotFound {
                resource: path.to_string(),
                message,
            })
        } else {
            Err(LabError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub(crate) async fn get<T>(&self, path: &str, query: &Query<'_>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut request = self.request(Method::GET, path)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request, &Method::GET, path).await?;
        Ok(response.json().await?)
    }

    /// Fetches every page of a collection endpoint.
    ///
    /// Follows `x-next-page` until it is empty. When the header is missing
    /// altogether, a short page marks the end.
    pub(crate) async fn get_all<T>(&self, path: &str, query: &Query<'_>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PAGE_SIZE.to_string()));
            params.push(("page", page.to_string()));

            let request = self.request(Method::GET, path)?.query(&params);
            let response = self.send(request, &Method::GET, path).await?;
            let next = next_page(&response);

            let batch: Vec<T> = response.json().await?;
            let fetched = batch.len();
            items.extend(batch);

            debug!("{path}: page {page} returned {fetched} items");

            match next {
                NextPage::Page(n) if n > page => page = n,
                NextPage::Page(_) | NextPage::Last => break,
                NextPage::Unknown if fetched < PAGE_SIZE => break,
                NextPage::Unknown => page += 1,
            }
        }

        Ok(items)
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.json(body);
        let response = self.send(request, &Method::POST, path).await?;
        Ok(response.json().await?)
    }

    /// Like [`Session::post`] for endpoints whose response body is not needed.
    pub(crate) async fn post_discard<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(Method::POST, path)?.json(body);
        self.send(request, &Method::POST, path).await?;
        Ok(())
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path)?.json(body);
        let response = self.send(request, &Method::PUT, path).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path)?;
        self.send(request, &Method::DELETE, path).await?;
        Ok(())
    }
}

fn api_base_url(base_url: &str) -> Result<Url> {
    let mut base =
        Url::parse(base_url).map_err(|e| LabError::Config(format!("Invalid base URL: {e}")))?;

    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join("api/v4/")
        .map_err(|e| LabError::Config(format!("Invalid API base URL: {e}")))
}

fn next_page(response: &Response) -> NextPage {
    match response.headers().get(NEXT_PAGE_HEADER) {
        None => NextPage::Unknown,
        Some(value) => value
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
            .map_or(NextPage::Last, NextPage::Page),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use mockito::ServerGuard;

    use super::Session;
    use crate::auth::Token;

    pub(crate) const USER_JSON: &str = r#"{"id":1,"username":"root","name":"Administrator"}"#;

    /// Connects a session to a mock server that accepts the test token.
    pub(crate) async fn connected(server: &mut ServerGuard) -> Session {
        let _user = server
            .mock("GET", "/api/v4/user")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_JSON)
            .create_async()
            .await;

        Session::connect(&server.url(), Token::from("test-token"))
            .await
            .unwrap()
    }

    /// JSON array of `count` groups with ids starting at `first_id`.
    pub(crate) fn groups_json(first_id: u64, count: u64) -> String {
        let groups: Vec<String> = (first_id..first_id + count)
            .map(|id| {
                format!(r#"{{"id":{id},"name":"group-{id}","path":"group-{id}","full_path":"root/group-{id}","parent_id":1}}"#)
            })
            .collect();
        format!("[{}]", groups.join(","))
    }

    /// JSON array of `count` projects with ids starting at `first_id`.
    pub(crate) fn projects_json(first_id: u64, count: u64) -> String {
        let projects: Vec<String> = (first_id..first_id + count)
            .map(|id| format!(r#"{{"id":{id},"name":"project-{id}","name_with_namespace":"Team / project-{id}"}}"#))
            .collect();
        format!("[{}]", projects.join(","))
    }
}
