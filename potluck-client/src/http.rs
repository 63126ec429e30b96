use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::{
    api::{
        self, AuthToken, Comment, InteractionKind, NewComment, NewSession, Reaction,
        ReactionToggle, Session, Target, TargetSummary, Toggled,
    },
    Remote, RemoteError,
};

/// Number of times a read is retried on transient failures
pub const MAX_RETRIES: u32 = 3;

/// Talks to the backend's REST api.
///
/// Reads go through a client that retries transient failures. Writes do not: toggles
/// are not idempotent, and a retried like after a lost answer would undo itself.
#[derive(Clone)]
pub struct HttpRemote {
    fetcher: ClientWithMiddleware,
    sender: ClientWithMiddleware,
    host: String,
    token: Option<AuthToken>,
}

impl HttpRemote {
    pub fn new(host: String, token: Option<AuthToken>) -> HttpRemote {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let fetcher = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        let sender = ClientBuilder::new(reqwest::Client::new()).build();
        HttpRemote {
            fetcher,
            sender,
            host: String::from(host.trim_end_matches('/')),
            token,
        }
    }

    pub async fn auth(&self, session: &NewSession) -> Result<Session, RemoteError> {
        session.validate()?;
        let resp = self
            .sender
            .post(self.url("auth"))
            .json(session)
            .send()
            .await;
        parse(resp, "auth").await
    }

    /// Same remote, acting as the user of `session`
    pub fn with_session(&self, session: &Session) -> HttpRemote {
        HttpRemote {
            token: Some(session.token),
            ..self.clone()
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.host, path)
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(token) => req.bearer_auth(token.0),
            None => req,
        }
    }
}

async fn read(
    resp: Result<reqwest::Response, reqwest_middleware::Error>,
    what: &str,
) -> Result<Vec<u8>, RemoteError> {
    let resp = resp.with_context(|| format!("sending {what} request"))?;
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .with_context(|| format!("reading {what} response"))?
        .to_vec();
    if status.is_success() {
        return Ok(body);
    }
    match api::Error::parse(&body) {
        Ok(err) => Err(RemoteError::Api(err)),
        Err(err) => Err(RemoteError::Transport(
            err.context(format!("{what} failed with status {status}")),
        )),
    }
}

async fn parse<R>(
    resp: Result<reqwest::Response, reqwest_middleware::Error>,
    what: &str,
) -> Result<R, RemoteError>
where
    R: for<'de> serde::Deserialize<'de>,
{
    let body = read(resp, what).await?;
    Ok(serde_json::from_slice(&body).with_context(|| format!("parsing {what} response"))?)
}

#[async_trait(?Send)]
impl Remote for HttpRemote {
    async fn fetch_summary(&self, target: Target) -> Result<TargetSummary, RemoteError> {
        let req = self.authed(self.fetcher.get(self.url(&target.api_path())));
        parse(req.send().await, "summary").await
    }

    async fn fetch_comments(&self, target: Target) -> Result<Vec<Comment>, RemoteError> {
        let path = format!("{}/comments", target.api_path());
        let req = self.authed(self.fetcher.get(self.url(&path)));
        parse(req.send().await, "comments").await
    }

    async fn post_comment(&self, target: Target, c: NewComment) -> Result<Comment, RemoteError> {
        let path = format!("{}/comments", target.api_path());
        let req = self.authed(self.sender.post(self.url(&path))).json(&c);
        parse(req.send().await, "post comment").await
    }

    async fn toggle_interaction(
        &self,
        kind: InteractionKind,
        target: Target,
    ) -> Result<Option<Toggled>, RemoteError> {
        let path = format!("{}/{}", target.api_path(), kind.path_segment());
        let req = self.authed(self.sender.post(self.url(&path)));
        let body = read(req.send().await, kind.path_segment()).await?;
        if body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body).with_context(|| {
            format!("parsing {} response", kind.path_segment())
        })?))
    }

    async fn toggle_reaction(
        &self,
        target: Target,
        r: ReactionToggle,
    ) -> Result<Vec<Reaction>, RemoteError> {
        let path = format!("{}/reactions", target.api_path());
        let req = self.authed(self.sender.post(self.url(&path))).json(&r);
        parse(req.send().await, "reaction").await
    }
}
