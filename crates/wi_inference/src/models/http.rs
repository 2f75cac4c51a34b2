use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use wi_core::{ClassificationModel, Error, RawClassification, Result, SummarizationModel};

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    text: [&'a str; 1],
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    result: Vec<RawClassification>,
}

#[derive(Serialize)]
struct SummarizeNews<'a> {
    title: &'a str,
    description: &'a str,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    news: SummarizeNews<'a>,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    #[serde(default)]
    summary: String,
}

async fn post_json<Req, Resp>(client: &Client, gateway: &str, url: &str, body: &Req) -> Result<Resp>
where
    Req: Serialize + ?Sized,
    Resp: for<'de> Deserialize<'de>,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| Error::from_gateway(gateway, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::from_gateway_status(gateway, status));
    }

    response
        .json::<Resp>()
        .await
        .map_err(|e| Error::from_gateway(gateway, e))
}

/// Importance classifier served over HTTP (`POST {"text": [..]}`).
pub struct HttpClassifier {
    client: Client,
    url: String,
}

impl HttpClassifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl fmt::Debug for HttpClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClassifier")
            .field("client", &"<reqwest::Client>")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl ClassificationModel for HttpClassifier {
    fn name(&self) -> &str {
        "classifier"
    }

    async fn classify(&self, text: &str) -> Result<RawClassification> {
        let request = ClassifyRequest { text: [text] };
        let response: ClassifyResponse =
            post_json(&self.client, self.name(), &self.url, &request).await?;
        response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| Error::GatewayBadResponse {
                gateway: self.name().to_string(),
                reason: "empty result list".to_string(),
            })
    }
}

/// Summarizer served over HTTP (`POST {"news": {title, description}}`).
pub struct HttpSummarizer {
    client: Client,
    url: String,
}

impl HttpSummarizer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl fmt::Debug for HttpSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSummarizer")
            .field("client", &"<reqwest::Client>")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl SummarizationModel for HttpSummarizer {
    fn name(&self) -> &str {
        "summarizer"
    }

    async fn summarize(&self, title: &str, body: &str) -> Result<String> {
        let request = SummarizeRequest {
            news: SummarizeNews {
                title,
                description: body,
            },
        };
        let response: SummarizeResponse =
            post_json(&self.client, self.name(), &self.url, &request).await?;
        Ok(response.summary)
    }
}
