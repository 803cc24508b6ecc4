//! HTTP write transport for the InfluxDB `/write` endpoint

use bytes::Bytes;
use contracts::{ContractError, InfluxConfig};
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use backoff::{TransportError, WriteResponse, WriteTransport};

const USER_AGENT: &str = "tsbs_load_influx";

/// Builds one transport per worker
pub trait TransportFactory: Send + Sync + 'static {
    type Transport: WriteTransport + Sync + 'static;

    /// Transport used by `worker` for the whole run
    fn connect(&self, worker: usize) -> Result<Self::Transport, ContractError>;
}

/// Full write URL for one server
///
/// `{base}/write?consistency={c}&db={db}[&no_sync=true]`
pub fn write_url(base: &str, influx: &InfluxConfig) -> Result<Url, ContractError> {
    let mut url = Url::parse(&format!("{}/write", base.trim_end_matches('/')))
        .map_err(|e| ContractError::config_validation("influx.urls", format!("{base}: {e}")))?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("consistency", influx.consistency.as_str())
            .append_pair("db", &influx.database);
        if influx.no_sync {
            query.append_pair("no_sync", "true");
        }
    }
    Ok(url)
}

/// `Authorization` header value; a bearer token wins over a plain token
pub fn authorization(influx: &InfluxConfig) -> String {
    if influx.bearer.is_empty() {
        format!("Token {}", influx.token)
    } else {
        format!("Bearer {}", influx.bearer)
    }
}

/// Sends line-protocol bodies to one server
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: Url,
    authorization: String,
}

impl HttpTransport {
    pub fn new(client: Client, url: Url, authorization: String) -> Self {
        Self {
            client,
            url,
            authorization,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl WriteTransport for HttpTransport {
    async fn send(&self, body: Bytes, gzip: bool) -> Result<WriteResponse, TransportError> {
        let mut request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/plain")
            .header(AUTHORIZATION, &self.authorization)
            .body(body);
        if gzip {
            request = request.header(CONTENT_ENCODING, "gzip");
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(WriteResponse { status, body })
    }
}

/// Shares one connection pool across workers; worker `i` writes to `urls[i % n]`
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    client: Client,
    influx: InfluxConfig,
}

impl HttpTransportFactory {
    #[instrument(name = "http_transport_factory_new", skip(influx), fields(urls = influx.urls.len()))]
    pub fn new(influx: &InfluxConfig) -> Result<Self, ContractError> {
        if influx.urls.is_empty() {
            return Err(ContractError::config_validation(
                "influx.urls",
                "at least one url is required",
            ));
        }
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ContractError::Other(format!("http client: {e}")))?;
        Ok(Self {
            client,
            influx: influx.clone(),
        })
    }
}

impl TransportFactory for HttpTransportFactory {
    type Transport = HttpTransport;

    fn connect(&self, worker: usize) -> Result<HttpTransport, ContractError> {
        let url = write_url(self.influx.url_for_worker(worker), &self.influx)?;
        debug!(worker, url = %url, "Influx write url");
        Ok(HttpTransport::new(
            self.client.clone(),
            url,
            authorization(&self.influx),
        ))
    }
}
