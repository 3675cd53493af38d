use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::load_options;
use crate::download::{resolve_dir, write_atomic, write_direct};
use crate::error::{Error, Result, Stage};
use crate::request::{DataType, FetchParams, OrderRequest};
use crate::sources::Endpoints;
use crate::url_builder::{OrderToken, activation_url, file_name_from_url, file_url, order_url};

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub endpoints: Endpoints,
    pub user_agent: String,
    /// Limit for the order and activation calls.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Limit for a whole archive transfer. `None` waits indefinitely.
    pub download_timeout: Option<Duration>,
    /// Stream into a temporary file and rename it into place once complete.
    pub atomic_downloads: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            user_agent: format!("chrs-persiann-rs/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
            download_timeout: None,
            atomic_downloads: true,
        }
    }
}

impl ClientOptions {
    /// Defaults overridden by `CHRS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        load_options()
    }
}

/// A downloaded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub path: PathBuf,
    pub file_url: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct Client {
    opts: ClientOptions,
    http: HttpClient,
}

impl Client {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        for (name, value) in [
            ("order endpoint", &opts.endpoints.order),
            ("activation endpoint", &opts.endpoints.activation),
            ("download base", &opts.endpoints.download_base),
        ] {
            Url::parse(value).map_err(|e| Error::Config(format!("{name} {value:?}: {e}")))?;
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&opts.user_agent)
                .map_err(|e| Error::Config(format!("user agent {:?}: {e}", opts.user_agent)))?,
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .connect_timeout(opts.connect_timeout)
            .timeout(opts.download_timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { opts, http })
    }

    /// Client for the public portal with default options.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    /// Client configured from `CHRS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::from_env()?)
    }

    pub fn options(&self) -> &ClientOptions {
        &self.opts
    }

    pub fn get_persiann(&self, params: &FetchParams) -> Result<Download> {
        self.fetch(DataType::Persiann, params)
    }

    pub fn get_persiann_ccs(&self, params: &FetchParams) -> Result<Download> {
        self.fetch(DataType::Ccs, params)
    }

    pub fn get_persiann_cdr(&self, params: &FetchParams) -> Result<Download> {
        self.fetch(DataType::Cdr, params)
    }

    pub fn get_pdir(&self, params: &FetchParams) -> Result<Download> {
        self.fetch(DataType::Pdir, params)
    }

    pub fn fetch(&self, data_type: DataType, params: &FetchParams) -> Result<Download> {
        self.fetch_data(data_type.as_str(), params)
    }

    /// Place an order, activate its download link and stream the archive into
    /// `params.download_path`.
    ///
    /// Stages run strictly in sequence, the first failure ends the call and nothing
    /// is retried. The returned error records the failing stage (see [`Error::stage`]).
    pub fn fetch_data(&self, data_type: &str, params: &FetchParams) -> Result<Download> {
        info!(
            start = %params.start,
            end = %params.end,
            timestep = %params.timestep,
            data_type,
            file_format = %params.file_format,
            compression = %params.compression,
            download_path = %params.download_path.display(),
            "querying data and placing the order"
        );

        let result = self.run_stages(data_type, params);
        match &result {
            Ok(download) => info!(
                path = %download.path.display(),
                bytes = download.size_bytes,
                "download complete"
            ),
            Err(e) => match e.stage() {
                Some(stage) => warn!(%stage, error = %e, "fetch failed"),
                None => warn!(error = %e, "fetch failed"),
            },
        }
        result
    }

    fn run_stages(&self, data_type: &str, params: &FetchParams) -> Result<Download> {
        enter(Stage::Validating);
        let req = params.order_request(data_type)?;

        enter(Stage::Ordering);
        let token = self.place_order(&req)?;
        info!(user_ip = %token.user_ip, zip_file = %token.zip_file, "order placed");

        enter(Stage::Resolving);
        let file_url = self.generate_url(&req, &token, &params.mailid)?;

        enter(Stage::Downloading);
        let download = self.download(&file_url, &params.download_path)?;

        enter(Stage::Done);
        Ok(download)
    }

    /// Submit the order. The portal compiles the archive asynchronously and
    /// answers with the tokens that locate it.
    pub fn place_order(&self, req: &OrderRequest) -> Result<OrderToken> {
        let url = order_url(&self.opts.endpoints.order, req)?;
        debug!(%url, "submitting order");

        let resp = self
            .http
            .get(url)
            .timeout(self.opts.request_timeout)
            .send()
            .map_err(|e| Error::order("request failed").with_source(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::order(format!("HTTP {status}")));
        }

        let text = resp
            .text()
            .map_err(|e| Error::order("failed to read response").with_source(e))?;
        serde_json::from_str::<OrderToken>(&text)
            .map_err(|e| Error::order(format!("unexpected response {text:?}")).with_source(e))
    }

    /// Compute the archive URL for `token` and have the portal activate it.
    ///
    /// Activation also makes the portal email `mailid`. The URL is only returned
    /// once activation succeeded.
    pub fn generate_url(
        &self,
        req: &OrderRequest,
        token: &OrderToken,
        mailid: &str,
    ) -> Result<String> {
        let link = file_url(
            &self.opts.endpoints.download_base,
            token,
            req.data_type,
            req.compression,
        );
        let url = activation_url(&self.opts.endpoints.activation, req, &link, mailid)?;
        debug!(%url, "activating download link");

        let resp = self
            .http
            .get(url)
            .timeout(self.opts.request_timeout)
            .send()
            .map_err(|e| Error::activation("request failed").with_source(e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::activation(format!("HTTP {status}")));
        }

        info!(file_url = %link, "file url generated");
        Ok(link)
    }

    /// Stream `file_url` into `dir`, naming the file after the URL's last path
    /// segment. `dir` may start with `~` and is created if missing.
    pub fn download(&self, file_url: &str, dir: &Path) -> Result<Download> {
        let name = file_name_from_url(file_url)
            .ok_or_else(|| Error::download(format!("no file name in url {file_url}"), None))?;
        let dir = resolve_dir(dir)?;
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::download(format!("cannot create directory {}", dir.display()), None).with_source(e)
        })?;
        let path = dir.join(name);
        info!(path = %path.display(), "downloading compressed data file");

        let mut resp = self
            .http
            .get(file_url)
            .send()
            .map_err(|e| Error::download("request failed", None).with_source(e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::download(format!("HTTP {status} for {file_url}"), None));
        }

        let size_bytes = if self.opts.atomic_downloads {
            write_atomic(&mut resp, &path)?
        } else {
            write_direct(&mut resp, &path)?
        };

        Ok(Download {
            path,
            file_url: file_url.to_string(),
            size_bytes,
        })
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "entering stage");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn rejects_unparseable_endpoints() {
        let opts = ClientOptions {
            endpoints: Endpoints {
                order: "not a url".to_string(),
                ..Endpoints::default()
            },
            ..ClientOptions::default()
        };
        assert!(matches!(Client::new(opts), Err(Error::Config(_))));
    }

    #[test]
    fn default_options() {
        let opts = ClientOptions::default();
        assert_eq!(opts.endpoints, Endpoints::default());
        assert!(opts.atomic_downloads);
        assert!(opts.download_timeout.is_none());
        assert!(opts.user_agent.starts_with("chrs-persiann-rs/"));
    }

    #[test]
    fn invalid_collection_fails_before_any_request() {
        // Unroutable endpoints: reaching the network would surface as OrderFailed.
        let opts = ClientOptions {
            endpoints: Endpoints::from_portal("http://127.0.0.1:9"),
            ..ClientOptions::default()
        };
        let client = Client::new(opts).unwrap();
        let params = FetchParams::new("2021010100", "2021010300", "a@b.c", "/nonexistent");

        let err = client.fetch_data("GPM", &params).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Validating));
    }
}
