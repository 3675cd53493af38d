use std::time::Duration;

use crate::client::ClientOptions;
use crate::error::{Error, Result};
use crate::sources::{Endpoints, is_http_url};

pub const ENV_PORTAL_URL: &str = "CHRS_PORTAL_URL";
pub const ENV_ORDER_URL: &str = "CHRS_ORDER_URL";
pub const ENV_ACTIVATION_URL: &str = "CHRS_ACTIVATION_URL";
pub const ENV_DOWNLOAD_BASE: &str = "CHRS_DOWNLOAD_BASE";
pub const ENV_TIMEOUT: &str = "CHRS_TIMEOUT";
pub const ENV_DOWNLOAD_TIMEOUT: &str = "CHRS_DOWNLOAD_TIMEOUT";

/// Layer environment variables over [`ClientOptions::default`].
pub(crate) fn load_options() -> Result<ClientOptions> {
    options_from(|key| std::env::var(key).ok())
}

/// Same as [`load_options`] with an injectable variable source.
pub(crate) fn options_from<F>(lookup: F) -> Result<ClientOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let mut opts = ClientOptions::default();
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(portal) = var(ENV_PORTAL_URL) {
        check_url(ENV_PORTAL_URL, &portal)?;
        opts.endpoints = Endpoints::from_portal(&portal);
    }
    if let Some(order) = var(ENV_ORDER_URL) {
        check_url(ENV_ORDER_URL, &order)?;
        opts.endpoints.order = order;
    }
    if let Some(activation) = var(ENV_ACTIVATION_URL) {
        check_url(ENV_ACTIVATION_URL, &activation)?;
        opts.endpoints.activation = activation;
    }
    if let Some(base) = var(ENV_DOWNLOAD_BASE) {
        check_url(ENV_DOWNLOAD_BASE, &base)?;
        opts.endpoints.download_base = base;
    }

    if let Some(secs) = var(ENV_TIMEOUT) {
        opts.request_timeout = Duration::from_secs(parse_secs(ENV_TIMEOUT, &secs)?);
    }
    if let Some(secs) = var(ENV_DOWNLOAD_TIMEOUT) {
        // 0 disables the limit.
        opts.download_timeout = match parse_secs(ENV_DOWNLOAD_TIMEOUT, &secs)? {
            0 => None,
            n => Some(Duration::from_secs(n)),
        };
    }

    Ok(opts)
}

fn check_url(key: &str, value: &str) -> Result<()> {
    if is_http_url(value) {
        Ok(())
    } else {
        Err(Error::Config(format!("{key} must be an http(s) URL, got {value:?}")))
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a number of seconds, got {value:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ClientOptions> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        options_from(|k| env.get(k).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let opts = from_pairs(&[]).unwrap();
        assert_eq!(opts.endpoints, Endpoints::default());
        assert_eq!(opts.request_timeout, ClientOptions::default().request_timeout);
        assert!(opts.download_timeout.is_none());
    }

    #[test]
    fn specific_endpoint_overrides_portal() {
        let opts = from_pairs(&[
            (ENV_PORTAL_URL, "http://mirror.local"),
            (ENV_DOWNLOAD_BASE, "http://files.local/userFile"),
        ])
        .unwrap();
        assert_eq!(opts.endpoints.order, "http://mirror.local/php/downloadWholeData.php");
        assert_eq!(opts.endpoints.download_base, "http://files.local/userFile");
    }

    #[test]
    fn timeouts_parse_as_seconds() {
        let opts = from_pairs(&[(ENV_TIMEOUT, "15"), (ENV_DOWNLOAD_TIMEOUT, "600")]).unwrap();
        assert_eq!(opts.request_timeout, Duration::from_secs(15));
        assert_eq!(opts.download_timeout, Some(Duration::from_secs(600)));

        let opts = from_pairs(&[(ENV_DOWNLOAD_TIMEOUT, "0")]).unwrap();
        assert!(opts.download_timeout.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            from_pairs(&[(ENV_TIMEOUT, "soon")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            from_pairs(&[(ENV_ORDER_URL, "ftp://x/order.php")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn blank_values_are_ignored() {
        let opts = from_pairs(&[(ENV_PORTAL_URL, "  ")]).unwrap();
        assert_eq!(opts.endpoints, Endpoints::default());
    }
}
