use percent_encoding::percent_decode_str;
use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::request::{Compression, DataType, OrderRequest};
use crate::sources::collection_folder;

/// Tokens returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderToken {
    #[serde(rename = "userIP")]
    pub user_ip: String,
    #[serde(rename = "zipFile", deserialize_with = "string_or_number")]
    pub zip_file: String,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number for zipFile, got {other}"
        ))),
    }
}

pub fn archive_name(data_type: DataType, zip_file: &str, compression: Compression) -> String {
    format!("{}_{}.{}", data_type.as_str(), zip_file, compression.as_str())
}

/// Location the portal publishes an ordered archive at:
/// `{base}/{userIP}/temp/{folder}/{dataType}_{zipFile}.{ext}`.
///
/// Token values are inserted verbatim.
pub fn file_url(
    download_base: &str,
    token: &OrderToken,
    data_type: DataType,
    compression: Compression,
) -> String {
    format!(
        "{}/{}/temp/{}/{}",
        download_base.trim_end_matches('/'),
        token.user_ip,
        collection_folder(data_type),
        archive_name(data_type, &token.zip_file, compression)
    )
}

pub fn order_url(endpoint: &str, req: &OrderRequest) -> Result<Url> {
    let params = [
        ("startDate", req.normalized_start()),
        ("endDate", req.normalized_end()),
        ("timestep", req.timestep.as_str()),
        ("timestepAlt", req.timestep.code()),
        ("dataType", req.data_type.as_str()),
        ("format", req.file_format.as_str()),
        ("compression", req.compression.as_str()),
    ];
    Url::parse_with_params(endpoint, params)
        .map_err(|e| Error::order(format!("bad order endpoint {endpoint}")).with_source(e))
}

/// Activation uses the dates exactly as the caller supplied them.
pub fn activation_url(
    endpoint: &str,
    req: &OrderRequest,
    file_url: &str,
    mailid: &str,
) -> Result<Url> {
    let params = [
        ("email", mailid),
        ("downloadLink", file_url),
        ("fileExtension", req.compression.as_str()),
        ("dataType", req.data_type.as_str()),
        ("startDate", req.start.as_str()),
        ("endDate", req.end.as_str()),
        ("timestep", req.timestep.as_str()),
        ("domain", "wholemap"),
        ("domain_parameter", "undefined"),
    ];
    Url::parse_with_params(endpoint, params).map_err(|e| {
        Error::activation(format!("bad activation endpoint {endpoint}")).with_source(e)
    })
}

/// Last non-empty path segment of `url`, percent-decoded, ignoring any query
/// string.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?;
    let name = percent_decode_str(segment).decode_utf8_lossy().into_owned();
    // A decoded `/` would escape the download directory.
    if name.contains('/') || name.contains('\\') || name == ".." || name == "." {
        return None;
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{FileFormat, Timestep};

    const BASE: &str = "https://chrsdata.eng.uci.edu/userFile";

    fn token(ip: &str, zip: &str) -> OrderToken {
        OrderToken {
            user_ip: ip.to_string(),
            zip_file: zip.to_string(),
        }
    }

    #[test]
    fn file_url_for_ccs() {
        assert_eq!(
            file_url(BASE, &token("1.2.3.4", "abc"), DataType::Ccs, Compression::Zip),
            format!("{BASE}/1.2.3.4/temp/PERSIANN-CCS/CCS_abc.zip")
        );
    }

    #[test]
    fn file_url_trims_base_slash() {
        assert_eq!(
            file_url("http://h/userFile/", &token("9.9.9.9", "xyz"), DataType::Pdir, Compression::Zip),
            "http://h/userFile/9.9.9.9/temp/PDIR/PDIR_xyz.zip"
        );
    }

    #[test]
    fn file_url_inserts_token_values_verbatim() {
        assert_eq!(
            file_url("http://h/userFile", &token("{folder}", "{base}"), DataType::Ccs, Compression::Zip),
            "http://h/userFile/{folder}/temp/PERSIANN-CCS/CCS_{base}.zip"
        );
    }

    #[test]
    fn token_accepts_numeric_zip_file() {
        let t: OrderToken =
            serde_json::from_str(r#"{"userIP":"1.2.3.4","zipFile":1618033,"extra":true}"#).unwrap();
        assert_eq!(t, token("1.2.3.4", "1618033"));

        let missing = serde_json::from_str::<OrderToken>(r#"{"userIP":"1.2.3.4"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn order_url_uses_normalized_dates() {
        let req = OrderRequest::new(
            "2021010100",
            "2021010300",
            DataType::Pdir,
            FileFormat::Tif,
            Timestep::Daily,
            Compression::Zip,
        );
        let url = order_url("https://example.org/php/downloadWholeData.php", &req).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let expected = [
            ("startDate", "20210101"),
            ("endDate", "20210103"),
            ("timestep", "daily"),
            ("timestepAlt", "1d"),
            ("dataType", "PDIR"),
            ("format", "Tif"),
            ("compression", "zip"),
        ];
        assert_eq!(pairs.len(), expected.len());
        for ((k, v), (ek, ev)) in pairs.iter().zip(expected) {
            assert_eq!((k.as_str(), v.as_str()), (ek, ev));
        }
    }

    #[test]
    fn activation_url_carries_link_and_fixed_domain() {
        let req = OrderRequest::new(
            "2021010100",
            "2021010300",
            DataType::Ccs,
            FileFormat::Tif,
            Timestep::Monthly,
            Compression::Zip,
        );
        let link = format!("{BASE}/1.2.3.4/temp/PERSIANN-CCS/CCS_abc.zip");
        let url = activation_url(
            "https://example.org/php/emailDownload.php",
            &req,
            &link,
            "me@example.org",
        )
        .unwrap();
        let get = |key: &str| {
            url.query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        };
        assert_eq!(get("downloadLink").as_deref(), Some(link.as_str()));
        assert_eq!(get("startDate").as_deref(), Some("2021010100"));
        assert_eq!(get("domain").as_deref(), Some("wholemap"));
        assert_eq!(get("domain_parameter").as_deref(), Some("undefined"));
        assert_eq!(get("fileExtension").as_deref(), Some("zip"));
    }

    #[test]
    fn file_name_is_last_segment() {
        assert_eq!(
            file_name_from_url("http://h/userFile/9.9.9.9/temp/PDIR/PDIR_xyz.zip?x=1").as_deref(),
            Some("PDIR_xyz.zip")
        );
        assert_eq!(file_name_from_url("http://h/").as_deref(), None);
        assert_eq!(file_name_from_url("not a url"), None);
    }

    #[test]
    fn file_name_is_percent_decoded() {
        assert_eq!(
            file_name_from_url("http://h/userFile/9.9.9.9/temp/PDIR/PDIR_a%20b.zip").as_deref(),
            Some("PDIR_a b.zip")
        );
        let link = file_url(
            "http://h/userFile",
            &token("9.9.9.9", "a b"),
            DataType::Pdir,
            Compression::Zip,
        );
        assert_eq!(file_name_from_url(&link).as_deref(), Some("PDIR_a b.zip"));
        assert_eq!(file_name_from_url("http://h/temp/..%2F..%2Fetc"), None);
    }
}
