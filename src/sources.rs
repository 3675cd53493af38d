use crate::request::DataType;

/// Public CHRS data portal.
pub const PORTAL_URL: &str = "https://chrsdata.eng.uci.edu";

pub const ORDER_PATH: &str = "/php/downloadWholeData.php";
pub const ACTIVATION_PATH: &str = "/php/emailDownload.php";
pub const DOWNLOAD_PATH: &str = "/userFile";

/// The three remote locations involved in an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Order submission (`downloadWholeData.php`).
    pub order: String,
    /// Link activation (`emailDownload.php`).
    pub activation: String,
    /// Root under which ordered archives are published.
    pub download_base: String,
}

impl Endpoints {
    /// Derive all endpoints from a portal root such as `https://chrsdata.eng.uci.edu`.
    pub fn from_portal(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            order: format!("{base}{ORDER_PATH}"),
            activation: format!("{base}{ACTIVATION_PATH}"),
            download_base: format!("{base}{DOWNLOAD_PATH}"),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_portal(PORTAL_URL)
    }
}

/// Folder under `temp/` where the portal publishes archives of a collection.
pub fn collection_folder(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Persiann => "PERSIANN",
        DataType::Ccs => "PERSIANN-CCS",
        DataType::Cdr => "PERSIANN-CDR",
        DataType::Pdir => "PDIR",
    }
}

pub fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoints_point_at_public_portal() {
        let e = Endpoints::default();
        assert_eq!(e.order, "https://chrsdata.eng.uci.edu/php/downloadWholeData.php");
        assert_eq!(e.activation, "https://chrsdata.eng.uci.edu/php/emailDownload.php");
        assert_eq!(e.download_base, "https://chrsdata.eng.uci.edu/userFile");
    }

    #[test]
    fn from_portal_ignores_trailing_slash() {
        assert_eq!(
            Endpoints::from_portal("http://127.0.0.1:8080/"),
            Endpoints::from_portal("http://127.0.0.1:8080")
        );
    }

    #[test]
    fn folders_per_collection() {
        assert_eq!(collection_folder(DataType::Persiann), "PERSIANN");
        assert_eq!(collection_folder(DataType::Ccs), "PERSIANN-CCS");
        assert_eq!(collection_folder(DataType::Cdr), "PERSIANN-CDR");
        assert_eq!(collection_folder(DataType::Pdir), "PDIR");
    }
}
