use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::date::Granularity;
use crate::error::{Error, Result};

/// Data collection served by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Persiann,
    /// PERSIANN-CCS
    Ccs,
    /// PERSIANN-CDR
    Cdr,
    /// PDIR-Now
    Pdir,
}

impl DataType {
    pub const ALL: [DataType; 4] = [DataType::Persiann, DataType::Ccs, DataType::Cdr, DataType::Pdir];

    /// Identifier sent to the portal as `dataType`.
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Persiann => "PERSIANN",
            DataType::Ccs => "CCS",
            DataType::Cdr => "CDR",
            DataType::Pdir => "PDIR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    ArcGrid,
    Tif,
    NetCdf,
}

impl FileFormat {
    pub const ALL: [FileFormat; 3] = [FileFormat::ArcGrid, FileFormat::Tif, FileFormat::NetCdf];

    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::ArcGrid => "ArcGrid",
            FileFormat::Tif => "Tif",
            FileFormat::NetCdf => "NetCDF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestep {
    Hourly1,
    Hourly3,
    Hourly6,
    Daily,
    Monthly,
    Yearly,
}

impl Timestep {
    pub const ALL: [Timestep; 6] = [
        Timestep::Hourly1,
        Timestep::Hourly3,
        Timestep::Hourly6,
        Timestep::Daily,
        Timestep::Monthly,
        Timestep::Yearly,
    ];

    /// User-facing label, sent as `timestep`.
    pub fn as_str(self) -> &'static str {
        match self {
            Timestep::Hourly1 => "1hrly",
            Timestep::Hourly3 => "3hrly",
            Timestep::Hourly6 => "6hrly",
            Timestep::Daily => "daily",
            Timestep::Monthly => "monthly",
            Timestep::Yearly => "yearly",
        }
    }

    /// Internal code, sent as `timestepAlt`.
    pub fn code(self) -> &'static str {
        match self {
            Timestep::Hourly1 => "1h",
            Timestep::Hourly3 => "3h",
            Timestep::Hourly6 => "6h",
            Timestep::Daily => "1d",
            Timestep::Monthly => "1m",
            Timestep::Yearly => "1y",
        }
    }

    pub fn granularity(self) -> Granularity {
        match self {
            Timestep::Hourly1 | Timestep::Hourly3 | Timestep::Hourly6 => Granularity::Hourly,
            Timestep::Daily => Granularity::Day,
            Timestep::Monthly => Granularity::Month,
            Timestep::Yearly => Granularity::Year,
        }
    }
}

/// Archive format of the ordered file. The portal also mentions `tar`, which
/// it does not serve yet, so it is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
    Zip,
}

impl Compression {
    pub const ALL: [Compression; 1] = [Compression::Zip];

    /// Also the file extension of the archive.
    pub fn as_str(self) -> &'static str {
        match self {
            Compression::Zip => "zip",
        }
    }
}

macro_rules! option_set {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| {
                        let expected: Vec<&str> = <$ty>::ALL.iter().map(|v| v.as_str()).collect();
                        Error::invalid($field, s, &expected)
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

option_set!(DataType, "data type");
option_set!(FileFormat, "file format");
option_set!(Timestep, "timestep");
option_set!(Compression, "compression");

/// A fully validated order. Only constructible through [`OrderRequest::validate`]
/// or from already-typed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// `yyyymmddHH`, as supplied by the caller.
    pub start: String,
    pub end: String,
    pub data_type: DataType,
    pub file_format: FileFormat,
    pub timestep: Timestep,
    pub compression: Compression,
}

impl OrderRequest {
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        data_type: DataType,
        file_format: FileFormat,
        timestep: Timestep,
        compression: Compression,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            data_type,
            file_format,
            timestep,
            compression,
        }
    }

    /// Check string options against the accepted sets.
    ///
    /// Checks run in the order timestep, file format, compression, data type and
    /// the first rejection is returned. Dates are taken as-is.
    pub fn validate(
        start: &str,
        end: &str,
        data_type: &str,
        file_format: &str,
        timestep: &str,
        compression: &str,
    ) -> Result<Self> {
        let timestep: Timestep = timestep.parse()?;
        let file_format: FileFormat = file_format.parse()?;
        let compression: Compression = compression.parse()?;
        let data_type: DataType = data_type.parse()?;

        Ok(Self::new(start, end, data_type, file_format, timestep, compression))
    }

    /// Start date truncated to the timestep's granularity.
    pub fn normalized_start(&self) -> &str {
        self.timestep.granularity().truncate(&self.start)
    }

    pub fn normalized_end(&self) -> &str {
        self.timestep.granularity().truncate(&self.end)
    }
}

/// Caller-facing parameters shared by every collection entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub start: String,
    pub end: String,
    /// Address the portal notifies once the download link is activated.
    pub mailid: String,
    pub download_path: PathBuf,
    pub file_format: String,
    pub timestep: String,
    pub compression: String,
}

impl FetchParams {
    /// Parameters with the portal defaults: `Tif`, `monthly`, `zip`.
    pub fn new(
        start: impl Into<String>,
        end: impl Into<String>,
        mailid: impl Into<String>,
        download_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            mailid: mailid.into(),
            download_path: download_path.into(),
            file_format: FileFormat::Tif.as_str().to_string(),
            timestep: Timestep::Monthly.as_str().to_string(),
            compression: Compression::Zip.as_str().to_string(),
        }
    }

    pub fn file_format(mut self, v: impl Into<String>) -> Self {
        self.file_format = v.into();
        self
    }

    pub fn timestep(mut self, v: impl Into<String>) -> Self {
        self.timestep = v.into();
        self
    }

    pub fn compression(mut self, v: impl Into<String>) -> Self {
        self.compression = v.into();
        self
    }

    pub(crate) fn order_request(&self, data_type: &str) -> Result<OrderRequest> {
        OrderRequest::validate(
            &self.start,
            &self.end,
            data_type,
            &self.file_format,
            &self.timestep,
            &self.compression,
        )
    }
}
