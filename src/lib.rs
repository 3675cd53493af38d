#![forbid(unsafe_code)]

//! Rust client for the CHRS data portal.
//!
//! The portal serves the PERSIANN family of satellite precipitation products
//! (PERSIANN, PERSIANN-CCS, PERSIANN-CDR and PDIR-Now). Getting data out of it is
//! a three step exchange: an order is placed and compiled into an archive
//! server-side, the archive's download link is activated (which also emails the
//! requester), then the archive is streamed to disk.
//!
//! **Quick start**
//! ```no_run
//! use chrs_persiann::{Client, FetchParams};
//!
//! let client = Client::default_client()?;
//!
//! // Defaults: Tif, monthly, zip
//! let params = FetchParams::new("2021010100", "2021010300", "me@example.org", "~/Downloads")
//!     .timestep("daily");
//! let download = client.get_pdir(&params)?;
//! println!("{} bytes -> {}", download.size_bytes, download.path.display());
//! # Ok::<(), chrs_persiann::Error>(())
//! ```
//!
//! **By collection name**
//! ```no_run
//! use chrs_persiann::{Client, ClientOptions, FetchParams};
//!
//! let client = Client::new(ClientOptions::from_env()?)?;
//! let params = FetchParams::new("2020", "2021", "me@example.org", "data").timestep("yearly");
//! client.fetch_data("CDR", &params)?;
//! # Ok::<(), chrs_persiann::Error>(())
//! ```
//!
//! Notes:
//! - Dates are `yyyymmddHH` strings and are truncated to the timestep's
//!   granularity; they are not otherwise checked.
//! - Library code logs through `tracing` and never installs a subscriber.

mod client;
mod config;
mod date;
mod download;
mod error;
mod request;
mod sources;
mod url_builder;

pub use crate::client::{Client, ClientOptions, Download};
pub use crate::config::{
    ENV_ACTIVATION_URL, ENV_DOWNLOAD_BASE, ENV_DOWNLOAD_TIMEOUT, ENV_ORDER_URL, ENV_PORTAL_URL,
    ENV_TIMEOUT,
};
pub use crate::date::Granularity;
pub use crate::download::CHUNK_SIZE;
pub use crate::error::{BoxError, Error, Result, Stage};
pub use crate::request::{Compression, DataType, FetchParams, FileFormat, OrderRequest, Timestep};
pub use crate::sources::{Endpoints, PORTAL_URL, collection_folder};
pub use crate::url_builder::{OrderToken, file_url};
