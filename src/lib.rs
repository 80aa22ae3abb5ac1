//! Rust client for the Fragile Families Metadata API.
//!
//! The service describes the variables of the Fragile Families survey. Each
//! variable has a unique name and a set of string attributes (label, data
//! source, data type, ...).
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ffmetadata::{Client, Filter, FilterTree};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ffmetadata::Error> {
//!     let client = Client::new()?;
//!
//!     // All attributes of a variable
//!     let attrs = client.select_all("ce3datey").await?;
//!     println!("{:?}", attrs.get("data_source"));
//!
//!     // Variables where data_source = 'constructed' AND name ends with 'e'
//!     let names = client
//!         .search(vec![
//!             Filter::eq("data_source", "constructed"),
//!             Filter::like("name", "%e"),
//!         ])
//!         .await?;
//!     println!("{:?}", names);
//!
//!     // data_source = 'constructed' OR (name ends with 'f' AND data_source = 'questionnaire')
//!     let names = client
//!         .search(FilterTree::or([
//!             FilterTree::from(Filter::eq("data_source", "constructed")),
//!             FilterTree::and([
//!                 Filter::like("name", "%f"),
//!                 Filter::eq("data_source", "questionnaire"),
//!             ]),
//!         ]))
//!         .await?;
//!     println!("{:?}", names);
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod legacy;
mod types;
mod version;

pub use client::{Client, ClientBuilder, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use types::*;
pub use version::SDK_VERSION;
