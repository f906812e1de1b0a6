//! KMIP protocol core: the TTLV binary codec, the structural
//! marshalling layer between typed messages and TTLV trees, and the
//! request/response socket server that dispatches batch items to
//! registered operation handlers.
//!
//! The crate is organized bottom-up:
//! - [`registry`] maps numeric tags, types and enumeration values to
//!   their canonical and normalized KMIP names,
//! - [`ttlv`] holds the tree representation, the serde codec between
//!   typed values and trees, and the wire codec between trees and bytes,
//! - [`kmip_1_4`] is the typed KMIP 1.4 message model,
//! - [`server`] frames a byte stream, decodes requests, routes batch
//!   items through the operation mux and encodes responses.

#![deny(
    nonstandard_style,
    future_incompatible,
    keyword_idents,
    let_underscore,
    unsafe_code,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::style,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::unreachable,
    clippy::as_conversions,
    clippy::print_stdout,
    clippy::map_err_ignore
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::redundant_pub_crate,
    clippy::cognitive_complexity
)]

pub use error::{result::KmipResultHelper, KmipError};

pub mod error;
pub mod kmip_1_4;
pub mod registry;
pub mod server;
pub mod ttlv;
