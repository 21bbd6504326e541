//! REST client for the opsdesk backend: a transport seam, the reqwest
//! transport, envelope normalisation and the per-domain API modules.

pub mod api;
pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod memory;
pub mod refresh;
pub mod submission;
pub mod transport;

pub use client::{ApiClient, ApiResponse};
pub use envelope::Envelope;
pub use error::ClientError;
pub use http::HttpTransport;
pub use memory::{RecordedRequest, ScriptedTransport};
pub use refresh::refresh;
pub use submission::{submit, Receipt, SubmissionError};
pub use transport::{ApiRequest, Body, FilePart, Method, MultipartBody, RawResponse, Transport};
