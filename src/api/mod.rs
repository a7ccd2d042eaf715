pub mod client;
pub mod mock;
pub mod transport;

#[cfg(feature = "csr")]
pub mod fetch;

pub use client::{Ack, ApiClient, DeletedUser, DownloadReply, LoginReply};
pub use mock::MockTransport;
pub use transport::{ApiRequest, ApiResponse, Method, Transport};

#[cfg(feature = "csr")]
pub use fetch::FetchTransport;
