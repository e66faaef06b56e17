//! IEX-style REST chart client.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::IexRestClient;
