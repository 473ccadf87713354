//! Typed async client for a parcel delivery provider's XML-over-HTTP
//! order API.
//!
//! Request documents are serialized to the provider's XML schema, signed
//! with the account credentials and posted as form data; responses are
//! decoded into typed structures, with lenient handling for the
//! provider's inconsistently formatted date attributes.

pub mod auth;
pub mod client;
pub mod datetime;
pub mod error;
pub mod request;
pub mod response;

// Re-export key types for convenience
pub use auth::{Credentials, Signature};
pub use client::{Client, ClientConfig, HttpTransport, Transport};
pub use datetime::DateField;
pub use error::{DeserializationError, Error};
pub use request::{
    Address, Authorized, ChangePeriod, DeleteRequest, DeliveryRequest, NewOrder, OrderRef,
    Package, StatusReportRequest, XmlRequest,
};
pub use response::{
    DeleteResponse, DeliveryResponse, Order, OrderAck, ProviderError, Reason, State, Status,
    StatusReport, XmlResponse,
};
