//! Request and Response models for the cache service API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{
    validate_key, ListKeyRequest, MgetRequest, MsetEntry, MsetRequest, PrefixQuery,
    SearchKeyRequest, SetRequest,
};
pub use responses::{ErrorResponse, GetResponse, KeyResponse, MessageResponse, MgetResponse};
