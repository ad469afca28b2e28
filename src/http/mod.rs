//! HTTP module for the backend API
//!
//! Request executor, request/response types and the error taxonomy.

mod client;
mod error;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{ApiClient, MultipartForm, RequestOptions, RequestResult, ResponseBody};
pub use error::ApiError;
