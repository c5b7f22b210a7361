//! UnivaPay SDK core library.
//!
//! This library provides the request/response marshaling pipeline of the SDK
//! and client-side validation of card expiration dates.

pub mod adapters;
pub mod converters;
pub mod errors;
pub mod marshal;
pub mod pipeline;
pub mod types;
pub mod validation;
