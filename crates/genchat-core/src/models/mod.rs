//! Request and response bodies exchanged with the generation backend.
//!
//! - `Credentials`, `LoginResponse`, `RegisterResponse`, `Confirmation`: account endpoints
//! - `GenerateRequest`, `GenerateResponse`: the generate endpoint
//! - `ErrorBody`: the `{detail}` body sent with non-success statuses
//!
//! With the `ts` feature enabled these also derive `ts_rs::TS`.

pub mod auth;
pub mod generate;

pub use auth::{Confirmation, Credentials, ErrorBody, LoginResponse, RegisterResponse};
pub use generate::{GenerateRequest, GenerateResponse};
