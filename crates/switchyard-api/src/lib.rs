//! Switchyard HTTP API
//!
//! Thin JSON layer over the model catalog and the activation state machine.
//!
//! # Endpoints
//!
//! - `GET /healthz` - Health check
//! - `GET /models` - List catalog models
//! - `GET /models/{id}` - Full definition of one model
//! - `POST /models/activate` - Make a model the active InferenceService
//! - `POST /models/dry-run` - Validate a model's manifest without applying it
//! - `POST /models/deactivate` - Delete the active InferenceService
//! - `GET /active` - The live InferenceService, if any
//! - `POST /refresh` - Reload the catalog from disk

#![deny(missing_docs)]

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{Error, Result};
pub use server::{router, serve, AppState};
