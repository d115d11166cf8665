//! Switchyard - switches the active LLM InferenceService on a cluster
//!
//! The binary wires the model catalog, the activation state machine and the
//! HTTP API together from a single [`config::Config`].

#![deny(missing_docs)]

pub mod config;
