//! Ferry Core
//!
//! Core types and abstractions for the Ferry deployment descriptor composer.
//!
//! This crate contains:
//! - Domain types: the pieces of an application descriptor (identity, source,
//!   build spec, environment, release topology, outputs)
//! - The manifest model produced by the descriptor parser
//! - DTOs for the parameter store and repository host
//! - The error taxonomy shared by every composition step
//! - Seams for external collaborators: the parameter store and the source
//!   layout probe

pub mod domain;
pub mod dto;
pub mod error;

pub use error::{DescriptorError, ParameterError, Result};
