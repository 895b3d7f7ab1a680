//! Core domain types
//!
//! This module contains the structures that make up an application
//! descriptor. They are produced by the composer and consumed by the
//! renderer and the CLI.

pub mod application;
pub mod build;
pub mod environment;
pub mod identity;
pub mod manifest;
pub mod parameter;
pub mod release;
pub mod source;
pub mod target;
