//! # Upload Collaborator
//!
//! Sends a PDF to the backend and returns the descriptor a chat session is
//! built from. Progress is reported as the body is actually streamed out.

pub mod client;
pub mod types;

pub use client::{UploadClient, UploadError};
pub use types::{DocumentDescriptor, UploadProgress};
