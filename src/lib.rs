//! pdfchat library exports for testing

pub mod core;
pub mod transport;
pub mod tui;
pub mod upload;

#[cfg(test)]
pub mod test_support;
