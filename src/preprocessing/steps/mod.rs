//! Individual preprocessing steps

pub mod contrast;
pub mod grayscale;
pub mod sharpen;
pub mod threshold;
