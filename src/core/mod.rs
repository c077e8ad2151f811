// Core modules implementing decoding, input modeling, the product, and errors.
pub mod constant;
pub mod document;
pub mod error;
pub mod radix;
