//! The adaptation boundary to the transaction encoding layer: JSON call
//! descriptors in, delta maps out.

pub mod dto;
