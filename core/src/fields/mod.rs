#![deny(missing_docs)]

//! # Fields Module
//!
//! - **options**: tag parsing into `FieldOptions`.
//! - **naming**: case styles and derived output names.
//! - **visibility**: per-variant inclusion rules.

pub mod naming;
pub mod options;
pub mod visibility;

pub use naming::{apply_case, enum_value_name, to_lower_camel, to_upper_snake, Namer};
pub use options::FieldOptions;
pub use visibility::is_field_included;
