//! CV record collaborator.
//!
//! # Data Flow
//! ```text
//! { "section": ..., "data": ... }
//!     → validation.rs (typed parse + field rules → SectionData)
//!     → store.rs (overwrite the section of the latest record)
//! ```

pub mod model;
pub mod store;
pub mod validation;

pub use model::{CvData, CvUpdate, Section, SectionData};
pub use store::{CvRecord, CvStore, CvStoreError};
pub use validation::{validate_section, CvValidationError};
