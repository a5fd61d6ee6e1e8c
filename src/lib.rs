//! Turn a class declaration into a ready-to-paste sample JSON payload, with
//! optional inline field documentation.
//!
//! Pipeline: `TypeModel` → classification → sample value tree and/or
//! documentation tree → one merged JSON object.
pub mod model;
pub mod error;
pub mod classify;
pub mod defaults;
pub mod sample;
pub mod docs;
pub mod convert;

pub use convert::{convert, Converter, COMMENT_KEY};
pub use defaults::{ScalarDefault, ScalarTable};
pub use error::{ModelError, Result};
pub use model::{TypeId, TypeModel, TypeRef};
