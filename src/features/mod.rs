//! Feature construction.
//!
//! - simulator body mapping (`mapping`)
//! - canonical vector building and imputation (`canonical`)
//! - schema loading and range validation (`schema`)

pub mod canonical;
pub mod mapping;
pub mod schema;

pub use canonical::*;
pub use mapping::*;
pub use schema::*;
