#![forbid(unsafe_code)]
//! Implementation of the Dremel record shredding and assembly algorithm:
//! nested records are decomposed into one (value, repetition level,
//! definition level) triple stream per leaf column, and re-assembled from
//! those streams guided by the same schema.

#[macro_use]
pub mod error;
pub mod assemble;
pub mod encoding;
pub mod schema;
pub mod shred;
pub mod table;
pub mod types;
pub mod value;

pub use assemble::{assemble, RowIter};
pub use schema::SchemaTree;
pub use shred::{shred, Shredder};
pub use table::{Column, Table};
pub use value::Value;
