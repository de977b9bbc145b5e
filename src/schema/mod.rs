pub mod io_thrift;
pub mod path;
pub mod types;

mod tree;

pub use tree::SchemaTree;
pub use types::Repetition;
