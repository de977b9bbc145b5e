use crate::schema::types::PhysicalType;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// A record value contradicts the repetition declared at a path.
    Structural {
        path: String,
        row: usize,
        message: String,
    },
    /// A locked schema received a field it does not declare.
    SchemaClosed { path: String, row: usize },
    /// A leaf value's physical type differs from the declared one.
    TypeMismatch {
        path: String,
        row: usize,
        expected: Option<PhysicalType>,
        found: PhysicalType,
    },
    /// `add` was called with a path that is already declared.
    Redefinition { path: String },
    /// Metadata or level streams are known to be out of spec.
    OutOfSpec(String),
    /// General error.
    General(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Structural { path, row, message } => {
                write!(fmt, "row {}, column {:?}: {}", row, path, message)
            }
            Error::SchemaClosed { path, row } => {
                write!(
                    fmt,
                    "row {}: {:?} is not declared and the schema is locked",
                    row, path
                )
            }
            Error::TypeMismatch {
                path,
                row,
                expected,
                found,
            } => match expected {
                Some(expected) => write!(
                    fmt,
                    "row {}, column {:?}: expected a {:?} value, found {:?}",
                    row, path, expected, found
                ),
                None => write!(
                    fmt,
                    "row {}, column {:?}: no type is declared for {:?} values",
                    row, path, found
                ),
            },
            Error::Redefinition { path } => {
                write!(fmt, "{:?} is already declared", path)
            }
            Error::OutOfSpec(message) => {
                write!(fmt, "{}", message)
            }
            Error::General(message) => {
                write!(fmt, "{}", message)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::General(format!("underlying IO error: {}", e))
    }
}

/// A specialized `Result` for shredding and assembly errors.
pub type Result<T> = std::result::Result<T, Error>;

macro_rules! general_err {
    ($fmt:expr) => (crate::error::Error::General($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::error::Error::General(format!($fmt, $($args),*)));
}
