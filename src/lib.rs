//! Query Guard - validation and filter correction for remote analytical queries
//!
//! Catches malformed queries before they reach the remote service and repairs
//! filter values that do not exist in the live data.

pub mod config;
pub mod corrector;
pub mod error;
pub mod errors;
pub mod fuzzy;
pub mod pagination;
pub mod query;
pub mod remote;
pub mod validator;
pub mod validators;

pub use config::GuardConfig;
pub use corrector::{
    correct_filter_values, CorrectionOptions, CorrectionReport, FilterValueCorrector,
};
pub use error::{FixSuggestion, GuardError, RemoteError};
pub use errors::{FilterValidationError, ShapeIssue, StructuralError};
pub use fuzzy::{edit_distance, get_fuzzy_matches};
pub use pagination::{paginate, Page, PageConfig, Pagination};
pub use query::{DatasourceRef, Field, Filter, FilterField, Query, QueryOutput, QueryRequest};
pub use remote::{HttpQueryExecutor, QueryExecutor, StaticQueryExecutor};
pub use validator::QueryValidator;
pub use validators::{parse_query, validate_shape};
