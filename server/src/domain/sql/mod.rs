//! SQL generation for the Doris/SelectDB dialect

pub mod builders;
pub mod duration;
pub mod filters;
pub mod interval;
pub mod params;
pub mod statement;
pub mod tags;
pub mod validate;

pub use filters::{FilterCondition, FilterError, FilterOperator, SqlValue};
pub use params::{
    SurroundingParams, TableDataParams, TraceDetailParams, TraceFacetParams, TraceListParams,
};
pub use statement::{QueryKind, RenderError};
pub use tags::TagParseError;
