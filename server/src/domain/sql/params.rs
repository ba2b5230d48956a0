//! Request parameter shapes consumed by the statement builders
//!
//! Field names follow the JSON the UI sends (`startDate`, `data_filters`,
//! `page_size`), with aliases for the capitalized variants older clients use.

use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::filters::FilterCondition;
use super::validate::{validate_filters, validate_identifier};

/// Fixed bucket unit for time histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Prefix of the Doris `*_FLOOR` function
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Second => "SECOND",
            Self::Minute => "MINUTE",
            Self::Hour => "HOUR",
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::Year => "YEAR",
        }
    }
}

/// Requested histogram interval: a fixed unit or `auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Interval {
    #[default]
    Auto,
    Fixed(TimeUnit),
}

impl TryFrom<String> for Interval {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        let unit = match raw.trim().to_lowercase().as_str() {
            "auto" | "" => return Ok(Self::Auto),
            "second" => TimeUnit::Second,
            "minute" => TimeUnit::Minute,
            "hour" => TimeUnit::Hour,
            "day" => TimeUnit::Day,
            "week" => TimeUnit::Week,
            "month" => TimeUnit::Month,
            "year" => TimeUnit::Year,
            _ => return Err(format!("unknown interval '{}'", raw)),
        };
        Ok(Self::Fixed(unit))
    }
}

/// How `search_value` / `indexes` are interpreted
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SearchMode {
    /// Index expressions from `indexes` / `indexes_statement` are applied
    Structured,
    /// `search_value` is a raw SQL predicate appended verbatim
    Freeform,
    /// `lucene_where` (the UI's translation of a Lucene query) is appended
    /// as a parenthesized predicate
    Lucene,
    #[default]
    Off,
}

impl From<String> for SearchMode {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "search" | "structured" => Self::Structured,
            "sql" | "freeform" => Self::Freeform,
            "lucene" => Self::Lucene,
            _ => Self::Off,
        }
    }
}

/// Accept `3` as well as `"3"`; the UI sends page numbers as strings
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) if s.trim().is_empty() => Ok(0),
        IntOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Time-range query over a log table (rows, counts, histogram)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct TableDataParams {
    pub catalog: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    pub cluster: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub sort: String,
    #[serde(rename = "timeField")]
    #[validate(custom(function = "validate_identifier"))]
    pub time_field: String,
    pub interval: Interval,
    #[serde(deserialize_with = "lenient_i64")]
    #[validate(range(min = 1, message = "interval_value must be >= 1"))]
    pub interval_value: i64,
    #[validate(custom(function = "validate_filters"))]
    pub data_filters: Vec<FilterCondition>,
    pub search_type: SearchMode,
    pub search_value: String,
    pub lucene_where: String,
    pub indexes: String,
    pub indexes_statement: String,
    #[serde(alias = "DS")]
    pub ds: String,
    #[serde(deserialize_with = "lenient_i64")]
    #[validate(range(min = 0, message = "page_size must be >= 0"))]
    pub page_size: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub page: i64,
    pub trace_id: String,
}

impl Default for TableDataParams {
    fn default() -> Self {
        Self {
            catalog: String::new(),
            database: String::new(),
            table: String::new(),
            cluster: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            sort: String::new(),
            time_field: String::new(),
            interval: Interval::Auto,
            interval_value: 1,
            data_filters: Vec::new(),
            search_type: SearchMode::Off,
            search_value: String::new(),
            lucene_where: String::new(),
            indexes: String::new(),
            indexes_statement: String::new(),
            ds: String::new(),
            page_size: 0,
            page: 1,
            trace_id: String::new(),
        }
    }
}

impl TableDataParams {
    /// Raw SQL fragment the request would inject, if any
    pub fn freeform_fragment(&self) -> Option<&str> {
        (self.search_type == SearchMode::Freeform && !self.search_value.is_empty())
            .then_some(self.search_value.as_str())
    }

    /// Translated Lucene predicate, if any
    pub fn lucene_fragment(&self) -> Option<&str> {
        (self.search_type == SearchMode::Lucene && !self.lucene_where.is_empty())
            .then_some(self.lucene_where.as_str())
    }

    /// Any fragment that reaches the statement verbatim
    pub fn raw_fragment(&self) -> Option<&str> {
        self.freeform_fragment().or_else(|| self.lucene_fragment())
    }
}

/// Span detail lookup for one trace
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TraceDetailParams {
    #[serde(alias = "DS")]
    pub ds: String,
    pub catalog: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    pub cluster: String,
    #[validate(length(min = 1, message = "trace_id is required"))]
    pub trace_id: String,
}

/// Ordering of the trace list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TraceSort {
    #[default]
    MostRecent,
    LongestDuration,
    ShortestDuration,
    MostSpans,
    LeastSpans,
}

impl From<String> for TraceSort {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "longest-duration" => Self::LongestDuration,
            "shortest-duration" => Self::ShortestDuration,
            "most-spans" => Self::MostSpans,
            "least-spans" => Self::LeastSpans,
            _ => Self::MostRecent,
        }
    }
}

impl TraceSort {
    /// ORDER BY clause over the `aggregated` CTE columns
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::MostRecent => "time DESC",
            Self::LongestDuration => "trace_duration_ms DESC",
            Self::ShortestDuration => "trace_duration_ms ASC",
            Self::MostSpans => "spans DESC",
            Self::LeastSpans => "spans ASC",
        }
    }
}

/// Trace search with aggregation and paging
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct TraceListParams {
    pub catalog: String,
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    pub cluster: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(rename = "timeField")]
    #[validate(custom(function = "validate_identifier"))]
    pub time_field: String,
    #[serde(alias = "DS")]
    pub ds: String,
    #[serde(deserialize_with = "lenient_i64")]
    pub page_size: i64,
    #[serde(deserialize_with = "lenient_i64")]
    pub page: i64,
    pub service_name: String,
    pub operation: String,
    pub status_code: String,
    #[serde(rename = "minDuration")]
    pub min_duration: String,
    #[serde(rename = "maxDuration")]
    pub max_duration: String,
    #[serde(alias = "Tags")]
    pub tags: String,
    pub sort_by: TraceSort,
}

impl Default for TraceListParams {
    fn default() -> Self {
        Self {
            catalog: String::new(),
            database: String::new(),
            table: String::new(),
            cluster: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            time_field: String::new(),
            ds: String::new(),
            page_size: 0,
            page: 1,
            service_name: String::new(),
            operation: String::new(),
            status_code: String::new(),
            min_duration: String::new(),
            max_duration: String::new(),
            tags: String::new(),
            sort_by: TraceSort::MostRecent,
        }
    }
}

/// Direction of a surrounding-rows lookup relative to the anchor time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum SurroundingDirection {
    /// Rows before the anchor (`<`), newest first
    #[serde(rename = "<")]
    Before,
    /// Rows after the anchor (`>`), oldest first
    #[default]
    #[serde(rename = ">")]
    After,
}

impl SurroundingDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Before => "<",
            Self::After => ">",
        }
    }

    pub fn order(&self) -> &'static str {
        match self {
            Self::Before => "DESC",
            Self::After => "ASC",
        }
    }
}

/// Log context around an anchor row
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct SurroundingParams {
    #[serde(alias = "Table")]
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    #[serde(alias = "Database")]
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[serde(rename = "timeField", alias = "TimeField")]
    #[validate(custom(function = "validate_identifier"))]
    pub time_field: String,
    #[serde(alias = "Operator")]
    pub operator: SurroundingDirection,
    #[serde(alias = "Time")]
    #[validate(length(min = 1, message = "time is required"))]
    pub time: String,
    #[validate(custom(function = "validate_filters"))]
    pub data_filters: Vec<FilterCondition>,
    #[serde(rename = "pageSize", alias = "PageSize", deserialize_with = "lenient_i64")]
    #[validate(range(min = 1, message = "pageSize must be >= 1"))]
    pub page_size: i64,
    #[serde(alias = "DS")]
    pub ds: String,
}

impl Default for SurroundingParams {
    fn default() -> Self {
        Self {
            table: String::new(),
            database: String::new(),
            time_field: String::new(),
            operator: SurroundingDirection::After,
            time: String::new(),
            data_filters: Vec::new(),
            page_size: 10,
            ds: String::new(),
        }
    }
}

/// Distinct service / operation listing over a time range
///
/// `service_name` only narrows the operations listing.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TraceFacetParams {
    #[serde(alias = "Table")]
    #[validate(custom(function = "validate_identifier"))]
    pub table: String,
    #[serde(alias = "Database")]
    #[validate(custom(function = "validate_identifier"))]
    pub database: String,
    #[serde(rename = "timeField", alias = "TimeField")]
    #[validate(custom(function = "validate_identifier"))]
    pub time_field: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    #[serde(rename = "serviceName", alias = "ServiceName")]
    pub service_name: String,
    #[serde(alias = "DS")]
    pub ds: String,
}
