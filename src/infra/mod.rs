//! Collaborators around the dispatch core: input sources and query executors.

pub mod csv_source;
pub mod params;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use csv_source::{
    replay_params, replay_params_file, stream_params, stream_params_file, SourceError,
    TIMESTAMP_FORMAT,
};
pub use params::QueryParams;
#[cfg(feature = "postgres")]
pub use postgres::{CpuUsage, Querier, QueryError, CPU_USAGE_QUERY};
