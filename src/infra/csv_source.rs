//! Streaming reader for `hostname,start_time,end_time` CSV input.
//!
//! Malformed rows are logged and skipped; only well-formed params reach the
//! sink.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use super::QueryParams;
use crate::core::{DispatchError, DispatchPool, QueryExecutor};

/// Timestamp layout of the start and end columns, interpreted as UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const FIELDS_PER_RECORD: usize = 3;

/// Errors produced while streaming params.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The CSV file could not be opened.
    #[error("could not open csv {path}: {source}")]
    Open {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The sink refused a params value.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Open `path` and stream its rows into `sink`.
///
/// Returns the number of params delivered.
///
/// # Errors
///
/// - `SourceError::Open` if the file cannot be opened
/// - `SourceError::Dispatch` if the sink fails
pub fn stream_params_file<F>(path: impl AsRef<Path>, sink: F) -> Result<usize, SourceError>
where
    F: FnMut(QueryParams) -> Result<(), DispatchError>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| {
        warn!(file_path = %path.display(), error = %source, "could not open csv");
        SourceError::Open {
            path: path.to_path_buf(),
            source,
        }
    })?;
    info!(file_path = %path.display(), "reading csv");
    stream_params(file, sink)
}

/// Stream CSV rows from `reader` into `sink`.
///
/// The first record is a header and is skipped. Returns the number of params
/// delivered; empty input delivers none.
///
/// # Errors
///
/// Returns `SourceError::Dispatch` if the sink fails; reading stops there.
pub fn stream_params<R, F>(reader: R, mut sink: F) -> Result<usize, SourceError>
where
    R: Read,
    F: FnMut(QueryParams) -> Result<(), DispatchError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = reader.records();

    match records.next() {
        None => return Ok(0),
        Some(Ok(header)) if header.len() != FIELDS_PER_RECORD => {
            // Only the header may be wrong; keep going.
            warn!(fields = header.len(), "unexpected csv header");
        }
        Some(Ok(_)) => {}
        Some(Err(err)) => warn!(error = %err, "unexpected error reading csv header"),
    }

    let mut delivered = 0;
    for (idx, result) in records.enumerate() {
        let row = idx + 1;
        let record = match result {
            Ok(record) => record,
            Err(err) if err.is_io_error() => {
                warn!(row_number = row, error = %err, "csv input failed, stopping");
                break;
            }
            Err(err) => {
                warn!(row_number = row, error = %err, "unexpected error reading csv row");
                continue;
            }
        };

        if record.len() != FIELDS_PER_RECORD {
            warn!(row_number = row, fields = record.len(), "wrong number of fields in csv row");
            continue;
        }
        // Only leading whitespace is insignificant; trailing bytes stay part
        // of the field.
        let host = record[0].trim_start();
        if host.is_empty() {
            warn!(row_number = row, "empty hostname in csv row");
            continue;
        }
        let (Some(start_time), Some(end_time)) = (
            parse_timestamp(record[1].trim_start(), row),
            parse_timestamp(record[2].trim_start(), row),
        ) else {
            continue;
        };

        sink(QueryParams {
            host: host.to_owned(),
            start_time,
            end_time,
        })?;
        delivered += 1;
    }

    info!(rows = delivered, "csv finished");
    Ok(delivered)
}

/// Stream the CSV file at `path` into `pool`, then stop the pool.
///
/// See [`replay_params`].
///
/// # Errors
///
/// - `SourceError::Open` if the file cannot be opened
/// - `SourceError::Dispatch` if a submit or the final stop fails
pub fn replay_params_file<E>(
    pool: &DispatchPool<QueryParams, E>,
    path: impl AsRef<Path>,
) -> Result<usize, SourceError>
where
    E: QueryExecutor<QueryParams>,
{
    let streamed = stream_params_file(path, |params| submit_params(pool, params));
    finish_replay(pool, streamed)
}

/// Stream CSV rows from `reader` into `pool`, then stop the pool.
///
/// The pool is stopped whether or not streaming succeeded, so every accepted
/// item has run and every lane is joined when this returns.
///
/// # Errors
///
/// Returns the streaming error if there was one, otherwise the error from
/// [`DispatchPool::stop`].
pub fn replay_params<R, E>(pool: &DispatchPool<QueryParams, E>, reader: R) -> Result<usize, SourceError>
where
    R: Read,
    E: QueryExecutor<QueryParams>,
{
    let streamed = stream_params(reader, |params| submit_params(pool, params));
    finish_replay(pool, streamed)
}

fn submit_params<E>(pool: &DispatchPool<QueryParams, E>, params: QueryParams) -> Result<(), DispatchError>
where
    E: QueryExecutor<QueryParams>,
{
    pool.submit(params.into_work_item()?).map(|_| ())
}

fn finish_replay<E>(
    pool: &DispatchPool<QueryParams, E>,
    streamed: Result<usize, SourceError>,
) -> Result<usize, SourceError>
where
    E: QueryExecutor<QueryParams>,
{
    let stopped = pool.stop();
    match streamed {
        Ok(submitted) => {
            stopped?;
            Ok(submitted)
        }
        Err(err) => {
            if let Err(stop_err) = stopped {
                warn!(error = %stop_err, "stopping pool after failed input also failed");
            }
            Err(err)
        }
    }
}

fn parse_timestamp(value: &str, row: usize) -> Option<DateTime<Utc>> {
    match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            warn!(row_number = row, value, error = %err, "unexpected timestamp value");
            None
        }
    }
}
