use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serialize;
use snafu::Snafu;

pub type CustomResult<T> = Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Missing required fields: {}", fields.join(", ")))]
    MissingFieldsError { fields: Vec<&'static str> },

    #[snafu(display("Missing updated race object"))]
    MissingBodyError,

    #[snafu(display("Missing race id"))]
    MissingIdError,

    #[snafu(display("Malformed request body: {reason}"))]
    MalformedBodyError { reason: String },

    #[snafu(display("Incomplete race configuration: {reason}"))]
    IncompleteKeyError { reason: String },

    #[snafu(display("Invalid time `{value}`: {reason}"))]
    InvalidTimeError { value: String, reason: String },

    #[snafu(display("Invalid surface `{value}`, expected Dry or Wet"))]
    InvalidSurfaceError { value: String },

    #[snafu(display("Time {time} is not an improvement on {previous}"))]
    NotImprovedError { time: String, previous: String },

    #[snafu(display("Race not found"))]
    RaceNotFoundError { id: String },

    #[snafu(display("No race data found"))]
    NoRaceDataError,

    #[snafu(display("Error connecting to redis: {source}"))]
    RedisConnectionError { source: redis::RedisError },

    #[snafu(display("Redis command failed: {source}"))]
    RedisError { source: redis::RedisError },

    #[snafu(display("Race data could not be (de)serialized: {source}"))]
    SerializationError { source: serde_json::Error },

    #[snafu(display("Race store lock was poisoned"))]
    StoreLockError,

    #[snafu(display("Failed to build spreadsheet: {source}"))]
    ExportError { source: rust_xlsxwriter::XlsxError },
}

impl Error {
    /// # http status of the error
    /// validation problems are the caller's fault, storage and export problems are ours.
    pub fn status(&self) -> Status {
        match self {
            Error::MissingFieldsError { .. }
            | Error::MissingBodyError
            | Error::MissingIdError
            | Error::MalformedBodyError { .. }
            | Error::IncompleteKeyError { .. }
            | Error::InvalidTimeError { .. }
            | Error::InvalidSurfaceError { .. } => Status::BadRequest,
            Error::NotImprovedError { .. } => Status::Conflict,
            Error::RaceNotFoundError { .. } | Error::NoRaceDataError => Status::NotFound,
            Error::RedisConnectionError { .. }
            | Error::RedisError { .. }
            | Error::SerializationError { .. }
            | Error::StoreLockError
            | Error::ExportError { .. } => Status::InternalServerError,
        }
    }
}

/// # Struct representing a json error body
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

/// # error as it is sent over http
/// always rendered as `{"error": "<message>"}`
#[derive(Debug)]
pub struct ApiError {
    pub status: Status,
    pub message: String,
}

impl ApiError {
    pub fn new(status: Status, message: impl Into<String>) -> ApiError {
        ApiError {
            status,
            message: message.into(),
        }
    }

    /// # convert a service error for the response
    /// server side failures are replaced by `fallback` so internals don't leak to the client.
    pub fn from_error(error: &Error, fallback: &str) -> ApiError {
        let status = error.status();
        if status.code >= 500 {
            ApiError::new(status, fallback)
        } else {
            ApiError::new(status, error.to_string())
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        (self.status, Json(ErrorBody { error: self.message })).respond_to(request)
    }
}
