use rocket::http::Status;
use rocket::{catch, Request};

use crate::errors::ApiError;

// rocket's own error pages are html, these keep every error body `{"error": ...}`

#[catch(400)]
pub fn bad_request(_: &Request) -> ApiError {
    ApiError::new(Status::BadRequest, "Bad request")
}

#[catch(404)]
pub fn not_found(request: &Request) -> ApiError {
    ApiError::new(Status::NotFound, format!("No route for {}", request.uri()))
}

#[catch(422)]
pub fn unprocessable(_: &Request) -> ApiError {
    ApiError::new(Status::UnprocessableEntity, "Malformed request")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> ApiError {
    ApiError::new(Status::InternalServerError, "Internal server error")
}
