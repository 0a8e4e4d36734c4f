use std::io::Cursor;

use rocket::form;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::{self, Json};
use rocket::{delete, get, post, put, Request, State};

use crate::errors::{ApiError, CustomResult, Error, IncompleteKeySnafu, MalformedBodySnafu};
use crate::macros::race_error_handler::race_handle_error_http;
use crate::modules::models::race::{
    NaturalKey, NewRace, Race, RaceFilter, RaceUpdate, TimeSubmission,
};
use crate::modules::race_service::RaceService;

const READ_FAILED: &str = "Failed to read race data";
const UPDATE_FAILED: &str = "Failed to update race data";
const EXPORT_FAILED: &str = "Failed to generate export";

/**************************************************************************************************/
/**************** ROUTES **************************************************************************/
/**************************************************************************************************/

/***** GETTERS *****/
/// # get all races
/// optionally filtered on `country`, `stage`, `carClass`, `car` and `surface`
#[get("/races?<filter..>")]
pub fn get_all(
    filter: RaceFilter,
    service: &State<RaceService>,
) -> Result<Json<Vec<Race>>, ApiError> {
    let races = race_handle_error_http!(
        service.list(&filter),
        "routes/api/race:get_all",
        READ_FAILED
    );
    Ok(Json(races))
}

#[get("/races/<id>", rank = 2)]
pub fn get_one(id: &str, service: &State<RaceService>) -> Result<Json<Race>, ApiError> {
    let race = race_handle_error_http!(service.get(id), "routes/api/race:get_one", READ_FAILED);
    Ok(Json(race))
}

/// # get the personal best
/// the fastest race driven in the given configuration, all five key fields are required
#[get("/races/best?<key..>")]
pub fn get_best(
    key: form::Result<'_, NaturalKey>,
    service: &State<RaceService>,
) -> Result<Json<Race>, ApiError> {
    let key = race_handle_error_http!(
        key.map_err(|errors| IncompleteKeySnafu {
            reason: describe_form_errors(&errors),
        }
        .build()),
        "routes/api/race:get_best",
        READ_FAILED
    );

    let race = race_handle_error_http!(
        service.personal_best(&key),
        "routes/api/race:get_best",
        READ_FAILED
    );
    Ok(Json(race))
}

/// # download all races as a spreadsheet
#[get("/races/export")]
pub fn export(service: &State<RaceService>) -> Result<RaceExportFile, ApiError> {
    let workbook =
        race_handle_error_http!(service.export(), "routes/api/race:export", EXPORT_FAILED);
    Ok(RaceExportFile(workbook))
}

/***** MODIFY RACES *****/
#[post("/races", data = "<payload>")]
pub fn create(
    payload: Result<Json<NewRace>, json::Error<'_>>,
    service: &State<RaceService>,
) -> Result<(Status, Json<Race>), ApiError> {
    // an empty body has no fields at all
    let payload = race_handle_error_http!(
        read_body(payload),
        "routes/api/race:create",
        UPDATE_FAILED
    )
    .unwrap_or_default();

    let race = race_handle_error_http!(
        service.create(payload),
        "routes/api/race:create",
        UPDATE_FAILED
    );
    Ok((Status::Created, Json(race)))
}

#[put("/races/<id>", data = "<update>")]
pub fn update(
    id: &str,
    update: Result<Json<RaceUpdate>, json::Error<'_>>,
    service: &State<RaceService>,
) -> Result<Json<Race>, ApiError> {
    let update = race_handle_error_http!(
        read_body(update).and_then(|update| update.ok_or(Error::MissingBodyError)),
        "routes/api/race:update",
        UPDATE_FAILED
    );

    let race = race_handle_error_http!(
        service.update(id, update),
        "routes/api/race:update",
        UPDATE_FAILED
    );
    Ok(Json(race))
}

/// # submit a new time
/// only accepted when it beats the stored time, unless `racenetOnly` is set
#[post("/races/<id>/time", data = "<submission>")]
pub fn record_time(
    id: &str,
    submission: Result<Json<TimeSubmission>, json::Error<'_>>,
    service: &State<RaceService>,
) -> Result<Json<Race>, ApiError> {
    let submission = race_handle_error_http!(
        read_body(submission).and_then(|submission| submission.ok_or(Error::MissingBodyError)),
        "routes/api/race:record_time",
        UPDATE_FAILED
    );

    let race = race_handle_error_http!(
        service.record_time(id, submission),
        "routes/api/race:record_time",
        UPDATE_FAILED
    );
    Ok(Json(race))
}

#[delete("/races/<id>")]
pub fn delete(id: &str, service: &State<RaceService>) -> Result<Json<Race>, ApiError> {
    let race =
        race_handle_error_http!(service.delete(id), "routes/api/race:delete", UPDATE_FAILED);
    Ok(Json(race))
}

#[delete("/races")]
pub fn delete_without_id() -> ApiError {
    ApiError::from_error(&Error::MissingIdError, UPDATE_FAILED)
}

/**************************************************************************************************/
/**************** HELPERS *************************************************************************/
/**************************************************************************************************/

/// # Struct representing the xlsx download
pub struct RaceExportFile(pub Vec<u8>);

impl<'r> Responder<'r, 'static> for RaceExportFile {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ))
            .raw_header("Content-Disposition", "attachment; filename=\"races.xlsx\"")
            .sized_body(self.0.len(), Cursor::new(self.0))
            .ok()
    }
}

/// # unpack a json body
/// an empty body is `None`, anything that isn't valid json for `T` is a `MalformedBodyError`
fn read_body<T>(body: Result<Json<T>, json::Error<'_>>) -> CustomResult<Option<T>> {
    match body {
        Ok(body) => Ok(Some(body.into_inner())),
        Err(json::Error::Parse(raw, _)) if raw.trim().is_empty() => Ok(None),
        Err(json::Error::Parse(_, error)) => MalformedBodySnafu {
            reason: error.to_string(),
        }
        .fail(),
        Err(json::Error::Io(error)) => MalformedBodySnafu {
            reason: error.to_string(),
        }
        .fail(),
    }
}

/// `country: missing, surface: ...` for every field that failed
fn describe_form_errors(errors: &form::Errors<'_>) -> String {
    errors
        .iter()
        .map(|error| match &error.name {
            Some(name) => format!("{}: {}", name, error.kind),
            None => error.kind.to_string(),
        })
        .collect::<Vec<String>>()
        .join(", ")
}
