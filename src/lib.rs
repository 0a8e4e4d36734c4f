use rocket::{Build, Rocket};

pub mod config;
pub mod errors;
pub mod modules;
pub mod routes {
    pub mod api {
        pub mod catchers;
        pub mod race;
    }
}

mod macros {
    pub mod race_error_handler;
}

use modules::race_service::RaceService;
use routes::api::race;

/// # assemble the web application
/// mounts the race api on `/` with `service` as managed state.
pub fn build_rocket(service: RaceService) -> Rocket<Build> {
    rocket::build()
        .manage(service)
        .mount(
            "/",
            rocket::routes![
                // reading
                race::get_all,
                race::get_one,
                race::get_best,
                race::export,
                // modifying
                race::create,
                race::update,
                race::record_time,
                race::delete,
                race::delete_without_id,
            ],
        )
        .register(
            "/",
            rocket::catchers![
                routes::api::catchers::bad_request,
                routes::api::catchers::not_found,
                routes::api::catchers::unprocessable,
                routes::api::catchers::internal_error,
            ],
        )
}
