use std::error::Error;

use log::{info, warn};

use racing_times_tracker::build_rocket;
use racing_times_tracker::config::Config;
use racing_times_tracker::modules::helpers::logging::setup_logging;
use racing_times_tracker::modules::race_service::RaceService;
use racing_times_tracker::modules::store::{MemoryStore, RedisStore};

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();
    setup_logging(&config)?;

    let service = match &config.redis_url {
        Some(redis_url) => {
            info!(target:"main", "storing races in redis under `{}`", config.races_key);
            RaceService::new(RedisStore::open(redis_url, &config.races_key)?)
        }
        None => {
            // nothing survives a restart in this mode
            warn!(target:"main", "REDIS_URL not set, races are kept in memory only");
            RaceService::new(MemoryStore::new())
        }
    };

    // start the webserver
    let _rocket = build_rocket(service).launch().await?;

    Ok(())
}
