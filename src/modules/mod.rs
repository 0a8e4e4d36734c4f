pub mod export;
pub mod race_service;
pub mod redis;
pub mod store;
pub mod models {
    pub mod race;
}

pub mod helpers {
    pub mod logging;
    pub mod time;
}
