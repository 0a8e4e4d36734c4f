use std::sync::Mutex;

use log::error;
use redis::Client;
use snafu::ResultExt;

use crate::errors::{
    CustomResult, RedisConnectionSnafu, RedisSnafu, SerializationSnafu, StoreLockSnafu,
};
use crate::modules::models::race::Race;
use crate::modules::redis::Redis;

/// # storage of the race list
/// the whole list lives under a single key and is always read and written as one value.
///
/// there is no version check between `load` and `save`: when two writers race the
/// last `save` wins.
pub trait RaceStore: Send + Sync {
    /// `None` when the key has never been set
    fn load(&self) -> CustomResult<Option<Vec<Race>>>;

    fn save(&self, races: &[Race]) -> CustomResult<()>;
}

pub struct RedisStore {
    client: Client,
    key: String,
}

impl RedisStore {
    /// # open a store on a redis server
    /// only validates the url, connections are made per operation.
    ///
    /// ## Arguments
    /// * `redis_url` - e.g. `redis://127.0.0.1/`
    /// * `key` - the key holding the race list
    pub fn open(redis_url: &str, key: &str) -> CustomResult<RedisStore> {
        let client = Redis::open(redis_url).context(RedisConnectionSnafu)?;
        Ok(RedisStore {
            client,
            key: key.to_string(),
        })
    }
}

impl RaceStore for RedisStore {
    fn load(&self) -> CustomResult<Option<Vec<Race>>> {
        let conn = &mut Redis::connect(&self.client)
            .map_err(|error| {
                error!(target:"modules/store:load", "Error connecting to redis: {}", error);
                error
            })
            .context(RedisConnectionSnafu)?;

        let blob: Option<String> = Redis::get_data(conn, &self.key).context(RedisSnafu)?;
        blob.as_deref().map(decode).transpose().map(Option::flatten)
    }

    fn save(&self, races: &[Race]) -> CustomResult<()> {
        let blob = encode(races)?;
        let conn = &mut Redis::connect(&self.client)
            .map_err(|error| {
                error!(target:"modules/store:save", "Error connecting to redis: {}", error);
                error
            })
            .context(RedisConnectionSnafu)?;

        Redis::set_data(conn, &self.key, blob).context(RedisSnafu)
    }
}

/// # store kept in process memory
/// holds the same serialized blob redis would, used when no redis url is configured.
#[derive(Default)]
pub struct MemoryStore {
    blob: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// a store that already holds `races`
    pub fn with_races(races: &[Race]) -> CustomResult<MemoryStore> {
        Ok(MemoryStore {
            blob: Mutex::new(Some(encode(races)?)),
        })
    }
}

impl RaceStore for MemoryStore {
    fn load(&self) -> CustomResult<Option<Vec<Race>>> {
        let blob = self.blob.lock().map_err(|_| StoreLockSnafu.build())?;
        blob.as_deref().map(decode).transpose().map(Option::flatten)
    }

    fn save(&self, races: &[Race]) -> CustomResult<()> {
        let encoded = encode(races)?;
        let mut blob = self.blob.lock().map_err(|_| StoreLockSnafu.build())?;
        *blob = Some(encoded);
        Ok(())
    }
}

fn encode(races: &[Race]) -> CustomResult<String> {
    serde_json::to_string(races).context(SerializationSnafu)
}

/// an empty value counts as never set
fn decode(blob: &str) -> CustomResult<Option<Vec<Race>>> {
    if blob.trim().is_empty() {
        return Ok(None);
    }

    serde_json::from_str(blob).map(Some).context(SerializationSnafu)
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::{decode, MemoryStore, RaceStore};
    use crate::errors::Error;
    use crate::modules::models::race::{Race, Surface};

    fn race(id: &str) -> Race {
        Race {
            id: id.to_string(),
            country: "Italy".to_string(),
            stage: "Monza".to_string(),
            car_class: "GT".to_string(),
            car: "911".to_string(),
            surface: Surface::Dry,
            time: "01:23.456".to_string(),
            racenet: None,
            date: Utc::now(),
        }
    }

    #[test]
    fn unset_store_loads_none() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_replaces_whole_list() {
        let store = MemoryStore::new();
        store.save(&[race("a"), race("b")]).unwrap();
        assert_eq!(store.load().unwrap().unwrap().len(), 2);

        store.save(&[race("c")]).unwrap();
        let races = store.load().unwrap().unwrap();
        assert_eq!(races.len(), 1);
        assert_eq!(races[0].id, "c");

        store.save(&[]).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![]));
    }

    #[test]
    fn last_write_wins() {
        let store = MemoryStore::with_races(&[race("a")]).unwrap();

        let mut first = store.load().unwrap().unwrap();
        let mut second = store.load().unwrap().unwrap();
        first.push(race("b"));
        second.push(race("c"));
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let ids: Vec<String> = store.load().unwrap().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn decode_blob() {
        assert!(decode("").unwrap().is_none());
        assert_eq!(decode("[]").unwrap(), Some(vec![]));
        assert!(matches!(decode("{not json"), Err(Error::SerializationError { .. })));
    }
}
