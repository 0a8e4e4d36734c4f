use chrono::Utc;
use log::{info, warn};
use snafu::{ensure, OptionExt};
use uuid::Uuid;

use crate::errors::{CustomResult, NoRaceDataSnafu, NotImprovedSnafu, RaceNotFoundSnafu};
use crate::modules::export::RaceExport;
use crate::modules::helpers::time::TimeHelper;
use crate::modules::models::race::{
    NaturalKey, NewRace, Race, RaceFilter, RaceUpdate, TimeSubmission,
};
use crate::modules::store::RaceStore;

/// # race record service
/// every mutation loads the whole list, changes it in memory and saves it back.
pub struct RaceService {
    store: Box<dyn RaceStore>,
}

impl RaceService {
    pub fn new(store: impl RaceStore + 'static) -> RaceService {
        RaceService {
            store: Box::new(store),
        }
    }

    /********** GETTERS **********/
    /// # list the stored races
    ///
    /// ## Arguments
    /// * `filter` - only races matching every set filter value are returned
    ///
    /// ## Returns
    /// * `Vec<Race>` - the races in stored order, `NoRaceDataError` when nothing was ever stored
    pub fn list(&self, filter: &RaceFilter) -> CustomResult<Vec<Race>> {
        let races = self.store.load()?.context(NoRaceDataSnafu)?;

        Ok(races.into_iter().filter(|race| filter.matches(race)).collect())
    }

    pub fn get(&self, id: &str) -> CustomResult<Race> {
        self.load_or_empty()?
            .into_iter()
            .find(|race| race.id == id)
            .context(RaceNotFoundSnafu { id })
    }

    /// all races driven in the configuration of `key`
    pub fn find_by_natural_key(&self, key: &NaturalKey) -> CustomResult<Vec<Race>> {
        Ok(self
            .load_or_empty()?
            .into_iter()
            .filter(|race| race.is_same_race(key))
            .collect())
    }

    /// # get the personal best
    /// the fastest race for the configuration, the first one wins a tie.
    /// races whose stored time doesn't parse are skipped.
    pub fn personal_best(&self, key: &NaturalKey) -> CustomResult<Race> {
        let mut best: Option<(i64, Race)> = None;

        for race in self.find_by_natural_key(key)? {
            let millis = match TimeHelper::parse(&race.time) {
                Ok(millis) => millis,
                Err(error) => {
                    warn!(target:"modules/race_service:personal_best",
                        "skipping race {}: {}", race.id, error);
                    continue;
                }
            };

            if best.as_ref().map_or(true, |(best_millis, _)| millis < *best_millis) {
                best = Some((millis, race));
            }
        }

        best.map(|(_, race)| race).context(RaceNotFoundSnafu {
            id: format!("best of {} {}", key.country, key.stage),
        })
    }

    /********** MODIFIERS **********/
    /// # create a race
    /// the race gets a fresh id and the current date.
    pub fn create(&self, payload: NewRace) -> CustomResult<Race> {
        let mut races = self.load_or_empty()?;

        let race = payload.into_race(Uuid::new_v4().to_string(), Utc::now())?;
        races.push(race.clone());
        self.store.save(&races)?;

        info!(target:"modules/race_service:create", "created race {}", race.id);
        Ok(race)
    }

    /// # update a race
    /// present fields of `update` overwrite the stored ones, the id never changes.
    ///
    /// faster-time checks are not applied here, use `record_time` for that.
    pub fn update(&self, id: &str, update: RaceUpdate) -> CustomResult<Race> {
        let mut races = self.load_or_empty()?;
        let index = Self::position(&races, id)?;

        let race = update.apply_to(&races[index], Utc::now())?;
        races[index] = race.clone();
        self.store.save(&races)?;

        info!(target:"modules/race_service:update", "updated race {}", race.id);
        Ok(race)
    }

    /// # submit a new time for a race
    /// a personal time is only accepted when strictly faster than the stored one.
    /// with `racenet_only` the reference time is replaced without any comparison.
    pub fn record_time(&self, id: &str, submission: TimeSubmission) -> CustomResult<Race> {
        let mut races = self.load_or_empty()?;
        let index = Self::position(&races, id)?;

        let time = submission.time.trim().to_string();
        TimeHelper::parse(&time)?;

        let race = &mut races[index];
        if submission.racenet_only {
            race.racenet = Some(time);
        } else {
            ensure!(
                TimeHelper::is_better(&time, &race.time)?,
                NotImprovedSnafu {
                    time,
                    previous: race.time.clone(),
                }
            );
            race.time = time;
        }
        race.date = Utc::now();

        let race = race.clone();
        self.store.save(&races)?;

        info!(target:"modules/race_service:record_time",
            "recorded time {} for race {}", race.time, race.id);
        Ok(race)
    }

    /// # delete a race
    /// removes the first race with the id.
    pub fn delete(&self, id: &str) -> CustomResult<Race> {
        let mut races = self.load_or_empty()?;
        let index = Self::position(&races, id)?;

        let race = races.remove(index);
        self.store.save(&races)?;

        info!(target:"modules/race_service:delete", "deleted race {}", race.id);
        Ok(race)
    }

    /********** EXPORT **********/
    /// # export all races as an xlsx workbook
    pub fn export(&self) -> CustomResult<Vec<u8>> {
        let races = self.load_or_empty()?;
        ensure!(!races.is_empty(), NoRaceDataSnafu);

        RaceExport::to_xlsx(&races)
    }

    /********** HELPERS **********/
    /// write paths treat an unset key as an empty list
    fn load_or_empty(&self) -> CustomResult<Vec<Race>> {
        Ok(self.store.load()?.unwrap_or_default())
    }

    fn position(races: &[Race], id: &str) -> CustomResult<usize> {
        races
            .iter()
            .position(|race| race.id == id)
            .context(RaceNotFoundSnafu { id })
    }
}
