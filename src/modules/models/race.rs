use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rocket::{FromForm, FromFormField};
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::errors::{CustomResult, Error, InvalidSurfaceSnafu, MissingFieldsSnafu};
use crate::modules::helpers::time::TimeHelper;

#[derive(Serialize, Deserialize, FromFormField, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Dry,
    Wet,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Dry => "Dry",
            Surface::Wet => "Wet",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Surface {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Dry" => Ok(Surface::Dry),
            "Wet" => Ok(Surface::Wet),
            _ => InvalidSurfaceSnafu { value }.fail(),
        }
    }
}

/// # a stored race result
/// `id` is assigned on creation and never changes afterwards.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: String,
    pub country: String,
    pub stage: String,
    pub car_class: String,
    pub car: String,
    pub surface: Surface,
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub racenet: Option<String>,
    pub date: DateTime<Utc>,
}

impl Race {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            country: self.country.clone(),
            stage: self.stage.clone(),
            car_class: self.car_class.clone(),
            car: self.car.clone(),
            surface: self.surface,
        }
    }

    /// check if the race was driven in the same configuration as `key`
    pub fn is_same_race(&self, key: &NaturalKey) -> bool {
        self.country == key.country
            && self.stage == key.stage
            && self.car_class == key.car_class
            && self.car == key.car
            && self.surface == key.surface
    }
}

/// # the fields that make two races "the same race"
/// not unique in the store, only used for lookups.
#[derive(Serialize, Deserialize, FromForm, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct NaturalKey {
    pub country: String,
    pub stage: String,
    #[field(name = "carClass")]
    pub car_class: String,
    pub car: String,
    pub surface: Surface,
}

/// # payload used to create a race
/// every field is optional here so missing ones can be reported by name.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRace {
    pub country: Option<String>,
    pub stage: Option<String>,
    pub car_class: Option<String>,
    pub car: Option<String>,
    pub surface: Option<String>,
    pub time: Option<String>,
    pub racenet: Option<String>,
}

impl NewRace {
    /// # validate the payload and turn it into a race
    ///
    /// ## Arguments
    /// * `id` - the freshly generated id
    /// * `date` - the creation time
    ///
    /// ## Returns
    /// * `Race` - the race, or the list of missing/invalid fields
    pub fn into_race(self, id: String, date: DateTime<Utc>) -> CustomResult<Race> {
        let mut missing = Vec::new();
        let country = required(self.country, "country", &mut missing);
        let stage = required(self.stage, "stage", &mut missing);
        let car_class = required(self.car_class, "carClass", &mut missing);
        let car = required(self.car, "car", &mut missing);
        let surface = required(self.surface, "surface", &mut missing);
        let time = required(self.time, "time", &mut missing);
        ensure!(missing.is_empty(), MissingFieldsSnafu { fields: missing });

        TimeHelper::parse(&time)?;
        let racenet = optional(self.racenet);
        if let Some(racenet) = &racenet {
            TimeHelper::parse(racenet)?;
        }

        Ok(Race {
            id,
            country,
            stage,
            car_class,
            car,
            surface: surface.parse()?,
            time,
            racenet,
            date,
        })
    }
}

/// # partial update of a race
/// fields that are `None` keep their stored value. an `id` in the body is ignored.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RaceUpdate {
    pub country: Option<String>,
    pub stage: Option<String>,
    pub car_class: Option<String>,
    pub car: Option<String>,
    pub surface: Option<String>,
    pub time: Option<String>,
    pub racenet: Option<String>,
}

impl RaceUpdate {
    /// # merge the update over an existing race
    /// the existing id is always kept and the date is replaced by `date`.
    pub fn apply_to(self, existing: &Race, date: DateTime<Utc>) -> CustomResult<Race> {
        let mut race = existing.clone();

        if let Some(country) = self.country {
            race.country = present(country, "country")?;
        }
        if let Some(stage) = self.stage {
            race.stage = present(stage, "stage")?;
        }
        if let Some(car_class) = self.car_class {
            race.car_class = present(car_class, "carClass")?;
        }
        if let Some(car) = self.car {
            race.car = present(car, "car")?;
        }
        if let Some(surface) = self.surface {
            race.surface = surface.parse()?;
        }
        if let Some(time) = self.time {
            let time = present(time, "time")?;
            TimeHelper::parse(&time)?;
            race.time = time;
        }
        if let Some(racenet) = self.racenet {
            let racenet = present(racenet, "racenet")?;
            TimeHelper::parse(&racenet)?;
            race.racenet = Some(racenet);
        }

        race.date = date;
        race.id = existing.id.clone();
        Ok(race)
    }
}

/// # a new time for an existing race
/// with `racenet_only` the reference time is replaced and the personal time left alone.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeSubmission {
    pub time: String,
    #[serde(default)]
    pub racenet_only: bool,
}

/// # filter used when listing races
/// blank values don't filter. values are compared as text, so an unknown surface
/// matches nothing.
#[derive(FromForm, Debug, Clone, Default)]
pub struct RaceFilter {
    pub country: Option<String>,
    pub stage: Option<String>,
    #[field(name = "carClass")]
    pub car_class: Option<String>,
    pub car: Option<String>,
    pub surface: Option<String>,
}

impl RaceFilter {
    pub fn matches(&self, race: &Race) -> bool {
        fn field_matches(filter: &Option<String>, value: &str) -> bool {
            match filter.as_deref().map(str::trim) {
                None | Some("") => true,
                Some(filter) => filter == value,
            }
        }

        field_matches(&self.country, &race.country)
            && field_matches(&self.stage, &race.stage)
            && field_matches(&self.car_class, &race.car_class)
            && field_matches(&self.car, &race.car)
            && field_matches(&self.surface, race.surface.as_str())
    }
}

fn required(value: Option<String>, name: &'static str, missing: &mut Vec<&'static str>) -> String {
    match optional(value) {
        Some(value) => value,
        None => {
            missing.push(name);
            String::new()
        }
    }
}

/// trimmed value, blank counts as absent
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn present(value: String, name: &'static str) -> CustomResult<String> {
    let value = value.trim().to_string();
    ensure!(!value.is_empty(), MissingFieldsSnafu { fields: vec![name] });
    Ok(value)
}
