//! Core data types for the harvester.
//!
//! `Item` describes one bulletin entry as listed in the daily summary.
//! `Appointment` and `Situation` are the extracted records; both validate
//! their fields on construction and are immutable afterwards.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{HarvesterError, Result};
use crate::patterns::TitleMatch;

/// One bulletin entry from the daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Item identifier (e.g., "BOE-A-2019-8117").
    pub id: String,

    /// Full item title.
    pub title: String,

    /// Path of the HTML rendering.
    pub url_htm: String,

    /// Path of the XML rendering.
    pub url_xml: String,
}

/// A judicial-office appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Appointment {
    id: String,
    date: Option<NaiveDate>,
    person: String,
    position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    chamber: Option<String>,
    court: String,
}

impl Appointment {
    /// Build an appointment, rejecting empty required fields.
    pub fn new(
        id: impl Into<String>,
        date: Option<NaiveDate>,
        person: impl Into<String>,
        position: impl Into<String>,
        chamber: Option<String>,
        court: impl Into<String>,
    ) -> Result<Self> {
        let id = required_field(id.into(), "", "id")?;
        Ok(Self {
            date,
            person: required_field(person.into(), &id, "person")?,
            position: required_field(position.into(), &id, "position")?,
            chamber: chamber
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            court: required_field(court.into(), &id, "court")?,
            id,
        })
    }

    /// Build an appointment from the captures of an appointment pattern.
    pub fn from_match(id: &str, date: Option<NaiveDate>, found: &TitleMatch) -> Result<Self> {
        Self::new(
            id,
            date,
            captured(found, id, "person")?,
            captured(found, id, "position")?,
            found.get("chamber").map(str::to_string),
            captured(found, id, "court")?,
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn person(&self) -> &str {
        &self.person
    }

    pub fn position(&self) -> &str {
        &self.position
    }

    pub fn chamber(&self) -> Option<&str> {
        self.chamber.as_deref()
    }

    pub fn court(&self) -> &str {
        &self.court
    }
}

/// A judicial status change, such as a retirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Situation {
    id: String,
    date: Option<NaiveDate>,
    person: String,
}

impl Situation {
    /// Build a situation, rejecting an empty id or person.
    pub fn new(
        id: impl Into<String>,
        date: Option<NaiveDate>,
        person: impl Into<String>,
    ) -> Result<Self> {
        let id = required_field(id.into(), "", "id")?;
        Ok(Self {
            date,
            person: required_field(person.into(), &id, "person")?,
            id,
        })
    }

    /// Build a situation from the captures of a situation pattern.
    pub fn from_match(id: &str, date: Option<NaiveDate>, found: &TitleMatch) -> Result<Self> {
        Self::new(id, date, captured(found, id, "person")?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn person(&self) -> &str {
        &self.person
    }
}

fn captured<'a>(found: &'a TitleMatch, id: &str, field: &'static str) -> Result<&'a str> {
    found.get(field).ok_or_else(|| HarvesterError::MissingCapture {
        id: id.to_string(),
        field,
    })
}

fn required_field(value: String, id: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HarvesterError::MissingCapture {
            id: id.to_string(),
            field,
        });
    }
    Ok(trimmed.to_string())
}
