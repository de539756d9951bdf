use chrono::NaiveDate;
use clap::ValueEnum;

use super::{
    changed_fields, diff, resolve_city, AspectRatio, CastingMode, DiversityMode, Gender, Region,
    Season, Settings, AGE_RANGE, FAMILY_COUNT_RANGE,
};
use crate::errors::StudioError;

/// One user edit to a single settings field.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingEdit {
    Region(Region),
    City(String),
    TargetDate(Option<NaiveDate>),
    Season(Season),
    Age(u8),
    Gender(Gender),
    Occupation(String),
    Ethnicity(String),
    CastingMode(CastingMode),
    FamilyCount(u8),
    DiversityMode(DiversityMode),
    AspectRatio(AspectRatio),
    FashionColor(String),
    FashionColorName(String),
    ProjectId(String),
}

fn option<T: ValueEnum>(key: &str, value: &str) -> Result<T, StudioError> {
    T::from_str(value.trim(), true).map_err(|_| {
        let allowed: Vec<String> = T::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value().map(|p| p.get_name().to_string()))
            .collect();
        StudioError::Setting(format!("{key}: '{value}' is not one of {}", allowed.join(", ")))
    })
}

/// Whole number clamped into `range`.
fn number(key: &str, value: &str, range: (u8, u8)) -> Result<u8, StudioError> {
    let n = value
        .trim()
        .parse::<i64>()
        .map_err(|_| StudioError::Setting(format!("{key}: '{value}' is not a number")))?;
    Ok(n.clamp(range.0 as i64, range.1 as i64) as u8)
}

impl SettingEdit {
    /// Parse a `key=value` edit as typed at the interactive prompt.
    pub fn parse(key: &str, value: &str) -> Result<Self, StudioError> {
        let k = key.trim().to_lowercase().replace('-', "_");
        let edit = match k.as_str() {
            "region" => SettingEdit::Region(option(&k, value)?),
            "city" => SettingEdit::City(value.trim().to_string()),
            "target_date" | "date" => {
                let v = value.trim();
                if v.is_empty() || v.eq_ignore_ascii_case("auto") {
                    SettingEdit::TargetDate(None)
                } else {
                    let d = NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                        StudioError::Setting(format!("{k}: '{v}' is not a YYYY-MM-DD date"))
                    })?;
                    SettingEdit::TargetDate(Some(d))
                }
            }
            "season" => SettingEdit::Season(option(&k, value)?),
            "age" => SettingEdit::Age(number(&k, value, AGE_RANGE)?),
            "gender" => SettingEdit::Gender(option(&k, value)?),
            "occupation" => SettingEdit::Occupation(value.trim().to_string()),
            "ethnicity" => SettingEdit::Ethnicity(value.trim().to_string()),
            "casting_mode" | "casting" => SettingEdit::CastingMode(option(&k, value)?),
            "family_count" => SettingEdit::FamilyCount(number(&k, value, FAMILY_COUNT_RANGE)?),
            "diversity_mode" | "diversity" => SettingEdit::DiversityMode(option(&k, value)?),
            "aspect_ratio" => SettingEdit::AspectRatio(option(&k, value)?),
            "fashion_color" => SettingEdit::FashionColor(value.trim().to_string()),
            "fashion_color_name" => SettingEdit::FashionColorName(value.trim().to_string()),
            "project_id" => SettingEdit::ProjectId(value.trim().to_string()),
            other => return Err(StudioError::Setting(format!("unknown field '{other}'"))),
        };
        Ok(edit)
    }
}

/// Current settings plus the snapshot taken before the last edit.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    current: Settings,
    previous: Settings,
}

impl SettingsStore {
    pub fn new(initial: Settings) -> Self {
        let current = initial.normalized();
        Self { previous: current.clone(), current }
    }

    pub fn current(&self) -> &Settings {
        &self.current
    }

    pub fn previous(&self) -> &Settings {
        &self.previous
    }

    /// Apply one edit and report whether anything changed.
    pub fn apply(&mut self, edit: SettingEdit) -> bool {
        self.previous = self.current.clone();
        let mut next = self.current.clone();
        match edit {
            SettingEdit::Region(r) => next.region = r,
            SettingEdit::City(c) => next.city = resolve_city(next.region, &c),
            SettingEdit::TargetDate(d) => next.target_date = d,
            SettingEdit::Season(s) => next.season = s,
            SettingEdit::Age(a) => next.age = a.clamp(AGE_RANGE.0, AGE_RANGE.1),
            SettingEdit::Gender(g) => next.gender = g,
            SettingEdit::Occupation(o) => next.occupation = o,
            SettingEdit::Ethnicity(e) => next.ethnicity = e,
            SettingEdit::CastingMode(m) => next.casting_mode = m,
            SettingEdit::FamilyCount(n) => {
                next.family_count = n.clamp(FAMILY_COUNT_RANGE.0, FAMILY_COUNT_RANGE.1)
            }
            SettingEdit::DiversityMode(m) => next.diversity_mode = m,
            SettingEdit::AspectRatio(a) => next.aspect_ratio = a,
            SettingEdit::FashionColor(c) => next.fashion_color = c,
            SettingEdit::FashionColorName(n) => next.fashion_color_name = n,
            SettingEdit::ProjectId(id) => next.project_id = id,
        }
        self.current = next.normalized();
        diff(&self.previous, &self.current)
    }

    /// Surfaced fields touched by the last edit.
    pub fn highlighted(&self) -> Vec<&'static str> {
        changed_fields(&self.previous, &self.current)
    }
}
