use anyhow::Result;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::errors::StudioError;
use crate::settings::overrides::SceneOverrides;
use crate::settings::{AspectRatio, CastingMode, DiversityMode, Gender, Region, Season, Settings};

pub const SCHEMA_VERSION: &str = "step1.v1";

/// Free-text inputs that travel with the settings into the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Brief {
    pub concept: String,
    pub concept_summary: String,
    pub biometric_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub schema_version: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixed {
    pub age: u8,
    pub occupation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Casting {
    pub mode: CastingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_count: Option<u8>,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<String>,
    pub diversity_mode: DiversityMode,
}

/// Document consumed by the imaging step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffDocument {
    pub meta: Meta,
    pub project_id: String,
    pub region: Region,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    pub season: Season,
    pub aspect_ratio: AspectRatio,
    pub fashion_color: String,
    pub fashion_color_name: String,
    pub biometric_ids: Vec<String>,
    pub fixed: Fixed,
    pub casting: Casting,
    pub concept: String,
    pub concept_summary: String,
    pub character: Map<String, Value>,
    pub step2_overrides: SceneOverrides,
}

/// The payload's `character` member, or the payload itself when it has none.
pub fn character_of(payload: &Value) -> Result<Map<String, Value>, StudioError> {
    let character = payload.get("character").unwrap_or(payload);
    character
        .as_object()
        .cloned()
        .ok_or_else(|| StudioError::Handoff("character JSON is not an object".into()))
}

pub fn build(
    settings: &Settings,
    overrides: &SceneOverrides,
    brief: &Brief,
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<HandoffDocument, StudioError> {
    if settings.project_id.trim().is_empty() {
        return Err(StudioError::Handoff("project id is empty".into()));
    }
    let ethnicity = settings.ethnicity.trim();
    Ok(HandoffDocument {
        meta: Meta {
            schema_version: SCHEMA_VERSION.into(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        },
        project_id: settings.project_id.clone(),
        region: settings.region,
        city: settings.city.clone(),
        target_date: settings.target_date,
        season: settings.season,
        aspect_ratio: settings.aspect_ratio,
        fashion_color: settings.fashion_color.clone(),
        fashion_color_name: settings.fashion_color_name.clone(),
        biometric_ids: brief.biometric_ids.clone(),
        fixed: Fixed { age: settings.age, occupation: settings.occupation.clone() },
        casting: Casting {
            mode: settings.casting_mode,
            family_count: settings.is_multi().then_some(settings.family_count),
            gender: settings.gender,
            ethnicity: (!ethnicity.is_empty()).then(|| ethnicity.to_string()),
            diversity_mode: settings.diversity_mode,
        },
        concept: brief.concept.clone(),
        concept_summary: brief.concept_summary.clone(),
        character: character_of(payload)?,
        step2_overrides: overrides.clone(),
    })
}

/// `{project_id}_step1.json`, with path separators replaced so the file stays in its directory.
pub fn file_name(doc: &HandoffDocument) -> String {
    let stem: String = doc
        .project_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') || c.is_control() { '_' } else { c })
        .collect();
    format!("{stem}_step1.json")
}

/// Write the pretty-printed document into `dir`, creating it if needed.
pub fn write(doc: &HandoffDocument, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name(doc));
    fs::write(&path, serde_json::to_string_pretty(doc)?)?;
    Ok(path)
}
