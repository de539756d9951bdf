use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::settings::overrides::{HousingType, InteriorStyle, OutputPreset, OverridesPatch, RoomType};
use crate::settings::{
    resolve_city, AspectRatio, CastingMode, DiversityMode, Gender, Region, Season, Settings,
    AGE_RANGE, FAMILY_COUNT_RANGE,
};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(alias = "local")]
    Ollama,
}

#[derive(Parser, Debug)]
#[command(name = "art_director", version, about = "Casting brief front-end: settings in, persona JSON out")]
pub struct Args {
    /// TOML or YAML config file
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Region::Eu)]
    pub region: Region,

    /// City name or label; falls back to the region's first city
    #[arg(long)]
    pub city: Option<String>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub target_date: Option<NaiveDate>,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Season::Winter)]
    pub season: Season,

    #[arg(long, default_value_t = 35, value_parser = clap::value_parser!(u8).range(AGE_RANGE.0 as i64..=AGE_RANGE.1 as i64))]
    pub age: u8,

    #[arg(long, value_enum, ignore_case = true, default_value_t = Gender::Auto)]
    pub gender: Gender,

    #[arg(long, default_value = "Gallery Curator")]
    pub occupation: String,

    #[arg(long, default_value = "")]
    pub ethnicity: String,

    #[arg(long, value_enum, ignore_case = true, default_value_t = CastingMode::Single)]
    pub casting_mode: CastingMode,

    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(FAMILY_COUNT_RANGE.0 as i64..=FAMILY_COUNT_RANGE.1 as i64))]
    pub family_count: u8,

    #[arg(long, value_enum, ignore_case = true, default_value_t = DiversityMode::Auto)]
    pub diversity_mode: DiversityMode,

    #[arg(long, value_enum, default_value_t = AspectRatio::Portrait4x5)]
    pub aspect_ratio: AspectRatio,

    #[arg(long, default_value = "#C19A6B")]
    pub fashion_color: String,

    #[arg(long, default_value = "Camel")]
    pub fashion_color_name: String,

    /// Explicit project id; generated from the concept when omitted
    #[arg(long)]
    pub project_id: Option<String>,

    #[arg(long, default_value = "")]
    pub concept: String,

    #[arg(long, default_value = "")]
    pub concept_summary: String,

    /// Comma separated, e.g. id1,id2,id3
    #[arg(long, default_value = "")]
    pub biometric_ids: String,

    /// Free-text direction for the first turn
    #[arg(long)]
    pub direction: Option<String>,

    /// Ask the model to translate the direction to English first
    #[arg(long, default_value_t = false)]
    pub translate: bool,

    /// Use the city-derived scene overrides and ignore the override flags
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_overrides: bool,

    #[arg(long, value_enum)]
    pub housing_type: Option<HousingType>,

    #[arg(long, value_enum)]
    pub interior_style: Option<InteriorStyle>,

    #[arg(long, value_enum, value_delimiter = ',')]
    pub room_types: Option<Vec<RoomType>>,

    #[arg(long)]
    pub entropy_level: Option<u8>,

    #[arg(long, value_enum)]
    pub output_preset: Option<OutputPreset>,

    /// Keep reading directions from stdin after the first turn
    #[arg(long, short = 'i', default_value_t = false)]
    pub interactive: bool,

    /// Where the hand-off document is written
    #[arg(long)]
    pub out: Option<String>,

    #[arg(long, default_value_t = false)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub progress: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            region: self.region,
            city: self
                .city
                .as_deref()
                .map(|c| resolve_city(self.region, c))
                .unwrap_or_else(|| self.region.default_city().to_string()),
            target_date: self.target_date,
            season: self.season,
            age: self.age,
            gender: self.gender,
            occupation: self.occupation.clone(),
            ethnicity: self.ethnicity.clone(),
            casting_mode: self.casting_mode,
            family_count: self.family_count,
            diversity_mode: self.diversity_mode,
            aspect_ratio: self.aspect_ratio,
            fashion_color: self.fashion_color.clone(),
            fashion_color_name: self.fashion_color_name.clone(),
            project_id: self.project_id.clone().unwrap_or_default(),
        }
    }

    pub fn overrides_patch(&self) -> OverridesPatch {
        OverridesPatch {
            housing_type: self.housing_type,
            interior_style: self.interior_style,
            room_types: self.room_types.clone(),
            entropy_level: self.entropy_level,
            output_preset: self.output_preset,
        }
    }

    pub fn biometric_ids(&self) -> Vec<String> {
        parse_id_list(&self.biometric_ids)
    }
}

pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}
