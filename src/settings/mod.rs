use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod overrides;
pub mod store;

pub use store::{SettingEdit, SettingsStore};

/// Rendered in place of an empty optional field.
pub const AUTO: &str = "Auto";

pub const AGE_RANGE: (u8, u8) = (0, 100);
pub const FAMILY_COUNT_RANGE: (u8, u8) = (2, 10);

const EU_CITIES: &[&str] = &[
    "Paris (파리)",
    "London (런던)",
    "Rome (로마)",
    "Barcelona (바르셀로나)",
    "Berlin (베를린)",
    "Amsterdam (암스테르담)",
    "Prague (프라하)",
    "Vienna (비엔나)",
];

const LATAM_CITIES: &[&str] = &[
    "Mexico City (멕시코시티)",
    "São Paulo (상파울루)",
    "Buenos Aires (부에노스아이레스)",
    "Bogotá (보고타)",
    "Lima (리마)",
    "Santiago (산티아고)",
    "Rio de Janeiro (리우)",
];

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Region {
    #[default]
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "LATAM")]
    Latam,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Eu => "EU",
            Region::Latam => "LATAM",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Eu => "EU(유럽)",
            Region::Latam => "LATAM(라틴아메리카)",
        }
    }

    /// Cities offered for this region. The first entry is the region default.
    pub fn cities(&self) -> &'static [&'static str] {
        match self {
            Region::Eu => EU_CITIES,
            Region::Latam => LATAM_CITIES,
        }
    }

    pub fn default_city(&self) -> &'static str {
        self.cities()[0]
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    #[default]
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "SPRING",
            Season::Summer => "SUMMER",
            Season::Fall => "FALL",
            Season::Winter => "WINTER",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[default]
    Auto,
    Female,
    Male,
    NonBinary,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Auto => AUTO,
            Gender::Female => "Female",
            Gender::Male => "Male",
            Gender::NonBinary => "Non-binary",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CastingMode {
    #[default]
    Single,
    Multi,
}

impl CastingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CastingMode::Single => "SINGLE",
            CastingMode::Multi => "MULTI",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiversityMode {
    #[default]
    Auto,
    Local,
    Mixed,
}

impl DiversityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiversityMode::Auto => "AUTO",
            DiversityMode::Local => "LOCAL",
            DiversityMode::Mixed => "MIXED",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AspectRatio {
    #[value(name = "1:1")]
    #[serde(rename = "1:1")]
    Square,
    #[default]
    #[value(name = "4:5")]
    #[serde(rename = "4:5")]
    Portrait4x5,
    #[value(name = "3:4")]
    #[serde(rename = "3:4")]
    Portrait3x4,
    #[value(name = "16:9")]
    #[serde(rename = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    #[serde(rename = "9:16")]
    Vertical,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait4x5 => "4:5",
            AspectRatio::Portrait3x4 => "3:4",
            AspectRatio::Landscape => "16:9",
            AspectRatio::Vertical => "9:16",
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Region, Season, Gender, CastingMode, DiversityMode, AspectRatio);

/// Scene/persona parameters collected from the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub region: Region,
    pub city: String,
    pub target_date: Option<NaiveDate>,
    pub season: Season,
    pub age: u8,
    pub gender: Gender,
    pub occupation: String,
    pub ethnicity: String,
    pub casting_mode: CastingMode,
    /// Only surfaced when `casting_mode` is `Multi`.
    pub family_count: u8,
    pub diversity_mode: DiversityMode,
    pub aspect_ratio: AspectRatio,
    pub fashion_color: String,
    pub fashion_color_name: String,
    pub project_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: Region::Eu,
            city: Region::Eu.default_city().to_string(),
            target_date: None,
            season: Season::Winter,
            age: 35,
            gender: Gender::Auto,
            occupation: "Gallery Curator".into(),
            ethnicity: String::new(),
            casting_mode: CastingMode::Single,
            family_count: 3,
            diversity_mode: DiversityMode::Auto,
            aspect_ratio: AspectRatio::Portrait4x5,
            fashion_color: "#C19A6B".into(),
            fashion_color_name: "Camel".into(),
            project_id: String::new(),
        }
    }
}

impl Settings {
    pub fn is_multi(&self) -> bool {
        self.casting_mode == CastingMode::Multi
    }

    /// Labeled values of every surfaced field, in prompt order.
    /// The family count is omitted unless the casting mode is multi-person.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            ("Region", self.region.to_string()),
            ("City", self.city.clone()),
            (
                "Target Date",
                self.target_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| AUTO.to_string()),
            ),
            ("Season", self.season.to_string()),
            ("Age", self.age.to_string()),
            ("Gender", self.gender.to_string()),
            ("Occupation", or_auto(&self.occupation)),
            ("Ethnicity", or_auto(&self.ethnicity)),
            ("Casting Mode", self.casting_mode.to_string()),
        ];
        if self.is_multi() {
            out.push(("Family Count", self.family_count.to_string()));
        }
        out.extend([
            ("Diversity Mode", self.diversity_mode.to_string()),
            ("Aspect Ratio", self.aspect_ratio.to_string()),
            ("Fashion Color", or_auto(&self.fashion_color)),
            ("Fashion Color Name", or_auto(&self.fashion_color_name)),
            ("Project ID", or_auto(&self.project_id)),
        ]);
        out
    }

    /// Copy with the city reset to the region default when it is not offered
    /// for the current region.
    pub fn normalized(&self) -> Settings {
        normalize(self, self.region.cities())
    }
}

fn or_auto(s: &str) -> String {
    let t = s.trim();
    if t.is_empty() { AUTO.to_string() } else { t.to_string() }
}

pub fn normalize(current: &Settings, region_cities: &[&str]) -> Settings {
    let mut out = current.clone();
    if !region_cities.iter().any(|c| *c == current.city) {
        if let Some(first) = region_cities.first() {
            out.city = first.to_string();
        }
    }
    out
}

pub fn diff(a: &Settings, b: &Settings) -> bool {
    a != b
}

/// Labels of surfaced fields whose rendered value differs between `a` and `b`.
pub fn changed_fields(a: &Settings, b: &Settings) -> Vec<&'static str> {
    let before = a.fields();
    let after = b.fields();
    let mut out: Vec<&'static str> = after
        .iter()
        .filter(|(label, value)| {
            before
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, v)| v != value)
                .unwrap_or(true)
        })
        .map(|(label, _)| *label)
        .collect();
    for (label, _) in &before {
        if !after.iter().any(|(l, _)| l == label) {
            out.push(*label);
        }
    }
    out
}

/// Lower-cased city name without the localized suffix, e.g. `"paris"`.
pub fn city_key(city: &str) -> String {
    city.split(" (").next().unwrap_or("").trim().to_lowercase()
}

/// Match user input against the region's catalog by full label or bare name.
/// Unmatched input is returned as typed; normalization resets it later.
pub fn resolve_city(region: Region, input: &str) -> String {
    let wanted = input.trim();
    region
        .cities()
        .iter()
        .find(|c| **c == wanted || city_key(c) == wanted.to_lowercase())
        .map(|c| c.to_string())
        .unwrap_or_else(|| wanted.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_city_belongs_to_default_region() {
        let s = Settings::default();
        assert!(Region::Eu.cities().contains(&s.city.as_str()));
        assert_eq!(s.normalized(), s);
    }

    #[test]
    fn foreign_city_resets_to_region_default() {
        let s = Settings {
            region: Region::Latam,
            city: "Paris (파리)".into(),
            ..Settings::default()
        };
        let n = s.normalized();
        assert_eq!(n.city, "Mexico City (멕시코시티)");
        assert_eq!(n.region, Region::Latam);
    }

    #[test]
    fn member_city_is_kept() {
        let s = Settings { city: "Vienna (비엔나)".into(), ..Settings::default() };
        assert_eq!(normalize(&s, EU_CITIES).city, "Vienna (비엔나)");
    }

    #[test]
    fn normalize_uses_supplied_list() {
        let s = Settings::default();
        let n = normalize(&s, &["Lisbon", "Porto"]);
        assert_eq!(n.city, "Lisbon");
    }

    #[test]
    fn diff_sees_hidden_family_count() {
        let a = Settings::default();
        let b = Settings { family_count: 7, ..a.clone() };
        assert!(diff(&a, &b));
        assert!(!diff(&a, &a.clone()));
        // single casting hides the count, so nothing surfaced changed
        assert!(changed_fields(&a, &b).is_empty());
    }

    #[test]
    fn changed_fields_tracks_casting_switch() {
        let a = Settings::default();
        let b = Settings { casting_mode: CastingMode::Multi, ..a.clone() };
        let changed = changed_fields(&a, &b);
        assert!(changed.contains(&"Casting Mode"));
        assert!(changed.contains(&"Family Count"));
        assert_eq!(changed.len(), 2);
    }

    #[test]
    fn empty_optionals_render_auto() {
        let s = Settings::default();
        let fields = s.fields();
        let get = |k: &str| fields.iter().find(|(l, _)| *l == k).map(|(_, v)| v.clone());
        assert_eq!(get("Ethnicity").as_deref(), Some(AUTO));
        assert_eq!(get("Project ID").as_deref(), Some(AUTO));
        assert_eq!(get("Target Date").as_deref(), Some(AUTO));
        assert_eq!(get("Family Count"), None);
    }

    #[test]
    fn resolve_city_by_bare_name() {
        assert_eq!(resolve_city(Region::Eu, "london"), "London (런던)");
        assert_eq!(resolve_city(Region::Latam, "Bogotá"), "Bogotá (보고타)");
        assert_eq!(resolve_city(Region::Eu, "Madrid"), "Madrid");
        assert_eq!(city_key("Rio de Janeiro (리우)"), "rio de janeiro");
    }
}
