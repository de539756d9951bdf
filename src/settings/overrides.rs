use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::city_key;

pub const MAX_ROOM_TYPES: usize = 4;
pub const ENTROPY_RANGE: (u8, u8) = (1, 10);

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HousingType {
    #[default]
    Apartment,
    House,
    Penthouse,
    Studio,
    Loft,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteriorStyle {
    ParisStyle,
    LondonStyle,
    RomeStyle,
    BarcelonaStyle,
    #[default]
    ModernMinimal,
    ClassicLuxury,
    IndustrialLoft,
    ScandiWarm,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Kitchen,
    Living,
    Dining,
    Bedroom,
    Bathroom,
    Laundry,
    Office,
    Hallway,
    Balcony,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputPreset {
    Basic,
    DetailPlus,
    NegativePlus,
    #[default]
    CompositeReady,
}

/// Scene parameters handed to the imaging step alongside the character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneOverrides {
    pub housing_type: HousingType,
    pub interior_style: InteriorStyle,
    pub room_types: Vec<RoomType>,
    pub entropy_level: u8,
    pub output_preset: OutputPreset,
}

/// User-supplied values; `None` keeps the derived default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverridesPatch {
    pub housing_type: Option<HousingType>,
    pub interior_style: Option<InteriorStyle>,
    pub room_types: Option<Vec<RoomType>>,
    pub entropy_level: Option<u8>,
    pub output_preset: Option<OutputPreset>,
}

impl SceneOverrides {
    /// Defaults derived from the city: a few cities carry their own interior style.
    pub fn for_city(city: &str) -> Self {
        let interior_style = match city_key(city).as_str() {
            "paris" => InteriorStyle::ParisStyle,
            "london" => InteriorStyle::LondonStyle,
            "rome" => InteriorStyle::RomeStyle,
            "barcelona" => InteriorStyle::BarcelonaStyle,
            _ => InteriorStyle::ModernMinimal,
        };
        Self {
            housing_type: HousingType::Apartment,
            interior_style,
            room_types: vec![RoomType::Kitchen, RoomType::Living, RoomType::Bedroom, RoomType::Laundry],
            entropy_level: 5,
            output_preset: OutputPreset::CompositeReady,
        }
    }
}

/// Merge the user's patch over the city-derived defaults.
/// With `auto` set the patch is ignored.
pub fn resolve(city: &str, auto: bool, patch: &OverridesPatch) -> SceneOverrides {
    let mut out = SceneOverrides::for_city(city);
    if auto {
        return out;
    }
    if let Some(h) = patch.housing_type {
        out.housing_type = h;
    }
    if let Some(s) = patch.interior_style {
        out.interior_style = s;
    }
    if let Some(rooms) = &patch.room_types {
        out.room_types = rooms.iter().copied().take(MAX_ROOM_TYPES).collect();
    }
    if let Some(e) = patch.entropy_level {
        out.entropy_level = e.clamp(ENTROPY_RANGE.0, ENTROPY_RANGE.1);
    }
    if let Some(p) = patch.output_preset {
        out.output_preset = p;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_style_mapping() {
        assert_eq!(SceneOverrides::for_city("Paris (파리)").interior_style, InteriorStyle::ParisStyle);
        assert_eq!(SceneOverrides::for_city("Rome (로마)").interior_style, InteriorStyle::RomeStyle);
        assert_eq!(SceneOverrides::for_city("Lima (리마)").interior_style, InteriorStyle::ModernMinimal);
        assert_eq!(SceneOverrides::for_city("").interior_style, InteriorStyle::ModernMinimal);
    }

    #[test]
    fn auto_ignores_patch() {
        let patch = OverridesPatch { housing_type: Some(HousingType::Loft), ..Default::default() };
        assert_eq!(resolve("London (런던)", true, &patch), SceneOverrides::for_city("London (런던)"));
    }

    #[test]
    fn manual_patch_overlays_defaults() {
        let patch = OverridesPatch {
            interior_style: Some(InteriorStyle::ScandiWarm),
            room_types: Some(vec![
                RoomType::Office,
                RoomType::Dining,
                RoomType::Balcony,
                RoomType::Hallway,
                RoomType::Bathroom,
            ]),
            entropy_level: Some(42),
            ..Default::default()
        };
        let o = resolve("Barcelona (바르셀로나)", false, &patch);
        assert_eq!(o.housing_type, HousingType::Apartment);
        assert_eq!(o.interior_style, InteriorStyle::ScandiWarm);
        assert_eq!(o.room_types.len(), MAX_ROOM_TYPES);
        assert_eq!(o.room_types[0], RoomType::Office);
        assert_eq!(o.entropy_level, 10);
        assert_eq!(o.output_preset, OutputPreset::CompositeReady);
    }

    #[test]
    fn serializes_upper_snake() {
        let v = serde_json::to_value(SceneOverrides::for_city("Paris (파리)")).unwrap();
        assert_eq!(v["interior_style"], "PARIS_STYLE");
        assert_eq!(v["output_preset"], "COMPOSITE_READY");
        assert_eq!(v["room_types"][0], "Kitchen");
    }
}
