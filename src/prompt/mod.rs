use crate::settings::Settings;

pub const HEADER: &str = "### SCENE SETTINGS";
pub const TRANSLATION_HEADER: &str = "### TRANSLATION";
pub const DIRECTION_HEADER: &str = "### USER DIRECTION";

fn character_fields() -> &'static str {
r#"Character fields:
gender_presentation, ethnicity_or_origin, hair, makeup, outfit, accessories, body_language,
facial_expression, vibe_keywords, camera_notes, lighting_notes."#
}

fn output_contract() -> &'static str {
r#"Output Contract:
- Start with a short note (2-4 sentences) for the art director explaining the persona.
- Then emit EXACTLY ONE fenced block opened with ```json and closed with ```.
- The block MUST be valid JSON: an object with a "character" field. No comments, no trailing commas.
- Never put triple backticks inside JSON values.
- Keep values concise and production-ready."#
}

fn settings_contract() -> String {
    format!(
        r#"Input Format:
- Each request starts with a {HEADER} line followed by one "Key: value" line per field.
- "Auto" means you choose a value that fits the region, city and concept.
- "Family Count" appears only for MULTI casting; then describe every member inside "character.members".
- The {DIRECTION_HEADER} section carries the art director's free-text intent; follow it unless it contradicts the settings."#
    )
}

/// Default system instruction for the persona step.
pub fn system_prompt() -> String {
    format!(
        r#"You are the casting and persona designer for STEP 1 of an art-direction pipeline.
You turn scene settings into a photographable character for an advertising shoot.

{settings_contract}

{output_contract}

{character_fields}
"#,
        settings_contract = settings_contract(),
        output_contract = output_contract(),
        character_fields = character_fields(),
    )
}

fn translation_instruction() -> &'static str {
r#"The user direction may be written in Korean or another language.
Translate it to English before using it, and write every JSON value in English.
Keep the prose note in the user's language."#
}

/// Build the turn prompt: settings snapshot, optional translation note, then the
/// user direction verbatim. Line order is fixed.
pub fn assemble(settings: &Settings, user_direction: &str, model_name: &str, translation_requested: bool) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(&format!("Model: {}\n", model_name));
    for (key, value) in settings.fields() {
        out.push_str(&format!("{}: {}\n", key, value));
    }

    if translation_requested {
        out.push('\n');
        out.push_str(TRANSLATION_HEADER);
        out.push('\n');
        out.push_str(translation_instruction());
        out.push('\n');
    }

    out.push('\n');
    out.push_str(DIRECTION_HEADER);
    out.push('\n');
    out.push_str(user_direction);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{CastingMode, Settings};

    const SINGLE_KEYS: &[&str] = &[
        "Region",
        "City",
        "Target Date",
        "Season",
        "Age",
        "Gender",
        "Occupation",
        "Ethnicity",
        "Casting Mode",
        "Diversity Mode",
        "Aspect Ratio",
        "Fashion Color",
        "Fashion Color Name",
        "Project ID",
    ];

    fn keys(prompt: &str) -> Vec<String> {
        prompt
            .lines()
            .skip(2)
            .take_while(|l| !l.is_empty())
            .map(|l| l.split(": ").next().unwrap().to_string())
            .collect()
    }

    #[test]
    fn single_casting_has_fixed_lines() {
        let p = assemble(&Settings::default(), "warm light", "gemini-1.5-flash", false);
        let lines: Vec<&str> = p.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "Model: gemini-1.5-flash");
        assert_eq!(keys(&p), SINGLE_KEYS);
        assert!(!p.contains("Family Count"));
        assert!(!p.contains(TRANSLATION_HEADER));
        assert!(p.ends_with("### USER DIRECTION\nwarm light"));
    }

    #[test]
    fn multi_casting_adds_family_count_after_casting_mode() {
        let s = Settings { casting_mode: CastingMode::Multi, family_count: 5, ..Settings::default() };
        let p = assemble(&s, "", "m", false);
        let k = keys(&p);
        let pos = k.iter().position(|x| x == "Casting Mode").unwrap();
        assert_eq!(k[pos + 1], "Family Count");
        assert!(p.contains("Family Count: 5\n"));
        assert_eq!(k.len(), SINGLE_KEYS.len() + 1);
    }

    #[test]
    fn optional_fields_render_auto() {
        let s = Settings { occupation: "  ".into(), ..Settings::default() };
        let p = assemble(&s, "", "m", false);
        assert!(p.contains("Occupation: Auto\n"));
        assert!(p.contains("Ethnicity: Auto\n"));
        assert!(p.contains("Project ID: Auto\n"));
    }

    #[test]
    fn translation_section_precedes_direction() {
        let p = assemble(&Settings::default(), "카멜 코트", "m", true);
        let t = p.find(TRANSLATION_HEADER).unwrap();
        let d = p.find(DIRECTION_HEADER).unwrap();
        assert!(t < d);
        assert!(p.ends_with("카멜 코트"));
    }

    #[test]
    fn direction_passes_through_unmodified() {
        let direction = "  line one\n\n```json {\"x\": 1}```\ttrailing  ";
        let p = assemble(&Settings::default(), direction, "m", false);
        assert!(p.ends_with(direction));
    }

    #[test]
    fn stable_across_calls() {
        let s = Settings::default();
        assert_eq!(assemble(&s, "d", "m", true), assemble(&s, "d", "m", true));
    }

    #[test]
    fn system_prompt_mentions_fence() {
        assert!(system_prompt().contains("```json"));
    }

    #[test]
    fn system_prompt_names_section_headers() {
        let p = system_prompt();
        assert!(p.contains(HEADER));
        assert!(p.contains(DIRECTION_HEADER));
        assert!(p.contains("\"character.members\""));
    }
}
