use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::handoff::HandoffDocument;
use crate::session::TurnOutcome;
use crate::settings::overrides::SceneOverrides;
use crate::settings::Settings;

pub fn show_settings(settings: &Settings, highlighted: &[&str]) {
    println!("\n=== SETTINGS ===");
    println!("{}", settings.region.label().dimmed());
    for (key, value) in settings.fields() {
        if highlighted.contains(&key) {
            println!("  {} {}  {}", format!("{key:<20}").bold(), value.yellow().bold(), "(changed)".yellow());
        } else {
            println!("  {} {}", format!("{key:<20}").bold(), value);
        }
    }
    println!();
}

pub fn show_overrides(o: &SceneOverrides) {
    let rooms = o.room_types.iter().map(|r| format!("{:?}", r)).collect::<Vec<_>>().join(", ");
    println!(
        "{} {:?} / {:?} / [{}] / entropy {} / {:?}",
        "Scene:".cyan().bold(),
        o.housing_type,
        o.interior_style,
        rooms,
        o.entropy_level,
        o.output_preset
    );
}

pub fn show_reply(outcome: &TurnOutcome) {
    println!("\n=== REPLY #{} ===", outcome.index);
    if !outcome.extraction.display_text.is_empty() {
        println!("{}", outcome.extraction.display_text);
    }
    match &outcome.extraction.payload {
        Some(v) => {
            println!("\n{}", "[JSON]".green().bold());
            println!("{}", serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()));
        }
        None => println!("\n{}", "(no JSON block found in reply)".yellow()),
    }
    println!();
}

pub fn show_document(doc: &HandoffDocument) {
    println!("{} {}", "[STEP1]".green().bold(), doc.project_id.bold());
    match serde_json::to_string_pretty(doc) {
        Ok(s) => println!("{}", s),
        Err(e) => print_error(&e.to_string()),
    }
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "error:".red().bold(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /set key=value   edit one setting (e.g. /set region=latam, /set casting_mode=multi)");
    println!("  /show            print current settings and scene overrides");
    println!("  /translate       toggle the translation section");
    println!("  /help            this text");
    println!("  /quit            leave");
    println!("Anything else is sent to the model as direction.");
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// One line from stdin without the newline; `None` at end of input.
pub fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt.bold());
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim_end_matches(['\r', '\n']).to_string()),
    }
}

pub fn spinner(enabled: bool, msg: &str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
