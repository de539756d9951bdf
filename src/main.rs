use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};

mod cli;
mod config;
mod errors;
mod extract;
mod handoff;
mod identity;
mod log;
mod prompt;
mod provider;
mod session;
mod settings;
mod ux;
mod wire;

use handoff::Brief;
use identity::ProjectIdGenerator;
use provider::DynClient;
use session::Session;
use settings::{SettingEdit, SettingsStore};

/// Per-run wiring shared by every turn.
struct Driver {
    client: DynClient,
    ids: ProjectIdGenerator,
    /// Concept seed for derived ids; may be empty.
    id_seed: String,
    /// True while the project id is derived. A user-given id pins it.
    derive_id: bool,
    out_dir: PathBuf,
    save_artifacts: bool,
    progress: bool,
    interactive: bool,
    translate: bool,
}

impl Driver {
    /// Re-derive the project id from the current region/city and today's UTC date.
    fn refresh_project_id(&self, session: &mut Session) {
        if self.derive_id {
            let s = session.settings.current();
            let id = self.ids.generate(s.region.as_str(), &s.city, &self.id_seed, Utc::now().date_naive());
            if session.settings.apply(SettingEdit::ProjectId(id)) {
                tracing::info!(project_id = %session.settings.current().project_id, "project id updated");
            }
        }
    }

    /// Returns false when the model call failed; the session is then unchanged.
    async fn turn(&self, session: &mut Session, direction: &str) -> bool {
        self.refresh_project_id(session);

        let pb = ux::spinner(self.progress, &format!("waiting for {}", self.client.model()));
        let result = session.turn(self.client.as_ref(), direction, self.translate).await;
        pb.finish_and_clear();

        let outcome = match result {
            Ok(o) => o,
            Err(e) => {
                ux::print_error(&e.to_string());
                ux::print_warning("nothing was recorded for this turn; you can retry the same input");
                return false;
            }
        };
        ux::show_reply(&outcome);

        if self.save_artifacts {
            match log::save_turn(&self.out_dir, session.id, &outcome) {
                Ok(saved) => log::print_saved_paths(&saved),
                Err(e) => ux::print_warning(&format!("could not save artifacts: {e:#}")),
            }
        }

        if let Some(payload) = &outcome.extraction.payload {
            let built = handoff::build(
                session.settings.current(),
                &session.scene_overrides(),
                &session.brief,
                payload,
                Utc::now(),
            );
            match built {
                Ok(doc) => {
                    ux::show_document(&doc);
                    self.write_document(&doc);
                }
                Err(e) => ux::print_error(&e.to_string()),
            }
        }
        true
    }

    /// An explicit id stops derivation; clearing it resumes derivation when a seed exists.
    fn pin_project_id(&mut self, id: &str) {
        self.derive_id = id.is_empty() && !self.id_seed.is_empty();
        if !self.derive_id && id.is_empty() {
            ux::print_warning("project id is empty; no hand-off document will be written");
        }
    }

    fn write_document(&self, doc: &handoff::HandoffDocument) {
        let target = self.out_dir.join(handoff::file_name(doc));
        if self.interactive && target.exists() && !ux::confirm(&format!("Overwrite {}?", target.display())) {
            println!("kept existing {}", target.display());
            return;
        }
        match handoff::write(doc, &self.out_dir) {
            Ok(p) => println!("saved {}", p.display()),
            Err(e) => ux::print_error(&format!("could not write hand-off document: {e:#}")),
        }
    }
}

fn handle_command(driver: &mut Driver, session: &mut Session, line: &str) -> bool {
    let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
    match cmd {
        "/quit" | "/exit" => return false,
        "/help" => ux::print_help(),
        "/show" => {
            ux::show_settings(session.settings.current(), &[]);
            ux::show_overrides(&session.scene_overrides());
        }
        "/translate" => {
            driver.translate = !driver.translate;
            println!("translation {}", if driver.translate { "on" } else { "off" });
        }
        "/set" => {
            let Some((key, value)) = rest.split_once('=') else {
                ux::print_error("usage: /set key=value");
                return true;
            };
            match SettingEdit::parse(key, value) {
                Ok(edit) => {
                    if let SettingEdit::ProjectId(id) = &edit {
                        driver.pin_project_id(id);
                    }
                    if session.settings.apply(edit) {
                        ux::show_settings(session.settings.current(), &session.settings.highlighted());
                        ux::show_overrides(&session.scene_overrides());
                    } else {
                        println!("(no change)");
                    }
                }
                Err(e) => ux::print_error(&e.to_string()),
            }
        }
        other => {
            ux::print_error(&format!("unknown command {other}"));
            ux::print_help();
        }
    }
    true
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.debug);

    let mut cfg = match &args.config {
        Some(p) => config::Config::load(Path::new(p))?,
        None => config::Config::default(),
    };
    if let Some(p) = args.provider {
        cfg.provider = p;
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }

    let requested = args.settings();
    let store = SettingsStore::new(requested.clone());
    if store.current().city != requested.city {
        ux::print_warning(&format!(
            "'{}' is not offered for {}; using {}",
            requested.city,
            requested.region,
            store.current().city
        ));
    }

    let brief = Brief {
        concept: args.concept.clone(),
        concept_summary: args.concept_summary.clone(),
        biometric_ids: args.biometric_ids(),
    };

    let id_seed = identity::seed_from_concept(&brief.concept, &brief.concept_summary);
    let derive_id = store.current().project_id.trim().is_empty();
    if derive_id && id_seed.is_empty() {
        ux::print_error("provide --concept or --concept-summary, or an explicit --project-id");
        std::process::exit(2);
    }

    // Credentials are checked here, before any request is attempted.
    let client = match provider::make_client(&cfg) {
        Ok(c) => c,
        Err(e) => {
            ux::print_error(&e.to_string());
            std::process::exit(2);
        }
    };

    let mut session = Session::new(cfg.system_instruction(), store, brief, cfg.generation.clone());
    session.auto_overrides = args.auto_overrides;
    session.overrides_patch = args.overrides_patch();

    let mut driver = Driver {
        client,
        ids: ProjectIdGenerator::new(cfg.namespace.clone()),
        id_seed,
        derive_id,
        out_dir: PathBuf::from(args.out.clone().unwrap_or_else(|| cfg.out_dir.clone())),
        save_artifacts: args.save_artifacts,
        progress: args.progress,
        interactive: args.interactive,
        translate: args.translate,
    };
    driver.refresh_project_id(&mut session);
    tracing::debug!(session = %session.id, provider = ?cfg.provider, model = %cfg.model, "session started");

    ux::show_settings(session.settings.current(), &[]);
    ux::show_overrides(&session.scene_overrides());

    if !args.interactive {
        let direction = args.direction.clone().unwrap_or_default();
        if !driver.turn(&mut session, &direction).await {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(direction) = &args.direction {
        driver.turn(&mut session, direction).await;
    }
    ux::print_help();
    while let Some(line) = ux::read_line("direction> ") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('/') {
            if !handle_command(&mut driver, &mut session, line) {
                break;
            }
            continue;
        }
        driver.turn(&mut session, line).await;
    }
    tracing::info!(
        session = %session.id,
        turns = session.turns(),
        messages = session.conversation().messages.len(),
        "session closed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::provider::ModelClient;
    use crate::settings::Settings;
    use crate::wire::{Conversation, GenerationConfig};

    struct Echo;

    #[async_trait]
    impl ModelClient for Echo {
        async fn send(&self, _c: &Conversation, _g: &GenerationConfig) -> anyhow::Result<String> {
            Ok("ok".into())
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn setup(project_id: &str) -> (Driver, Session) {
        let brief = Brief { concept: "camel coat".into(), ..Brief::default() };
        let id_seed = identity::seed_from_concept(&brief.concept, &brief.concept_summary);
        let store = SettingsStore::new(Settings { project_id: project_id.into(), ..Settings::default() });
        let driver = Driver {
            client: Box::new(Echo),
            ids: ProjectIdGenerator::default(),
            id_seed,
            derive_id: project_id.is_empty(),
            out_dir: PathBuf::from("."),
            save_artifacts: false,
            progress: false,
            interactive: true,
            translate: false,
        };
        let session = Session::new("system", store, brief, GenerationConfig::default());
        (driver, session)
    }

    #[test]
    fn derived_id_is_filled_in() {
        let (driver, mut session) = setup("");
        driver.refresh_project_id(&mut session);
        assert!(session.settings.current().project_id.starts_with(identity::DEFAULT_NAMESPACE));
    }

    #[test]
    fn edited_project_id_survives_refresh() {
        let (mut driver, mut session) = setup("");
        driver.refresh_project_id(&mut session);
        assert!(handle_command(&mut driver, &mut session, "/set project_id=MY_CAMPAIGN_ID"));
        driver.refresh_project_id(&mut session);
        assert_eq!(session.settings.current().project_id, "MY_CAMPAIGN_ID");
    }

    #[test]
    fn clearing_project_id_resumes_derivation() {
        let (mut driver, mut session) = setup("MY_CAMPAIGN_ID");
        driver.refresh_project_id(&mut session);
        assert_eq!(session.settings.current().project_id, "MY_CAMPAIGN_ID");
        handle_command(&mut driver, &mut session, "/set project_id=");
        driver.refresh_project_id(&mut session);
        assert!(session.settings.current().project_id.starts_with(identity::DEFAULT_NAMESPACE));
    }

    #[test]
    fn quit_ends_the_loop() {
        let (mut driver, mut session) = setup("");
        assert!(!handle_command(&mut driver, &mut session, "/quit"));
        assert!(handle_command(&mut driver, &mut session, "/translate"));
        assert!(driver.translate);
    }
}
