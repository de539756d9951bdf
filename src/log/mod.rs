use crate::session::TurnOutcome;
use fs_err as fs;
use serde_json::to_string_pretty;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub reply: PathBuf,
    pub payload: Option<PathBuf>,
}

/// `RUST_LOG` wins; otherwise info, or debug with `--debug`.
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "art_director=debug" } else { "art_director=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn session_dir(root: &Path, session: Uuid) -> PathBuf {
    root.join(".art_director").join("sessions").join(session.to_string())
}

pub fn save_turn(root: &Path, session: Uuid, outcome: &TurnOutcome) -> anyhow::Result<SavedPaths> {
    let dir = session_dir(root, session);
    fs::create_dir_all(&dir)?;

    let stem = format!("turn{:02}", outcome.index);
    let prompt = dir.join(format!("{stem}.prompt.txt"));
    fs::write(&prompt, &outcome.prompt)?;
    let reply = dir.join(format!("{stem}.reply.txt"));
    fs::write(&reply, &outcome.reply)?;

    let mut payload = None;
    if let Some(v) = &outcome.extraction.payload {
        let p = dir.join(format!("{stem}.payload.json"));
        fs::write(&p, to_string_pretty(v)?)?;
        payload = Some(p);
    }

    Ok(SavedPaths { dir, prompt, reply, payload })
}

pub fn print_saved_paths(saved: &SavedPaths) {
    println!("artifacts: {}", saved.dir.display());
    println!("  prompt:  {}", saved.prompt.display());
    println!("  reply:   {}", saved.reply.display());
    match &saved.payload {
        Some(p) => println!("  payload: {}", p.display()),
        None => println!("  payload: (none extracted)"),
    }
    std::io::stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn saves_prompt_reply_and_payload() {
        let root = tempfile::tempdir().unwrap();
        let session = Uuid::new_v4();
        let reply = "Ana\n```json\n{\"a\": 1}\n```".to_string();
        let outcome = TurnOutcome { index: 3, prompt: "P".into(), extraction: extract(&reply), reply };

        let saved = save_turn(root.path(), session, &outcome).unwrap();
        assert_eq!(saved.dir, session_dir(root.path(), session));
        assert!(saved.prompt.ends_with("turn03.prompt.txt"));
        assert_eq!(std::fs::read_to_string(&saved.prompt).unwrap(), "P");
        let payload = saved.payload.unwrap();
        let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(payload).unwrap()).unwrap();
        assert_eq!(v["a"], 1);
    }

    #[test]
    fn no_payload_file_without_extraction() {
        let root = tempfile::tempdir().unwrap();
        let reply = "just prose".to_string();
        let outcome = TurnOutcome { index: 1, prompt: "P".into(), extraction: extract(&reply), reply };
        let saved = save_turn(root.path(), Uuid::new_v4(), &outcome).unwrap();
        assert!(saved.payload.is_none());
        assert!(saved.reply.exists());
    }
}
