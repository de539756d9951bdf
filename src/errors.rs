use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("configuration error: {0}")] Config(String),
    #[error("model call failed: {0}")] Transport(String),
    #[error("invalid setting: {0}")] Setting(String),
    #[error("handoff error: {0}")] Handoff(String),
}
