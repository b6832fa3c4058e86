use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogueError {
    #[error("speech input is not available on this platform")]
    CapabilityUnavailable,

    /// Another session already holds the speech devices.
    #[error("speech capabilities are held by another session")]
    CapabilityBusy,

    #[error("draft is missing a required field")]
    IncompleteDraft,

    #[error("speech playback failed: {0}")]
    PlaybackError(String),

    #[error("confirmation answer was neither yes nor no")]
    UnrecognizedConfirmation,

    #[error("invalid registration: {0}")]
    InvalidRegistration(#[from] RegistrationError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("required field `{0}` is empty")]
    MissingField(&'static str),

    #[error("mobile number must be exactly 10 digits")]
    InvalidMobile,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SmsError {
    #[error("message does not start with JOIN")]
    NotAJoinCommand,

    #[error("message has no name")]
    MissingName,

    #[error("message has no village")]
    MissingVillage,

    #[error("sender is not a valid mobile number")]
    InvalidSender,
}
