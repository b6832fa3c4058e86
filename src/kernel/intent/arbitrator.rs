use super::types::Confirmation;

const AFFIRMATIVE: &str = "yes";
const NEGATIVE: &str = "no";

pub struct ConfirmationArbitrator;

impl ConfirmationArbitrator {
    /// Case-insensitive substring match, "yes" checked before "no".
    ///
    /// Containment is literal: "no, yes I confirm" is affirmative and
    /// "know" reads as negative.
    pub fn classify(text: &str) -> Confirmation {
        let text_lower = text.to_lowercase();
        if text_lower.contains(AFFIRMATIVE) {
            Confirmation::Affirmative
        } else if text_lower.contains(NEGATIVE) {
            Confirmation::Negative
        } else {
            Confirmation::Unrecognized
        }
    }
}
