use super::registration::{is_valid_mobile, Registration};
use crate::error::SmsError;

const KEYWORD: &str = "JOIN";

/// Parses `JOIN <name...> <village>` sent from `sender`.
///
/// The last word is the village, everything between the keyword and the
/// village is the name. The sender may carry a `+91` or `0` prefix.
pub fn parse_join_sms(sender: &str, body: &str) -> Result<Registration, SmsError> {
    let mut words = body.split_whitespace();
    match words.next() {
        Some(keyword) if keyword.eq_ignore_ascii_case(KEYWORD) => {}
        _ => return Err(SmsError::NotAJoinCommand),
    }

    let rest: Vec<&str> = words.collect();
    let (village, name) = match rest.split_last() {
        None => return Err(SmsError::MissingName),
        Some((_, [])) => return Err(SmsError::MissingVillage),
        Some((village, name)) => (*village, name.join(" ")),
    };

    let mobile = normalize_sender(sender).ok_or(SmsError::InvalidSender)?;
    Ok(Registration::new(&name, village, &mobile, ""))
}

fn normalize_sender(sender: &str) -> Option<String> {
    let digits: String = sender
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let digits = digits
        .strip_prefix("+91")
        .or_else(|| if digits.len() == 11 { digits.strip_prefix('0') } else { None })
        .unwrap_or(&digits);
    is_valid_mobile(digits).then(|| digits.to_string())
}
