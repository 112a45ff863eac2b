use sha2::{Digest, Sha256};
use ticketcoach_schema::TicketPayload;

const UNKNOWN_ROLE: &str = "unknown";

/// Flatten a helpdesk ticket into the plain-text transcript the evaluator reads.
///
/// Blocks are `Subject: ...` (only when the subject is non-blank) followed by
/// one `Role: body` line per comment with a non-blank body, separated by a
/// blank line. Never fails; an empty ticket yields an empty string.
pub fn normalize_ticket(payload: &TicketPayload) -> String {
    let mut parts = Vec::with_capacity(payload.comments.len() + 1);

    if let Some(subject) = payload.subject.as_deref().map(str::trim) {
        if !subject.is_empty() {
            parts.push(format!("Subject: {subject}"));
        }
    }

    for comment in &payload.comments {
        let body = comment.body.trim();
        if body.is_empty() {
            continue;
        }
        let role = match comment.author_role.trim() {
            "" => UNKNOWN_ROLE,
            role => role,
        };
        parts.push(format!("{}: {body}", role_label(role)));
    }

    parts.join("\n\n")
}

/// `"customer"` -> `"Customer"`, `"TIER_2"` -> `"Tier_2"`.
fn role_label(role: &str) -> String {
    let mut chars = role.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Content identity of a transcript, used to deduplicate coaching history.
pub fn transcript_hash(transcript: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(transcript.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketcoach_schema::TicketComment;

    fn payload(subject: Option<&str>, comments: &[(&str, &str)]) -> TicketPayload {
        TicketPayload {
            id: None,
            subject: subject.map(str::to_string),
            comments: comments
                .iter()
                .map(|(role, body)| TicketComment::new(*role, *body))
                .collect(),
        }
    }

    #[test]
    fn empty_ticket_yields_empty_string() {
        assert_eq!(normalize_ticket(&payload(None, &[])), "");
        assert_eq!(normalize_ticket(&payload(Some(""), &[])), "");
    }

    #[test]
    fn blank_subject_is_skipped() {
        let text = normalize_ticket(&payload(Some("   "), &[("customer", "hello")]));
        assert_eq!(text, "Customer: hello");
    }

    #[test]
    fn subject_only() {
        let text = normalize_ticket(&payload(Some("Refund please"), &[]));
        assert_eq!(text, "Subject: Refund please");
    }

    #[test]
    fn whitespace_only_body_is_skipped() {
        let text = normalize_ticket(&payload(None, &[("agent", " \n\t ")]));
        assert_eq!(text, "");
        assert!(!text.contains("Agent:"));
    }

    #[test]
    fn comments_are_joined_with_blank_lines() {
        let text = normalize_ticket(&payload(
            Some("Double charge"),
            &[
                ("customer", "  I was charged twice.  "),
                ("agent", "Send a screenshot?"),
                ("customer", ""),
            ],
        ));
        assert_eq!(
            text,
            "Subject: Double charge\n\nCustomer: I was charged twice.\n\nAgent: Send a screenshot?"
        );
    }

    #[test]
    fn blank_role_falls_back_to_unknown() {
        let text = normalize_ticket(&payload(None, &[("   ", "who am i")]));
        assert_eq!(text, "Unknown: who am i");
    }

    #[test]
    fn role_label_capitalises_first_letter_only() {
        assert_eq!(role_label("customer"), "Customer");
        assert_eq!(role_label("AGENT"), "Agent");
        assert_eq!(role_label("tier_2"), "Tier_2");
        assert_eq!(role_label(""), "");
    }

    #[test]
    fn transcript_hash_is_stable_hex() {
        let a = transcript_hash("Customer: hi");
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, transcript_hash("Customer: hi"));
        assert_ne!(a, transcript_hash("Customer: hi "));
        assert_eq!(
            transcript_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
