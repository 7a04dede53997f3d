//! Message payload composition

/// Build the raw message handed to the SMTP `DATA` command.
///
/// Header order and the single blank line before the body are fixed.
pub fn compose(sender: &str, recipients: &[String], subject: &str, body: &[u8]) -> Vec<u8> {
    let head = format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=\"UTF-8\"\r\n\r\n",
        sender,
        recipients.join(", "),
        subject,
    );

    let mut payload = Vec::with_capacity(head.len() + body.len());
    payload.extend_from_slice(head.as_bytes());
    payload.extend_from_slice(body);
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipients(addrs: &[&str]) -> Vec<String> {
        addrs.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_compose_exact_layout() {
        let payload = compose(
            "noreply@example.com",
            &recipients(&["alice@example.com", "bob@example.com"]),
            "Welcome",
            b"<p>Hello</p>",
        );

        assert_eq!(
            String::from_utf8(payload).unwrap(),
            "From: noreply@example.com\r\n\
             To: alice@example.com, bob@example.com\r\n\
             Subject: Welcome\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/html; charset=\"UTF-8\"\r\n\
             \r\n\
             <p>Hello</p>"
        );
    }

    #[test]
    fn test_compose_single_blank_line() {
        let payload = compose(
            "noreply@example.com",
            &recipients(&["alice@example.com"]),
            "Subject",
            b"<p>line one</p>\r\n<p>line two</p>",
        );
        let text = String::from_utf8(payload).unwrap();

        assert_eq!(text.matches("\r\n\r\n").count(), 1);
        let (headers, body) = text.split_once("\r\n\r\n").unwrap();
        assert_eq!(headers.lines().count(), 5);
        assert_eq!(body, "<p>line one</p>\r\n<p>line two</p>");
    }

    #[test]
    fn test_compose_is_deterministic() {
        let to = recipients(&["alice@example.com"]);
        let first = compose("a@example.com", &to, "Hi", b"body");
        let second = compose("a@example.com", &to, "Hi", b"body");
        assert_eq!(first, second);
    }

    #[test]
    fn test_compose_distinguishes_inputs() {
        let to = recipients(&["alice@example.com"]);
        let base = compose("a@example.com", &to, "Hi", b"body");

        assert_ne!(base, compose("a@example.com", &to, "Hello", b"body"));
        assert_ne!(base, compose("a@example.com", &to, "Hi", b"other"));
        assert_ne!(
            base,
            compose("a@example.com", &recipients(&["bob@example.com"]), "Hi", b"body")
        );
    }
}
