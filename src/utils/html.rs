use ammonia;

/// Clean HTML content using the ammonia library.
///
/// This employs a whitelist-based sanitization strategy: it preserves safe tags
/// (like <b>, <p>) while stripping dangerous tags (like <script>, <iframe>)
/// and malicious attributes (like onclick).
///
/// Applied to stored free text (question text, answer text) that other
/// clients will render back.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
