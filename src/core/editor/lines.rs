//! Line-oriented editing of key/value documents (properties files).
//!
//! Edits are expressed as "copy every line except/plus the target line":
//! lines are split inclusive of their terminators, so untouched lines,
//! blank lines, and comments reassemble byte for byte.

/// True when any line of the document defines `key`.
pub fn defines_key(content: &str, key: &str) -> bool {
    content.lines().any(|line| line_defines_key(line, key))
}

/// Remove the line defining `key`. Returns the new content, or `None`
/// when the key is not defined (callers report a no-op).
pub fn remove_key(content: &str, key: &str) -> Option<String> {
    if !defines_key(content, key) {
        return None;
    }
    let mut output = String::with_capacity(content.len());
    for line in content.split_inclusive('\n') {
        if !line_defines_key(line, key) {
            output.push_str(line);
        }
    }
    Some(output)
}

/// Append a `key=value` definition as a new final line, reusing the
/// document's trailing-newline convention.
pub fn append_key(content: &str, key: &str, value: &str) -> String {
    let mut output = String::with_capacity(content.len() + key.len() + value.len() + 2);
    output.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(key);
    output.push('=');
    output.push_str(value);
    output.push('\n');
    output
}

/// True when this line defines `key` (`key=value` or `key: value`).
/// Comment lines never define a key.
fn line_defines_key(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') || trimmed.starts_with('!') {
        return false;
    }
    let Some(after) = trimmed.strip_prefix(key) else {
        return false;
    };
    let after = after.trim_start_matches([' ', '\t']);
    after.starts_with('=') || after.starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPS: &str = "foo=foov\nbar=barv\nfoofoo=foofoov\n";

    #[test]
    fn test_remove_middle_key_preserves_order() {
        let result = remove_key(PROPS, "bar").unwrap();
        assert_eq!(result, "foo=foov\nfoofoo=foofoov\n");
    }

    #[test]
    fn test_remove_missing_key_is_none() {
        assert!(remove_key(PROPS, "baz").is_none());
    }

    #[test]
    fn test_key_prefix_does_not_match() {
        // "foo" must not match the "foofoo" line.
        let result = remove_key(PROPS, "foo").unwrap();
        assert_eq!(result, "bar=barv\nfoofoo=foofoov\n");
    }

    #[test]
    fn test_comments_and_blanks_survive_verbatim() {
        let content = "# config\r\n\r\nfoo=1\r\nbar=2\r\n";
        let result = remove_key(content, "bar").unwrap();
        assert_eq!(result, "# config\r\n\r\nfoo=1\r\n");
    }

    #[test]
    fn test_commented_key_is_not_a_definition() {
        assert!(remove_key("#bar=old\nfoo=1\n", "bar").is_none());
    }

    #[test]
    fn test_colon_separator() {
        let result = remove_key("a: 1\nb: 2\n", "a").unwrap();
        assert_eq!(result, "b: 2\n");
    }

    #[test]
    fn test_append_key() {
        assert_eq!(append_key("foo=1\n", "bar", "2"), "foo=1\nbar=2\n");
        assert_eq!(append_key("foo=1", "bar", "2"), "foo=1\nbar=2\n");
        assert_eq!(append_key("", "bar", "2"), "bar=2\n");
    }
}
