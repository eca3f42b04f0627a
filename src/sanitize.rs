/// Escapes the characters the dashboard interpolates into HTML.
///
/// Applied to user-entered text at save time, so every string that reaches a
/// rendered row or an activity entry is already inert.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
