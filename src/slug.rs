/// Slugifies free text into a data key: lowercased, with every run of
/// non-alphanumeric characters collapsed to a single `_`, and no leading or
/// trailing separator. `"Orders Table"` becomes `"orders_table"`.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_sep = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
