/// Splits an identifier into `(prefix, payload)` at the **rightmost**
/// occurrence of `delimiter`, so prefixes may themselves contain the
/// delimiter (`"user_sub_1234"` splits into `"user_sub"` and `"1234"`).
///
/// When the delimiter does not occur, the prefix is empty and the payload
/// is the entire input. Callers are therefore free to pass bare payloads.
pub fn split_id<'a>(id: &'a str, delimiter: &str) -> (&'a str, &'a str) {
    match id.rfind(delimiter) {
        Some(pos) => (&id[..pos], &id[pos + delimiter.len()..]),
        None => ("", id),
    }
}
