/// Corrupted sequence → intended character, applied in this order.
///
/// Reproduced as observed in model output, including targets that look wrong
/// (`√º` → `ú`, `√â` → `à`). Do not reorder: earlier entries win.
pub const MOJIBAKE_REPLACEMENTS: &[(&str, &str)] = &[
    ("√±", "ñ"),
    ("√©", "é"),
    ("√°", "á"),
    ("√≠", "í"),
    ("√≥", "ó"),
    ("√∫", "ú"),
    ("√º", "ú"),
    ("√ü", "ü"),
    ("√Ñ", "Ñ"),
    ("√â", "à"),
    ("√Æ", "Á"),
    ("√ã", "ã"),
    ("√¢", "â"),
    ("√ª", "ê"),
    ("√∞", "í"),
    ("√®", "É"),
];

fn replace_once(text: &str) -> String {
    MOJIBAKE_REPLACEMENTS
        .iter()
        .fold(text.to_owned(), |acc, (bad, good)| acc.replace(bad, good))
}

/// Repair mis-decoded accented characters in `text`.
///
/// The ordered table is applied until the text no longer changes. Some targets
/// (`ü`, `Ñ`, `ã`, `â`) are also the tail of a key, so a stacked sequence like
/// `√√¢` needs a second pass. Every replacement shortens the text, so this ends.
///
/// Idempotence wins over "one corrupted sequence changes nothing else": in
/// `√√¢` the repaired `â` completes a second key with the leading `√`, and the
/// result is `à`, not the single-pass `√â`.
#[must_use]
pub fn fix_mojibake(text: &str) -> String {
    let mut current = replace_once(text);
    loop {
        let next = replace_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}
