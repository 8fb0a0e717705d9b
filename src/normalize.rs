//! File name normalization.
//!
//! Stems are transliterated character by character: Ukrainian Cyrillic letters
//! become Latin sequences, other alphanumerics pass through, and everything
//! else becomes [`PLACEHOLDER`]. Extensions are never touched.

use crate::file_category::Category;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use std::sync::LazyLock;

/// Replacement for any character that is neither mapped nor alphanumeric.
pub const PLACEHOLDER: char = '_';

#[rustfmt::skip]
const TRANSLITERATION_TABLE: &[(char, &str)] = &[
    ('а', "a"), ('б', "b"), ('в', "v"), ('г', "h"), ('ґ', "g"),
    ('д', "d"), ('е', "e"), ('є', "ie"), ('ж', "zh"), ('з', "z"),
    ('и', "y"), ('і', "i"), ('ї', "i"), ('й', "i"), ('к', "k"),
    ('л', "l"), ('м', "m"), ('н', "n"), ('о', "o"), ('п', "p"),
    ('р', "r"), ('с', "s"), ('т', "t"), ('у', "u"), ('ф', "f"),
    ('х', "kh"), ('ц', "ts"), ('ч', "ch"), ('ш', "sh"), ('щ', "shch"),
    ('ь', ""), ('ю', "iu"), ('я', "ia"),
    ('А', "A"), ('Б', "B"), ('В', "V"), ('Г', "H"), ('Ґ', "G"),
    ('Д', "D"), ('Е', "E"), ('Є', "IE"), ('Ж', "ZH"), ('З', "Z"),
    ('И', "Y"), ('І', "I"), ('Ї', "I"), ('Й', "I"), ('К', "K"),
    ('Л', "L"), ('М', "M"), ('Н', "N"), ('О', "O"), ('П', "P"),
    ('Р', "R"), ('С', "S"), ('Т', "T"), ('У', "U"), ('Ф', "F"),
    ('Х', "KH"), ('Ц', "TS"), ('Ч', "CH"), ('Ш', "SH"), ('Щ', "SHCH"),
    ('Ь', ""), ('Ю', "IU"), ('Я', "IA"),
];

static TRANSLITERATION: LazyLock<HashMap<char, &'static str>> =
    LazyLock::new(|| TRANSLITERATION_TABLE.iter().copied().collect());

fn push_normalized(out: &mut String, c: char) {
    if let Some(latin) = TRANSLITERATION.get(&c) {
        out.push_str(latin);
    } else if c.is_alphanumeric() {
        out.push(c);
    } else {
        out.push(PLACEHOLDER);
    }
}

/// Normalizes a file stem.
///
/// # Examples
///
/// ```
/// use clean_folder::normalize::normalize;
///
/// assert_eq!(normalize("Привіт"), "Pryvit");
/// assert_eq!(normalize("my report (1)"), "my_report__1_");
/// ```
pub fn normalize(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        push_normalized(&mut out, c);
    }
    out
}

/// Computes the name a file should have inside its category folder.
///
/// Only the stem is normalized and the extension is kept verbatim. Files
/// without an extension, and archives, keep their original name so that
/// extraction can rely on the stem.
pub fn target_file_name(file_name: &Path, category: Category) -> OsString {
    let original = file_name.as_os_str().to_os_string();
    if category == Category::Archives {
        return original;
    }

    match (file_name.file_stem(), file_name.extension()) {
        (Some(stem), Some(ext)) => {
            let mut name = OsString::from(normalize(&stem.to_string_lossy()));
            name.push(".");
            name.push(ext);
            name
        }
        _ => original,
    }
}
