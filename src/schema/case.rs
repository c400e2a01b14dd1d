// v2-samplesheet-maker: Conversion between Illumina v2 samplesheets, JSON and RunInfo.xml.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Normalization of external samplesheet tokens to internal field names.
//!
//! The samplesheet text format uses PascalCase keys and section names with
//! a handful of irregular tokens (`Sample_ID`, `TrimUMI`, `BCLConvert_Data`,
//! `Read1Cycles`). [pascal_case_to_snake_case] maps all of them onto the
//! snake_case names used in the JSON format and in the field schemas.

// Acronyms that would otherwise be split letter by letter.
const ACRONYMS: [(&str, &str); 6] = [
    ("UMI", "Umi"),
    ("ID", "Id"),
    ("BCLConvert", "Bclconvert"),
    ("TSO500L", "Tso500l"),
    ("TSO500S", "Tso500s"),
    ("TSO500", "Tso500"),
];

/// Convert an external token such as `Read1Cycles` into `read_1_cycles`.
///
/// Tokens without any uppercase characters are assumed to already be in
/// snake_case and are returned unchanged.
///
/// Numbered `read`/`index` words are separated from their number when they
/// are part of a longer name (`AdapterRead1` becomes `adapter_read_1`), but a
/// bare `index2` column keeps its name.
///
/// ## Usage
///
/// ```rust
/// use v2_samplesheet_maker::schema::case::pascal_case_to_snake_case;
///
/// assert_eq!(pascal_case_to_snake_case("Sample_ID"), "sample_id");
/// assert_eq!(pascal_case_to_snake_case("BarcodeMismatchesIndex1"), "barcode_mismatches_index_1");
/// assert_eq!(pascal_case_to_snake_case("Cloud_TSO500L_Settings"), "cloud_tso500l_settings");
/// ```
///
pub fn pascal_case_to_snake_case(token: &str) -> String {
    if !token.chars().any(|c| c.is_ascii_uppercase()) {
        return token.to_string()
    }

    let mut pascal: String = token.to_string();
    for (from, to) in ACRONYMS.iter() {
        pascal = pascal.replace(from, to);
    }
    pascal.retain(|c| c != '_');

    let mut snake: String = String::with_capacity(pascal.len() + 8);
    pascal.chars().enumerate().for_each(|(idx, c)| {
        if c.is_ascii_uppercase() && idx != 0 {
            snake.push('_');
        }
        snake.push(c.to_ascii_lowercase());
    });

    let words: Vec<&str> = snake.split('_').collect();
    if words.len() == 1 {
        return snake
    }

    words.iter().map(|word| split_numbered_word(word)).collect::<Vec<String>>().join("_")
}

fn split_numbered_word(word: &str) -> String {
    for stem in ["read", "index"] {
        if let Some(number) = word.strip_prefix(stem) {
            if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
                return format!("{}_{}", stem, number)
            }
        }
    }
    word.to_string()
}
