//! Unicode normalization and the character, letter and token views that the
//! similarity metrics operate on.

use clap::ValueEnum;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalizationForm {
    /// Canonical decomposition followed by canonical composition
    #[default]
    Nfc,
    /// Canonical decomposition
    Nfd,
    /// Compatibility decomposition followed by canonical composition
    Nfkc,
    /// Compatibility decomposition
    Nfkd,
}

impl NormalizationForm {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nfc => "NFC",
            Self::Nfd => "NFD",
            Self::Nfkc => "NFKC",
            Self::Nfkd => "NFKD",
        }
    }
}

/// Dashes U+2012..U+2017, quotation marks U+2018..U+201F and the double
/// oblique hyphen used as line-break marker in Fraktur prints.
const EXTRA_PUNCTUATION: &[char] = &[
    '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2016}', '\u{2017}', '\u{2018}', '\u{2019}',
    '\u{201a}', '\u{201b}', '\u{201c}', '\u{201d}', '\u{201e}', '\u{201f}', '\u{2e17}',
];

pub fn normalize(text: &str, form: NormalizationForm) -> String {
    match form {
        NormalizationForm::Nfc => text.nfc().collect(),
        NormalizationForm::Nfd => text.nfd().collect(),
        NormalizationForm::Nfkc => text.nfkc().collect(),
        NormalizationForm::Nfkd => text.nfkd().collect(),
    }
}

pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || EXTRA_PUNCTUATION.contains(&c)
}

/// ASCII digits plus Arabic-Indic (U+0660..U+0669) and extended
/// Arabic-Indic/Persian (U+06F0..U+06F9) digits.
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{0660}'..='\u{0669}').contains(&c) || ('\u{06f0}'..='\u{06f9}').contains(&c)
}

pub fn to_character_sequence(text: &str) -> Vec<char> {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn to_letter_sequence(text: &str) -> Vec<char> {
    text.chars()
        .filter(|&c| !c.is_whitespace() && !is_punctuation(c) && !is_digit(c))
        .collect()
}

pub fn to_token_sequence(text: &str) -> Vec<String> {
    text.split_whitespace().map(ToOwned::to_owned).collect()
}
