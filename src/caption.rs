//! Best-effort extraction of animal details from hand-written photo captions.
//!
//! Three caption shapes are recognised, tried in order, and the first one that applies decides
//! every field:
//! - **labeled**: `Imię: Reksio\nRasa: Labrador\nWiek: 5`, with Polish or English labels
//! - **delimited**: `Luna - Owczarek, 2 lata, samica` or `Luna | Owczarek | samica`
//! - **plain**: first line is the name, any further lines are the description
//!
//! Parsing never fails. Anything that cannot be read is left unset.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::api_types::{AdoptionStatus, Gender};

/// The subset of an [AnimalRecord](crate::api_types::AnimalRecord) a caption managed to describe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptionFields {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight: Option<f64>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub status: Option<AdoptionStatus>,
}

impl CaptionFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Breed,
    Age,
    Gender,
    Weight,
    Color,
    Status,
}

/// One `<label>: <value>` rule of the labeled caption format.
pub struct LabelRule {
    pub field: Field,
    /// Label synonyms, as a regex alternation.
    pub labels: &'static str,
    /// Pattern for the value; its first group is what gets extracted.
    pub value: &'static str,
}

/// Label rules in precedence order.
pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        field: Field::Name,
        labels: r"imi[eę]|name",
        value: r"(.+)",
    },
    LabelRule {
        field: Field::Breed,
        labels: r"rasa|breed",
        value: r"(.+)",
    },
    LabelRule {
        field: Field::Age,
        labels: r"wiek|age",
        value: r"(\d+)",
    },
    LabelRule {
        field: Field::Gender,
        labels: r"p[lł]e[cć]|gender",
        value: r"(.+)",
    },
    LabelRule {
        field: Field::Weight,
        labels: r"waga|weight",
        value: r"(\d+(?:[.,]\d+)?)",
    },
    LabelRule {
        field: Field::Color,
        labels: r"kolor|color|umaszczenie",
        value: r"(.+)",
    },
    LabelRule {
        field: Field::Status,
        labels: r"status",
        value: r"(.+)",
    },
];

static LABEL_PATTERNS: Lazy<Vec<(Field, Regex)>> = Lazy::new(|| {
    LABEL_RULES
        .iter()
        .map(|rule| {
            let pattern = format!(r"(?i)\b(?:{})[ \t]*:[ \t]*{}", rule.labels, rule.value);
            (rule.field, Regex::new(&pattern).unwrap())
        })
        .collect()
});

static ANY_LABEL: Lazy<Regex> = Lazy::new(|| {
    let labels = LABEL_RULES
        .iter()
        .map(|rule| rule.labels)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{})[ \t]*:", labels)).unwrap()
});

static DELIMITED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^|\-\n]+)[|\-](.+)").unwrap());

static AGE_WITH_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:lata|lat|rok|year|r\.)").unwrap());

static AGE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+\s*(?:lata|lat|rok|year|r\.)").unwrap());

// Leading word boundaries keep "female" from reading as "male".
static MALE_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:samiec|pies|male)").unwrap());

static FEMALE_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:samica|suczka|suka|female)").unwrap());

static GENDER_KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:samiec|samica|suczka|suka|pies|female|male)").unwrap());

/// Parse a single caption. Empty or whitespace-only captions give empty fields.
pub fn parse(caption: &str) -> CaptionFields {
    let text = caption.trim();
    if text.is_empty() {
        return CaptionFields::default();
    }

    if let Some(fields) = parse_labeled(text) {
        return fields;
    }

    if let Some(fields) = parse_delimited(text) {
        return fields;
    }

    parse_plain(text)
}

fn label_value<'t>(field: Field, text: &'t str) -> Option<&'t str> {
    LABEL_PATTERNS
        .iter()
        .find(|(candidate, _)| *candidate == field)
        .and_then(|(_, pattern)| pattern.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str().trim())
}

fn parse_labeled(text: &str) -> Option<CaptionFields> {
    let name = label_value(Field::Name, text);
    let breed = label_value(Field::Breed, text);
    let age = label_value(Field::Age, text);

    if name.is_none() && breed.is_none() && age.is_none() {
        return None;
    }

    let description = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !ANY_LABEL.is_match(line))
        .collect::<Vec<_>>()
        .join(" ");

    Some(CaptionFields {
        name: Some(name.unwrap_or_default().to_owned()),
        breed: Some(breed.unwrap_or_default().to_owned()),
        age: age.and_then(|age| age.parse().ok()),
        gender: label_value(Field::Gender, text).map(labeled_gender),
        weight: label_value(Field::Weight, text)
            .and_then(|weight| weight.replace(',', ".").parse::<f64>().ok())
            .filter(|weight| *weight > 0.0),
        color: Some(label_value(Field::Color, text).unwrap_or_default().to_owned()),
        description: Some(description),
        status: label_value(Field::Status, text).map(labeled_status),
    })
}

/// Labeled gender values are free text. Anything not recognisably male is read as female.
fn labeled_gender(raw: &str) -> Gender {
    let value = raw.to_lowercase();
    if value.contains("samiec") || value == "male" || value.contains("pies") {
        Gender::Male
    } else {
        Gender::Female
    }
}

fn labeled_status(raw: &str) -> AdoptionStatus {
    let value = raw.to_lowercase();
    if value.contains("adopt") {
        AdoptionStatus::Adopted
    } else if value.contains("trak") || value.contains("pend") {
        AdoptionStatus::Pending
    } else {
        AdoptionStatus::Available
    }
}

/// A male keyword anywhere wins over any female keyword.
fn keyword_gender(text: &str) -> Option<Gender> {
    if MALE_KEYWORD.is_match(text) {
        Some(Gender::Male)
    } else if FEMALE_KEYWORD.is_match(text) {
        Some(Gender::Female)
    } else {
        None
    }
}

fn parse_delimited(text: &str) -> Option<CaptionFields> {
    let captures = DELIMITED.captures(text)?;
    let name = captures.get(1)?.as_str().trim();
    let rest = captures.get(2)?.as_str();

    let age = AGE_WITH_UNIT
        .captures(rest)
        .and_then(|captures| captures.get(1))
        .and_then(|age| age.as_str().parse().ok());

    let gender = keyword_gender(rest);

    // No breed when every segment reads as an age or a gender.
    let breed = rest
        .split([',', '|'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .find(|part| !AGE_SEGMENT.is_match(part) && !GENDER_KEYWORD.is_match(part))
        .map(str::to_owned);

    Some(CaptionFields {
        name: Some(name.to_owned()),
        breed,
        age,
        gender,
        ..Default::default()
    })
}

fn parse_plain(text: &str) -> CaptionFields {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let name = lines.next().map(str::to_owned);
    let rest = lines.collect::<Vec<_>>();

    CaptionFields {
        name,
        description: (!rest.is_empty()).then(|| rest.join(" ")),
        ..Default::default()
    }
}
