//! INI text codec
//!
//! Reading honours one level of `[section]` grouping plus `key[]` and
//! `key[name]` rows for the third level. Writing produces CRLF-joined
//! lines with non-numeric values double-quoted. [`check`] tells whether
//! data can be written at all: INI has no escape for line breaks, and
//! some key spellings would read back as a different structure.

use crate::value::{ArrayKey, ConfigData, Entry, Scalar, Section, SubArray, Value};

/// Line separator used when rendering.
pub const LINE_SEPARATOR: &str = "\r\n";

/// A line that could not be read as INI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Parse INI text into config data.
pub fn parse(source: &str) -> Result<ConfigData, SyntaxError> {
    let mut data = ConfigData::new();
    let mut current: Option<String> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let end = rest
                .find(']')
                .ok_or_else(|| SyntaxError::new(line_no, "unterminated section header"))?;
            let name = rest[..end].trim();
            if name.is_empty() {
                return Err(SyntaxError::new(line_no, "empty section name"));
            }
            expect_trailing_comment(&rest[end + 1..], "section header")
                .map_err(|m| SyntaxError::new(line_no, m))?;
            match data.get_mut(name) {
                Some(Value::Scalar(_)) => {
                    return Err(SyntaxError::new(
                        line_no,
                        format!("section `{name}` redefines a top-level key"),
                    ));
                }
                Some(Value::List(items)) => {
                    let section = indexed_section(std::mem::take(items));
                    data.insert(name, section);
                }
                _ => {}
            }
            data.section_mut(name);
            current = Some(name.to_string());
            continue;
        }

        let (raw_key, raw_value) = line
            .split_once('=')
            .ok_or_else(|| SyntaxError::new(line_no, "expected `key = value`"))?;
        let (name, sub) = split_key(raw_key.trim()).map_err(|m| SyntaxError::new(line_no, m))?;
        let value = parse_value(raw_value.trim()).map_err(|m| SyntaxError::new(line_no, m))?;

        match &current {
            Some(section) => insert_in_section(data.section_mut(section), name, sub, value),
            None => insert_top_level(&mut data, name, sub, value),
        }
    }

    Ok(data)
}

/// Sub-key of an array row: `None` for `key[]`.
type SubKey<'a> = Option<&'a str>;

fn split_key(key: &str) -> Result<(&str, Option<SubKey<'_>>), String> {
    if key.is_empty() {
        return Err("missing key".into());
    }
    let Some(inner) = key.strip_suffix(']') else {
        return Ok((key, None));
    };
    let Some((name, sub)) = inner.split_once('[') else {
        return Err(format!("unbalanced brackets in key `{key}`"));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing key before `[` in `{key}`"));
    }
    let sub = sub.trim();
    Ok((name, Some((!sub.is_empty()).then_some(sub))))
}

fn insert_top_level(data: &mut ConfigData, name: &str, sub: Option<SubKey<'_>>, value: Scalar) {
    let Some(sub) = sub else {
        data.insert(name, value);
        return;
    };

    match (data.get_mut(name), sub) {
        (Some(Value::List(items)), None) => items.push(value),
        (Some(Value::Section(section)), sub) => {
            let key = match sub {
                Some(key) => key.to_string(),
                None => next_index(section).to_string(),
            };
            section.insert(key, value);
        }
        (Some(Value::List(items)), Some(key)) => {
            let mut section = indexed_section(std::mem::take(items));
            section.insert(key, value);
            data.insert(name, section);
        }
        (_, None) => data.insert(name, vec![value]),
        (_, Some(key)) => data.insert(name, Section::new().with(key, value)),
    }
}

fn indexed_section(items: Vec<Scalar>) -> Section {
    let mut section = Section::new();
    for (idx, item) in items.into_iter().enumerate() {
        section.insert(idx.to_string(), item);
    }
    section
}

fn next_index(section: &Section) -> usize {
    section
        .iter()
        .filter_map(|(key, _)| key.parse::<usize>().ok())
        .map(|idx| idx + 1)
        .max()
        .unwrap_or(0)
}

fn insert_in_section(section: &mut Section, name: &str, sub: Option<SubKey<'_>>, value: Scalar) {
    let Some(sub) = sub else {
        section.insert(name, value);
        return;
    };

    if !matches!(section.get(name), Some(Entry::Array(_))) {
        section.insert(name, SubArray::new());
    }
    if let Some(Entry::Array(array)) = section.get_mut(name) {
        match sub {
            Some(key) => array.insert(ArrayKey::parse(key), value),
            None => array.push(value),
        }
    }
}

fn parse_value(raw: &str) -> Result<Scalar, String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let mut text = String::new();
        let mut chars = rest.char_indices();
        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => text.push(escaped),
                    Some((_, other)) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => text.push('\\'),
                },
                '"' => {
                    expect_trailing_comment(&rest[idx + 1..], "quoted value")?;
                    return Ok(Scalar::Text(text));
                }
                c => text.push(c),
            }
        }
        return Err("unterminated double-quoted value".into());
    }

    if let Some(rest) = raw.strip_prefix('\'') {
        let (text, tail) = rest
            .split_once('\'')
            .ok_or_else(|| "unterminated single-quoted value".to_string())?;
        expect_trailing_comment(tail, "quoted value")?;
        return Ok(Scalar::Text(text.to_string()));
    }

    let bare = raw.split(';').next().unwrap_or_default().trim();
    Ok(typed_bare_value(bare))
}

fn expect_trailing_comment(tail: &str, after: &str) -> Result<(), String> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with(';') || tail.starts_with('#') {
        Ok(())
    } else {
        Err(format!("unexpected `{tail}` after {after}"))
    }
}

/// Unquoted values keep their exact text unless they are a keyword or a
/// canonically written number, so rendering them again is lossless.
fn typed_bare_value(bare: &str) -> Scalar {
    match bare.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => return Scalar::Bool(true),
        "false" | "off" | "no" | "none" => return Scalar::Bool(false),
        "null" => return Scalar::Text(String::new()),
        _ => {}
    }
    if let Ok(n) = bare.parse::<i64>() {
        if n.to_string() == bare {
            return Scalar::Integer(n);
        }
    }
    if let Ok(f) = bare.parse::<f64>() {
        if f.is_finite() && f.to_string() == bare {
            return Scalar::Float(f);
        }
    }
    Scalar::Text(bare.to_string())
}

/// Render config data as INI text.
///
/// Top-level scalars come first, since any row after a `[section]` header
/// belongs to that section; lists and sections follow in their own order.
/// Top-level lists are written as sections keyed by position. Numeric
/// sub-array keys are written as `key[]`.
///
/// Data rejected by [`check`] renders to text that does not read back.
pub fn render(data: &ConfigData) -> String {
    let (rows, groups): (Vec<_>, Vec<_>) = data
        .iter()
        .partition(|(_, value)| matches!(value, Value::Scalar(_)));

    let mut lines = Vec::new();
    for (key, value) in rows.into_iter().chain(groups) {
        match value {
            Value::Scalar(scalar) => lines.push(row(key, scalar)),
            Value::List(items) => {
                lines.push(format!("[{key}]"));
                for (idx, item) in items.iter().enumerate() {
                    lines.push(row(&idx.to_string(), item));
                }
            }
            Value::Section(section) => {
                lines.push(format!("[{key}]"));
                for (name, entry) in section.iter() {
                    match entry {
                        Entry::Scalar(scalar) => lines.push(row(name, scalar)),
                        Entry::Array(array) => {
                            for (sub, scalar) in array.iter() {
                                lines.push(array_row(name, sub, scalar));
                            }
                        }
                    }
                }
            }
        }
    }
    lines.join(LINE_SEPARATOR)
}

fn row(key: &str, value: &Scalar) -> String {
    format!("{key} = {}", render_scalar(value))
}

fn array_row(key: &str, sub: &ArrayKey, value: &Scalar) -> String {
    let sub = match sub {
        ArrayKey::Index(_) => "",
        ArrayKey::Name(name) if crate::value::is_numeric(name) => "",
        ArrayKey::Name(name) => name,
    };
    format!("{key}[{sub}] = {}", render_scalar(value))
}

fn render_scalar(value: &Scalar) -> String {
    match value {
        Scalar::Bool(b) => b.to_string(),
        scalar if scalar.is_numeric() => scalar.to_string(),
        scalar => {
            let text = scalar.to_string();
            format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
        }
    }
}

/// An entry that has no INI spelling reading back as the same data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unwritable {
    /// Dotted path of the offending entry
    pub key: String,
    pub message: String,
}

impl Unwritable {
    fn new(key: &str, message: &str) -> Self {
        Self {
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

/// Check that every key and value of `data` can be written.
pub fn check(data: &ConfigData) -> Result<(), Unwritable> {
    data.iter().try_for_each(|(key, value)| check_value(key, value))
}

/// Check that top-level `key` bound to `value` can be written.
pub fn check_value(key: &str, value: &Value) -> Result<(), Unwritable> {
    match value {
        Value::Scalar(scalar) => {
            reject(key, row_key_problem(key))?;
            check_text(key, scalar)
        }
        Value::List(items) => {
            reject(key, section_name_problem(key))?;
            items.iter().try_for_each(|item| check_text(key, item))
        }
        Value::Section(section) => {
            reject(key, section_name_problem(key))?;
            for (name, entry) in section.iter() {
                let path = format!("{key}.{name}");
                match entry {
                    Entry::Scalar(scalar) => {
                        reject(&path, row_key_problem(name))?;
                        check_text(&path, scalar)?;
                    }
                    Entry::Array(array) => {
                        reject(&path, array_name_problem(name))?;
                        for (sub, scalar) in array.iter() {
                            if let ArrayKey::Name(sub) = sub {
                                reject(&path, sub_key_problem(sub))?;
                            }
                            check_text(&path, scalar)?;
                        }
                    }
                }
            }
            Ok(())
        }
    }
}

fn reject(key: &str, problem: Option<&str>) -> Result<(), Unwritable> {
    match problem {
        Some(message) => Err(Unwritable::new(key, message)),
        None => Ok(()),
    }
}

fn check_text(key: &str, value: &Scalar) -> Result<(), Unwritable> {
    match value {
        Scalar::Text(text) if has_line_break(text) => {
            Err(Unwritable::new(key, "values cannot contain line breaks"))
        }
        _ => Ok(()),
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

fn bare_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() || name.trim() != name {
        Some("names must be non-empty without surrounding whitespace")
    } else if has_line_break(name) {
        Some("names cannot contain line breaks")
    } else {
        None
    }
}

fn section_name_problem(name: &str) -> Option<&'static str> {
    bare_name_problem(name).or_else(|| name.contains(']').then_some("section names cannot contain `]`"))
}

fn sub_key_problem(name: &str) -> Option<&'static str> {
    bare_name_problem(name).or_else(|| name.contains('=').then_some("keys cannot contain `=`"))
}

fn key_problem(key: &str) -> Option<&'static str> {
    sub_key_problem(key).or_else(|| {
        key.starts_with([';', '#', '['])
            .then_some("keys cannot start with `;`, `#` or `[`")
    })
}

fn row_key_problem(key: &str) -> Option<&'static str> {
    key_problem(key).or_else(|| key.ends_with(']').then_some("keys cannot end with `]`"))
}

fn array_name_problem(key: &str) -> Option<&'static str> {
    key_problem(key).or_else(|| key.contains('[').then_some("array names cannot contain `[`"))
}
