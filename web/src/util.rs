use libentree::{record::ImageRef, text};
use minijinja::value::ViaDeserialize;
use serde::Serialize;
use time::{Date, macros::format_description};

/// A minijinja template filter for shortening plain text with a trailing
/// `...`
pub(crate) fn truncate_text(s: &str, chars: Option<usize>) -> String {
    text::truncate(s, chars.unwrap_or(100))
}

/// A minijinja template filter that keeps only urls that are safe to link to
pub(crate) fn web_url(s: Option<&str>) -> Option<String> {
    s.and_then(text::web_url).map(String::from)
}

/// A minijinja template filter that returns a url for a resized and cropped
/// version of a CMS image
pub(crate) fn imgix(image: ViaDeserialize<ImageRef>, width: u32, height: u32) -> String {
    image.sized(width, height)
}

/// A minijinja template filter that splits multi-line text (e.g. an address)
/// into its non-empty lines
pub(crate) fn lines(s: Option<&str>) -> Vec<String> {
    s.map(|s| text::lines(s).into_iter().map(String::from).collect())
        .unwrap_or_default()
}

#[derive(Debug, PartialEq, Serialize)]
pub(crate) struct OpeningHours {
    pub(crate) day: String,
    pub(crate) hours: String,
}

/// A minijinja template filter that turns a block of "Day: hours" lines into a
/// list of [OpeningHours]
pub(crate) fn hours(s: Option<&str>) -> minijinja::Value {
    let entries: Vec<OpeningHours> = s
        .map(text::lines)
        .unwrap_or_default()
        .into_iter()
        .map(|line| {
            let (day, hours) = text::split_hours(line);
            OpeningHours {
                day: day.to_string(),
                hours: hours.to_string(),
            }
        })
        .collect();
    minijinja::Value::from_serialize(&entries)
}

/// A minijinja template filter for showing a `YYYY-MM-DD` date from the CMS
/// as e.g. `1 March 2024`. Anything else is passed through unchanged.
pub(crate) fn format_date(s: &str) -> String {
    let input = format_description!("[year]-[month]-[day]");
    let output = format_description!("[day padding:none] [month repr:long] [year]");
    Date::parse(s.trim(), &input)
        .ok()
        .and_then(|d| d.format(&output).ok())
        .unwrap_or_else(|| s.to_string())
}

/// A minijinja global function returning the current year, for the footer
pub(crate) fn current_year() -> i32 {
    time::OffsetDateTime::now_utc().year()
}

#[derive(Debug, Serialize)]
pub(crate) enum FlashMessageKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Serialize)]
pub(crate) struct FlashMessage {
    pub kind: FlashMessageKind,
    pub msg: String,
}
