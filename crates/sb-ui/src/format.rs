//! Text helpers: timestamps, HTML escaping and truncation.

use chrono::{DateTime, Local, TimeZone, Utc};
use sb_core::value::FieldValue;
use std::fmt;

/// Marker appended by [`truncate`].
pub const ELLIPSIS: &str = "...";

/// Display pattern for [`format_timestamp`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// `YYYY-MM-DD`
    Date,
    /// `HH:MM`
    Time,
    /// `MM-DD HH:MM`
    Short,
    /// `YYYY-MM-DD HH:MM`
    #[default]
    DateTime,
}

impl TimeFormat {
    fn pattern(self) -> &'static str {
        match self {
            Self::Date => "%Y-%m-%d",
            Self::Time => "%H:%M",
            Self::Short => "%m-%d %H:%M",
            Self::DateTime => "%Y-%m-%d %H:%M",
        }
    }
}

/// Anything that can name an instant: store timestamps, chrono values,
/// epoch milliseconds or RFC 3339 text.
pub trait AsInstant {
    fn as_instant(&self) -> Option<DateTime<Utc>>;
}

impl AsInstant for DateTime<Utc> {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

/// Epoch milliseconds. Zero counts as "no value".
impl AsInstant for i64 {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        if *self == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(*self)
    }
}

impl AsInstant for str {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl AsInstant for String {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        self.as_str().as_instant()
    }
}

impl AsInstant for FieldValue {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            Self::Integer(millis) => millis.as_instant(),
            Self::String(text) => text.as_instant(),
            _ => None,
        }
    }
}

impl<T: AsInstant> AsInstant for Option<T> {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(AsInstant::as_instant)
    }
}

impl<T: AsInstant + ?Sized> AsInstant for &T {
    fn as_instant(&self) -> Option<DateTime<Utc>> {
        (**self).as_instant()
    }
}

/// Formats `ts` in the local time zone. Missing input yields `""`.
pub fn format_timestamp<T: AsInstant + ?Sized>(ts: &T, format: TimeFormat) -> String {
    format_timestamp_in(ts, format, &Local)
}

/// Formats `ts` in an explicit time zone.
pub fn format_timestamp_in<T, Tz>(ts: &T, format: TimeFormat, tz: &Tz) -> String
where
    T: AsInstant + ?Sized,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match ts.as_instant() {
        Some(instant) => instant.with_timezone(tz).format(format.pattern()).to_string(),
        None => String::new(),
    }
}

/// Escapes text for embedding as HTML content or a quoted attribute.
/// Covers `& < > " '`; everything else passes through.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Keeps at most `max_len` characters, appending [`ELLIPSIS`] when cut.
pub fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap()
    }

    #[test]
    fn formats_each_pattern() {
        let ts = instant();
        assert_eq!(format_timestamp_in(&ts, TimeFormat::Date, &Utc), "2024-03-05");
        assert_eq!(format_timestamp_in(&ts, TimeFormat::Time, &Utc), "09:07");
        assert_eq!(format_timestamp_in(&ts, TimeFormat::Short, &Utc), "03-05 09:07");
        assert_eq!(format_timestamp_in(&ts, TimeFormat::default(), &Utc), "2024-03-05 09:07");
    }

    #[test]
    fn converts_to_the_requested_zone() {
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_timestamp_in(&instant(), TimeFormat::Time, &kst), "18:07");
    }

    #[test]
    fn accepts_store_and_raw_values() {
        let stored = FieldValue::Timestamp(instant());
        let millis = instant().timestamp_millis();
        assert_eq!(format_timestamp_in(&stored, TimeFormat::Date, &Utc), "2024-03-05");
        assert_eq!(format_timestamp_in(&millis, TimeFormat::Date, &Utc), "2024-03-05");
        assert_eq!(
            format_timestamp_in("2024-03-05T09:07:00Z", TimeFormat::Short, &Utc),
            "03-05 09:07"
        );
    }

    #[test]
    fn missing_input_is_empty() {
        let none: Option<DateTime<Utc>> = None;
        assert_eq!(format_timestamp(&none, TimeFormat::DateTime), "");
        assert_eq!(format_timestamp(&FieldValue::Null, TimeFormat::Date), "");
        assert_eq!(format_timestamp("", TimeFormat::Date), "");
        assert_eq!(format_timestamp(&0_i64, TimeFormat::Date), "");
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape_html("plain text 123"), "plain text 123");
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_html("and/or"), "and/or");
        assert_eq!(escape_html("https://x.com/a?b=c"), "https://x.com/a?b=c");
    }

    #[test]
    fn escape_removes_every_markup_character() {
        let escaped = escape_html(r#"<a href="x" title='y'>Tom & Jerry</a>"#);
        for raw in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(raw), "{raw} survived in {escaped}");
        }
        assert!(escaped.starts_with("&lt;a href=&quot;x&quot;"));
        assert!(escaped.ends_with("&lt;/a&gt;"));
        assert!(escaped.contains("Tom &amp; Jerry"));
        // Every remaining ampersand starts an entity.
        assert_eq!(escaped.matches('&').count(), escaped.matches(';').count());
    }

    #[test]
    fn truncate_within_limit_is_identity() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("", 3), "");
    }

    #[test]
    fn truncate_cuts_on_characters() {
        assert_eq!(truncate("hello world", 5), "hello...");
        assert_eq!(truncate("안녕하세요 여러분", 5), "안녕하세요...");
        assert_eq!(truncate("abc", 0), "...");
    }

    #[test]
    fn truncate_prefix_law_holds_for_long_inputs() {
        let text = "가나다라마바사아자차카타파하".repeat(30);
        for n in [1_usize, 20, 299, 300] {
            let cut = truncate(&text, n);
            let prefix = cut.strip_suffix(ELLIPSIS).unwrap();
            assert_eq!(prefix.chars().count(), n);
            assert!(text.starts_with(prefix));
        }
    }
}
