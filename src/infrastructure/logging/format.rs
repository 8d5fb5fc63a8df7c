//! Message templates
//!
//! Templates use `%(attribute)s` directives with an optional `-` (left align)
//! and minimum width, e.g. `%(levelname)-8s` or `%(lineno)6d`. `%%` is a
//! literal percent sign. Unknown attributes are rendered verbatim.

use std::fmt::Write as _;

use super::record::LogRecord;

/// Template used when the configuration does not provide one.
pub const DEFAULT_FORMAT: &str =
    "%(asctime)s %(module)20s %(lineno)6s %(threadName)20s %(levelname)10s %(message)s";

/// Template for handlers created without an explicit one.
pub const BASIC_FORMAT: &str = "%(message)s";

const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Widest padding a directive may ask for; wider ones are kept as literal text.
const MAX_FIELD_WIDTH: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute {
    Asctime,
    Created,
    Name,
    LevelName,
    LevelNo,
    Module,
    Filename,
    Pathname,
    Lineno,
    ThreadName,
    Thread,
    Process,
    Message,
}

impl Attribute {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "asctime" => Self::Asctime,
            "created" => Self::Created,
            "name" => Self::Name,
            "levelname" => Self::LevelName,
            "levelno" => Self::LevelNo,
            "module" => Self::Module,
            "filename" => Self::Filename,
            "pathname" => Self::Pathname,
            "lineno" => Self::Lineno,
            "threadName" => Self::ThreadName,
            "thread" => Self::Thread,
            "process" => Self::Process,
            "message" => Self::Message,
            _ => return None,
        })
    }

    fn render(self, record: &LogRecord) -> String {
        match self {
            Self::Asctime => record.created.format(ASCTIME_FORMAT).to_string(),
            Self::Created => format!(
                "{}.{:03}",
                record.created.timestamp(),
                record.created.timestamp_subsec_millis()
            ),
            Self::Name => {
                if record.logger.is_empty() {
                    "root".to_string()
                } else {
                    record.logger.clone()
                }
            }
            Self::LevelName => record.level_name.to_string(),
            Self::LevelNo => record.level_no.to_string(),
            Self::Module => record.module(),
            Self::Filename => record.filename(),
            Self::Pathname => record.pathname.clone().unwrap_or_else(|| "?".to_string()),
            Self::Lineno => record
                .lineno
                .map_or_else(|| "0".to_string(), |line| line.to_string()),
            Self::ThreadName => record.thread_name.clone(),
            Self::Thread => record.thread_id.clone(),
            Self::Process => record.process_id.to_string(),
            Self::Message => record.message.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field {
        attribute: Attribute,
        width: usize,
        left_align: bool,
    },
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFormat {
    template: String,
    segments: Vec<Segment>,
}

impl RecordFormat {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];

            if let Some(after) = tail.strip_prefix('%') {
                literal.push('%');
                rest = after;
                continue;
            }

            match parse_directive(tail) {
                Some((attribute, width, left_align, consumed)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field {
                        attribute,
                        width,
                        left_align,
                    });
                    rest = &tail[consumed..];
                }
                None => {
                    literal.push('%');
                    rest = tail;
                }
            }
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            template: template.to_string(),
            segments,
        }
    }

    /// The template this format was parsed from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn render(&self, record: &LogRecord) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field {
                    attribute,
                    width,
                    left_align,
                } => {
                    let value = attribute.render(record);
                    let _ = if *left_align {
                        write!(out, "{value:<width$}")
                    } else {
                        write!(out, "{value:>width$}")
                    };
                }
            }
        }
        out
    }
}

impl Default for RecordFormat {
    fn default() -> Self {
        Self::parse(DEFAULT_FORMAT)
    }
}

/// Parse `(name)[-][width]conv` following a `%`.
///
/// Returns the attribute, width, alignment and the number of bytes consumed.
fn parse_directive(tail: &str) -> Option<(Attribute, usize, bool, usize)> {
    let inner = tail.strip_prefix('(')?;
    let close = inner.find(')')?;
    let attribute = Attribute::lookup(&inner[..close])?;

    let spec = &inner[close + 1..];
    let left_align = spec.starts_with('-');
    let digits_start = usize::from(left_align);
    let digits_len = spec[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let digits = &spec[digits_start..digits_start + digits_len];
    let conversion = spec[digits_start + digits_len..].chars().next()?;
    if !matches!(conversion, 's' | 'd') {
        return None;
    }
    let width = if digits.is_empty() {
        0
    } else {
        digits.parse().ok().filter(|w| *w <= MAX_FIELD_WIDTH)?
    };

    // '(' + name + ')' + flags/width + conversion
    let consumed = 1 + close + 1 + digits_start + digits_len + 1;
    Some((attribute, width, left_align, consumed))
}
