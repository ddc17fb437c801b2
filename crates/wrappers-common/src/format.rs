//! squeue style output templates.
//!
//! A template mixes literal text with tokens of the form `%[.][N]c`, where
//! `c` selects a job field. `%.N` right-justifies the field in `N` columns,
//! `%N` left-justifies it. Fields longer than `N` are cut to their first `N`
//! characters. Without a width the field is printed as is.
//!
//! Tokens whose designator is unknown are dropped from the output. Use
//! [`Template::unknown_tokens`] to report them before rendering.

use crate::job::JobRecord;

/// Upper bound for a single column width.
pub const MAX_WIDTH: usize = 4096;

pub const DEFAULT_FORMAT: &str = "%.18i %.9P %.8j %.8u %.2t %.10M %.6D %R";

/// A job field that can be referenced from a template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// `%i`
    Id,
    /// `%P`
    Partition,
    /// `%j`
    Name,
    /// `%u`
    User,
    /// `%a`
    Username,
    /// `%t`
    Status,
    /// `%M`
    Time,
    /// `%D`
    Nodes,
    /// `%R`
    NodelistReason,
}

impl FieldKey {
    pub const ALL: [FieldKey; 9] = [
        FieldKey::Id,
        FieldKey::Partition,
        FieldKey::Name,
        FieldKey::User,
        FieldKey::Username,
        FieldKey::Status,
        FieldKey::Time,
        FieldKey::Nodes,
        FieldKey::NodelistReason,
    ];

    pub fn from_designator(c: char) -> Option<Self> {
        FieldKey::ALL.into_iter().find(|k| k.designator() == c)
    }

    pub fn designator(&self) -> char {
        match self {
            FieldKey::Id => 'i',
            FieldKey::Partition => 'P',
            FieldKey::Name => 'j',
            FieldKey::User => 'u',
            FieldKey::Username => 'a',
            FieldKey::Status => 't',
            FieldKey::Time => 'M',
            FieldKey::Nodes => 'D',
            FieldKey::NodelistReason => 'R',
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            FieldKey::Id => "JOBID",
            FieldKey::Partition => "PARTITION",
            FieldKey::Name => "NAME",
            FieldKey::User => "USER",
            FieldKey::Username => "USERNAME",
            FieldKey::Status => "STATUS",
            FieldKey::Time => "TIME",
            FieldKey::Nodes => "NODES",
            FieldKey::NodelistReason => "NODELIST(REASON)",
        }
    }
}

/// Something a template can pull field values from.
pub trait FieldSource {
    fn field(&self, key: FieldKey) -> Option<String>;
}

/// Column labels.
#[derive(Clone, Copy, Debug, Default)]
pub struct Header;

impl FieldSource for Header {
    fn field(&self, key: FieldKey) -> Option<String> {
        Some(key.header().to_string())
    }
}

impl FieldSource for JobRecord {
    fn field(&self, key: FieldKey) -> Option<String> {
        let value = match key {
            FieldKey::Id => self.id.f58(),
            FieldKey::Partition => self.queue.clone(),
            FieldKey::Name => self.name.clone(),
            FieldKey::User | FieldKey::Username => self.user.clone(),
            FieldKey::Status => self.status_abbrev.clone(),
            FieldKey::Time => format_duration(self.runtime),
            FieldKey::Nodes => self.nnodes.to_string(),
            FieldKey::NodelistReason => {
                if self.reason_pending.is_empty() {
                    self.nodelist.clone()
                } else {
                    self.reason_pending.clone()
                }
            }
        };
        Some(value)
    }
}

/// Render whole seconds as `H:MM:SS`, or `MM:SS` below one hour.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = seconds / 60 % 60;
    let seconds = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    /// `%.N`
    Right(usize),
    /// `%N`
    Left(usize),
}

impl Width {
    pub fn apply(&self, value: &str) -> String {
        let (padded, width) = match *self {
            Width::Right(width) => (format!("{value:>width$}"), width),
            Width::Left(width) => (format!("{value:<width$}"), width),
        };
        padded.chars().take(width).collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Literal(String),
    Field {
        key: FieldKey,
        width: Option<Width>,
    },
    Unknown(char),
}

/// A parsed output template.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = template;

        while let Some(pos) = rest.find('%') {
            literal.push_str(&rest[..pos]);
            let token = &rest[pos..];
            let (consumed, segment) = scan_token(token);
            match segment {
                Some(segment) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                None => literal.push_str(if token.starts_with("%%") {
                    "%"
                } else {
                    &token[..consumed]
                }),
            }
            rest = &token[consumed..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Fill the template from `source`. Tokens the source cannot resolve
    /// produce no output.
    pub fn render<S: FieldSource + ?Sized>(&self, source: &S) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { key, width } => {
                    if let Some(value) = source.field(*key) {
                        match width {
                            Some(width) => out.push_str(&width.apply(&value)),
                            None => out.push_str(&value),
                        }
                    }
                }
                Segment::Unknown(_) => {}
            }
        }
        out
    }

    /// Base keys (`%Z`) of tokens that name no known field, each listed once
    /// in order of first appearance.
    pub fn unknown_tokens(&self) -> Vec<String> {
        let mut unknown: Vec<String> = Vec::new();
        for segment in &self.segments {
            if let Segment::Unknown(c) = segment {
                let key = format!("%{c}");
                if !unknown.contains(&key) {
                    unknown.push(key);
                }
            }
        }
        unknown
    }
}

/// Scan one token at the start of `token` (which begins with `%`). Returns
/// the number of bytes consumed and the segment, or `None` when the text is
/// literal (`%%`, or a `%` without designator).
fn scan_token(token: &str) -> (usize, Option<Segment>) {
    let body = &token[1..];
    if body.starts_with('%') {
        return (2, None);
    }

    let mut consumed = 1;
    let right = body.starts_with('.');
    if right {
        consumed += 1;
    }
    let digits = token[consumed..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    let width = if digits > 0 {
        let n = token[consumed..consumed + digits]
            .parse::<usize>()
            .map_or(MAX_WIDTH, |n| n.min(MAX_WIDTH));
        Some(if right { Width::Right(n) } else { Width::Left(n) })
    } else {
        None
    };
    consumed += digits;

    match token[consumed..].chars().next() {
        Some(c) if c != '%' && !c.is_whitespace() => {
            consumed += c.len_utf8();
            let segment = match FieldKey::from_designator(c) {
                Some(key) => Segment::Field { key, width },
                None => Segment::Unknown(c),
            };
            (consumed, Some(segment))
        }
        _ => (consumed, None),
    }
}
