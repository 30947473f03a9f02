use std::fmt;
use std::path::Path;

use url::Url;

/// Stores `value` into `slot` only when it differs. Returns whether it changed.
pub fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

/// Unit of a processed/total amount as named by the job view protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Bytes,
    Files,
    Directories,
}

impl Unit {
    /// Parses the protocol unit string. Unknown units yield `None`.
    pub fn parse(unit: &str) -> Option<Self> {
        match unit {
            "bytes" => Some(Unit::Bytes),
            "files" => Some(Unit::Files),
            "dirs" => Some(Unit::Directories),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Bytes => write!(f, "bytes"),
            Unit::Files => write!(f, "files"),
            Unit::Directories => write!(f, "dirs"),
        }
    }
}

/// One of the two description (label, value) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    /// Maps the zero-based protocol field number to a slot.
    pub fn from_index(number: u32) -> Option<Self> {
        match number {
            0 => Some(Slot::First),
            1 => Some(Slot::Second),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Amounts {
    pub bytes: u64,
    pub files: u64,
    pub directories: u64,
}

impl Amounts {
    pub fn get(&self, unit: Unit) -> u64 {
        match unit {
            Unit::Bytes => self.bytes,
            Unit::Files => self.files,
            Unit::Directories => self.directories,
        }
    }

    pub(crate) fn slot_mut(&mut self, unit: Unit) -> &mut u64 {
        match unit {
            Unit::Bytes => &mut self.bytes,
            Unit::Files => &mut self.files,
            Unit::Directories => &mut self.directories,
        }
    }

    fn any_nonzero(&self) -> bool {
        self.bytes > 0 || self.files > 0 || self.directories > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description {
    pub label: String,
    pub value: String,
}

impl Description {
    pub fn is_empty(&self) -> bool {
        self.label.is_empty() && self.value.is_empty()
    }
}

/// Current value of every job attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldStore {
    pub processed: Amounts,
    pub total: Amounts,
    pub speed: u64,
    pub percentage: u32,
    pub descriptions: [Description; 2],
    pub summary: String,
    /// Transient status such as "Connecting to server…". Only shown via the derived text.
    pub info_message: String,
    pub dest_url: Option<Url>,
    pub error: u32,
    pub error_text: String,
}

impl FieldStore {
    pub fn description(&self, slot: Slot) -> &Description {
        &self.descriptions[slot.index()]
    }

    pub(crate) fn description_mut(&mut self, slot: Slot) -> &mut Description {
        &mut self.descriptions[slot.index()]
    }

    /// True when any amount or the speed is non-zero, or any description text is set.
    pub fn has_details(&self) -> bool {
        self.total.any_nonzero()
            || self.processed.any_nonzero()
            || self.speed > 0
            || self.descriptions.iter().any(|d| !d.is_empty())
    }

    /// URL of the item currently being worked on: description value 2, falling back to value 1.
    pub fn description_url(&self) -> Option<Url> {
        local_file_or_url(&self.description(Slot::Second).value)
            .or_else(|| local_file_or_url(&self.description(Slot::First).value))
    }

    /// File name shown for single-file jobs, taken from the description values.
    pub fn current_file_name(&self) -> Option<String> {
        [Slot::Second, Slot::First]
            .into_iter()
            .map(|slot| self.description(slot).value.as_str())
            .find(|value| !value.is_empty())
            .and_then(file_name_of)
    }
}

/// Interprets `value` as a URL, or as a local path when it has no scheme.
pub fn local_file_or_url(value: &str) -> Option<Url> {
    if value.is_empty() {
        return None;
    }
    match Url::parse(value) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(value).ok(),
        Err(_) => None,
    }
}

/// Removes a single trailing slash from the path, keeping the root path intact.
pub fn strip_trailing_slash(mut url: Url) -> Url {
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }
    url
}

/// Drops the final path segment, leaving the containing directory with a trailing slash.
pub fn remove_file_name(mut url: Url) -> Url {
    if let Some(idx) = url.path().rfind('/') {
        let dir = url.path()[..=idx].to_string();
        url.set_path(&dir);
    }
    url
}

fn file_name_of(value: &str) -> Option<String> {
    let name = match Url::parse(value) {
        Ok(url) => {
            let segment = url.path_segments()?.next_back()?.to_string();
            urlencoding::decode(&segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(segment)
        }
        Err(_) => Path::new(value).file_name()?.to_string_lossy().into_owned(),
    };
    (!name.is_empty()).then_some(name)
}
