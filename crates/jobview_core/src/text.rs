//! Derivation of the single human-readable status line of a job.
use jobview_logging::jobview_info;

use crate::fields::{FieldStore, Slot};

/// Message templates used when building the status line.
///
/// Pluralized messages receive the count that selects singular or plural form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageId {
    /// "%1 file(s) to %2"; plural on %1.
    FilesToDestination,
    /// "to %1"
    ToDestination,
    /// "%1 file(s)"; plural on %1.
    Files,
    /// "%1 to %2"
    FileToDestination,
    /// "%2 of %1 file(s) to %3"; plural on %1.
    ProcessedOfTotalToDestination,
    /// "%2 of %1 file(s)"; plural on %1.
    ProcessedOfTotal,
}

/// Localized string catalog.
pub trait MessageFormatter: Send + Sync {
    fn format(&self, id: MessageId, count: Option<u64>, args: &[String]) -> String;
}

/// Built-in English catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishMessages;

impl EnglishMessages {
    fn template(id: MessageId, singular: bool) -> &'static str {
        match (id, singular) {
            (MessageId::FilesToDestination, true) => "%1 file to %2",
            (MessageId::FilesToDestination, false) => "%1 files to %2",
            (MessageId::ToDestination, _) => "to %1",
            (MessageId::Files, true) => "%1 file",
            (MessageId::Files, false) => "%1 files",
            (MessageId::FileToDestination, _) => "%1 to %2",
            (MessageId::ProcessedOfTotalToDestination, true) => "%2 of %1 file to %3",
            (MessageId::ProcessedOfTotalToDestination, false) => "%2 of %1 files to %3",
            (MessageId::ProcessedOfTotal, true) => "%2 of %1 file",
            (MessageId::ProcessedOfTotal, false) => "%2 of %1 files",
        }
    }
}

impl MessageFormatter for EnglishMessages {
    fn format(&self, id: MessageId, count: Option<u64>, args: &[String]) -> String {
        substitute(Self::template(id, count == Some(1)), args)
    }
}

/// Replaces `%1`..`%9` placeholders with the matching argument.
pub fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            if let Some(arg) = chars
                .peek()
                .and_then(|d| d.to_digit(10))
                .filter(|d| *d > 0)
                .and_then(|d| args.get(d as usize - 1))
            {
                out.push_str(arg);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Status line for a job given its fields and its already formatted destination.
pub fn display_text(fields: &FieldStore, destination: &str, messages: &dyn MessageFormatter) -> String {
    if !fields.error_text.is_empty() {
        return fields.error_text.clone();
    }
    if !fields.info_message.is_empty() {
        return fields.info_message.clone();
    }

    let processed = fields.processed.files;
    let total = fields.total.files;
    let current_file = fields.current_file_name();
    let dest = destination.to_string();
    let in_range = processed > 0 && processed <= total;

    let text = match total {
        0 if !dest.is_empty() && processed > 0 => Some(messages.format(
            MessageId::FilesToDestination,
            Some(processed),
            &[processed.to_string(), dest],
        )),
        0 if !dest.is_empty() => Some(messages.format(MessageId::ToDestination, None, &[dest])),
        0 if processed > 0 => Some(messages.format(
            MessageId::Files,
            Some(processed),
            &[processed.to_string()],
        )),
        1 if current_file.is_some() => current_file.map(|name| {
            if dest.is_empty() {
                name
            } else {
                messages.format(MessageId::FileToDestination, None, &[name, dest])
            }
        }),
        n if n > 1 => {
            let count = if processed > 0 { processed } else { total };
            Some(match (dest.is_empty(), in_range) {
                (false, true) => messages.format(
                    MessageId::ProcessedOfTotalToDestination,
                    Some(total),
                    &[total.to_string(), processed.to_string(), dest],
                ),
                (false, false) => messages.format(
                    MessageId::FilesToDestination,
                    Some(count),
                    &[count.to_string(), dest],
                ),
                (true, true) => messages.format(
                    MessageId::ProcessedOfTotal,
                    Some(total),
                    &[total.to_string(), processed.to_string()],
                ),
                (true, false) => {
                    messages.format(MessageId::Files, Some(count), &[count.to_string()])
                }
            })
        }
        _ => None,
    };

    text.unwrap_or_else(|| {
        jobview_info!(
            "Failed to generate job text: processed_files={} total_files={} current_file={:?} destination={:?}",
            processed,
            total,
            fields.current_file_name(),
            destination
        );
        jobview_info!(
            "  label1={:?} value1={:?} label2={:?} value2={:?}",
            fields.description(Slot::First).label,
            fields.description(Slot::First).value,
            fields.description(Slot::Second).label,
            fields.description(Slot::Second).value
        );
        String::new()
    })
}
