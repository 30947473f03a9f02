use std::sync::mpsc;

use crate::{JobId, Slot, Unit};

/// A job property whose change is reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    ProcessedAmount(Unit),
    TotalAmount(Unit),
    Speed,
    Percentage,
    DescriptionLabel(Slot),
    DescriptionValue(Slot),
    DescriptionUrl,
    DestUrl,
    Summary,
    /// Internal only: affects the derived text but is not part of the public surface.
    InfoMessage,
    Error,
    ErrorText,
    State,
    HasDetails,
}

impl Property {
    pub fn is_public(self) -> bool {
        !matches!(self, Property::InfoMessage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    AddressRegistered { job_id: JobId, address: String },
    Changed { job_id: JobId, property: Property },
    AddressUnregistered { job_id: JobId, address: String },
    /// The job was canceled by the user and should disappear without notice.
    Closed { job_id: JobId },
    /// The job finished and should be shown again with a fresh timestamp.
    Resurfaced { job_id: JobId },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: JobEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<JobEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<JobEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: JobEvent) {
        let _ = self.tx.send(event);
    }
}
