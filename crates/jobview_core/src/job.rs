use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use jobview_logging::{jobview_debug, jobview_trace};
use url::Url;

use crate::context::JobContext;
use crate::destination::pretty_destination;
use crate::event::{EventSink, JobEvent, Property};
use crate::fields::{set_if_changed, strip_trailing_slash, FieldStore, Slot, Unit};
use crate::places::PlacesLookup;
use crate::properties::Properties;
use crate::text::display_text;

pub type JobId = u32;

/// Error code reported by a job the user canceled (KIO's `ERR_USER_CANCELED`).
pub const USER_CANCELED: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Running,
    Suspended,
    /// Terminal.
    Stopped,
}

/// How a terminated job leaves the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// Canceled by the user: drop without notice.
    Closed,
    /// Hand back to the presentation layer, undismissed and with a fresh timestamp.
    Resurfaced,
}

/// Canonical single-field update every protocol call is translated into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Summary(String),
    InfoMessage(String),
    Percent(u32),
    DestUrl(Option<Url>),
    Speed(u64),
    Processed(Unit, u64),
    Total(Unit, u64),
    DescriptionLabel(Slot, String),
    DescriptionValue(Slot, String),
    Suspended(bool),
    Error(u32),
}

impl FieldUpdate {
    fn touches_description(&self) -> bool {
        matches!(
            self,
            FieldUpdate::DescriptionLabel(..) | FieldUpdate::DescriptionValue(..)
        )
    }
}

/// One tracked background operation.
pub struct Job {
    id: JobId,
    address: String,
    state: JobState,
    fields: FieldStore,
    has_details: bool,
    dismissed: bool,
    updated: DateTime<Utc>,
    places: Arc<dyn PlacesLookup>,
    context: Arc<JobContext>,
    sink: Arc<dyn EventSink>,
}

impl Job {
    pub(crate) fn new(
        id: JobId,
        context: Arc<JobContext>,
        places: Arc<dyn PlacesLookup>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            id,
            address: context.address_for(id),
            state: JobState::Running,
            fields: FieldStore::default(),
            has_details: false,
            dismissed: false,
            updated: (context.clock)(),
            places,
            context,
            sink,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.state == JobState::Stopped
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn has_details(&self) -> bool {
        self.has_details
    }

    pub fn dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub fn pretty_destination(&self) -> String {
        pretty_destination(
            &self.fields,
            self.places.as_ref(),
            self.context.home_dir.as_deref(),
        )
    }

    pub fn display_text(&self) -> String {
        display_text(
            &self.fields,
            &self.pretty_destination(),
            self.context.messages.as_ref(),
        )
    }

    /// Applies one field update and reports whether anything changed.
    pub fn apply_field(&mut self, update: FieldUpdate) -> bool {
        let changed = self.apply_one(update);
        self.update_has_details();
        changed
    }

    /// Like `apply_field` but leaves `has_details` stale until the caller recomputes it.
    fn apply_one(&mut self, update: FieldUpdate) -> bool {
        if self.is_stopped() {
            jobview_debug!("Job {} is stopped, ignoring {:?}", self.id, update);
            return false;
        }
        match update {
            FieldUpdate::Summary(summary) => {
                self.update(Property::Summary, summary, |f| &mut f.summary)
            }
            FieldUpdate::InfoMessage(message) => {
                self.update(Property::InfoMessage, message, |f| &mut f.info_message)
            }
            FieldUpdate::Percent(percent) => {
                if percent > 100 {
                    jobview_debug!("Job {} reported {}%, clamping", self.id, percent);
                }
                self.update(Property::Percentage, percent.min(100), |f| {
                    &mut f.percentage
                })
            }
            FieldUpdate::DestUrl(url) => {
                let url = url.map(strip_trailing_slash);
                self.update(Property::DestUrl, url, |f| &mut f.dest_url)
            }
            FieldUpdate::Speed(speed) => self.update(Property::Speed, speed, |f| &mut f.speed),
            FieldUpdate::Processed(unit, amount) => {
                self.update(Property::ProcessedAmount(unit), amount, |f| {
                    f.processed.slot_mut(unit)
                })
            }
            FieldUpdate::Total(unit, amount) => {
                self.update(Property::TotalAmount(unit), amount, |f| f.total.slot_mut(unit))
            }
            FieldUpdate::DescriptionLabel(slot, label) => {
                self.update(Property::DescriptionLabel(slot), label, |f| {
                    &mut f.description_mut(slot).label
                })
            }
            FieldUpdate::DescriptionValue(slot, value) => {
                self.update(Property::DescriptionValue(slot), value, |f| {
                    &mut f.description_mut(slot).value
                })
            }
            FieldUpdate::Suspended(suspended) => self.set_state(if suspended {
                JobState::Suspended
            } else {
                JobState::Running
            }),
            FieldUpdate::Error(code) => self.update(Property::Error, code, |f| &mut f.error),
        }
    }

    pub fn set_total_amount(&mut self, amount: u64, unit: &str) {
        match Unit::parse(unit) {
            Some(unit) => {
                self.apply_field(FieldUpdate::Total(unit, amount));
            }
            None => jobview_debug!("Job {} ignoring total amount in unit {:?}", self.id, unit),
        }
    }

    pub fn set_processed_amount(&mut self, amount: u64, unit: &str) {
        match Unit::parse(unit) {
            Some(unit) => {
                self.apply_field(FieldUpdate::Processed(unit, amount));
            }
            None => {
                jobview_debug!("Job {} ignoring processed amount in unit {:?}", self.id, unit)
            }
        }
    }

    pub fn set_percent(&mut self, percent: u32) {
        self.apply_field(FieldUpdate::Percent(percent));
    }

    pub fn set_speed(&mut self, bytes_per_second: u64) {
        self.apply_field(FieldUpdate::Speed(bytes_per_second));
    }

    pub fn set_summary(&mut self, summary: &str) {
        self.apply_field(FieldUpdate::Summary(summary.to_string()));
    }

    pub fn set_info_message(&mut self, message: &str) {
        self.apply_field(FieldUpdate::InfoMessage(message.to_string()));
    }

    /// Sets a description pair; empty strings clear it. Numbers other than 0 and 1 are ignored.
    pub fn set_description_field(&mut self, number: u32, label: &str, value: &str) {
        let Some(slot) = Slot::from_index(number) else {
            jobview_debug!("Job {} ignoring description field {}", self.id, number);
            return;
        };
        let mut dirty = self.apply_one(FieldUpdate::DescriptionLabel(slot, label.to_string()));
        dirty |= self.apply_one(FieldUpdate::DescriptionValue(slot, value.to_string()));
        if dirty {
            self.emit_changed(Property::DescriptionUrl);
            self.update_has_details();
        }
    }

    pub fn clear_description_field(&mut self, number: u32) {
        self.set_description_field(number, "", "");
    }

    pub fn set_dest_url(&mut self, url: Option<Url>) {
        self.apply_field(FieldUpdate::DestUrl(url));
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        self.apply_field(FieldUpdate::Suspended(suspended));
    }

    pub fn set_error(&mut self, code: u32) {
        self.apply_field(FieldUpdate::Error(code));
    }

    /// Presentation-layer flag, e.g. when the job was hidden into history.
    pub fn set_dismissed(&mut self, dismissed: bool) {
        self.dismissed = dismissed;
    }

    /// Applies every recognized key of a batched update; absent keys stay untouched.
    pub fn apply_properties(&mut self, properties: &Properties) {
        let mut description_dirty = false;
        for (key, value) in properties {
            match FieldUpdate::from_property(key, value) {
                Some(update) => {
                    let touches_description = update.touches_description();
                    if self.apply_one(update) && touches_description {
                        description_dirty = true;
                    }
                }
                None => jobview_debug!(
                    "Job {} ignoring property {:?} = {:?}",
                    self.id,
                    key,
                    value
                ),
            }
        }
        if description_dirty {
            self.emit_changed(Property::DescriptionUrl);
        }
        self.update_has_details();
    }

    /// Stops the job and finishes it. Returns `None` if it was already stopped.
    pub fn terminate(
        &mut self,
        error_code: Option<u32>,
        error_message: &str,
        hints: &Properties,
    ) -> Option<Finish> {
        if self.is_stopped() {
            jobview_debug!("Job {} terminated twice, ignoring", self.id);
            return None;
        }
        if !hints.is_empty() {
            jobview_trace!("Job {} terminate hints {:?}", self.id, hints);
        }
        if let Some(code) = error_code {
            self.set_error(code);
        }
        self.update(Property::ErrorText, error_message.to_string(), |f| {
            &mut f.error_text
        });
        self.set_state(JobState::Stopped);
        Some(self.finish())
    }

    fn finish(&mut self) -> Finish {
        self.sink.emit(JobEvent::AddressUnregistered {
            job_id: self.id,
            address: self.address.clone(),
        });

        if self.fields.error == USER_CANCELED {
            self.sink.emit(JobEvent::Closed { job_id: self.id });
            return Finish::Closed;
        }

        self.updated = (self.context.clock)();
        self.dismissed = false;
        self.sink.emit(JobEvent::Resurfaced { job_id: self.id });
        Finish::Resurfaced
    }

    fn set_state(&mut self, state: JobState) -> bool {
        if self.is_stopped() {
            return false;
        }
        let changed = set_if_changed(&mut self.state, state);
        if changed {
            self.emit_changed(Property::State);
        }
        changed
    }

    fn update_has_details(&mut self) {
        let has_details = self.fields.has_details();
        if set_if_changed(&mut self.has_details, has_details) {
            self.emit_changed(Property::HasDetails);
        }
    }

    fn update<T: PartialEq>(
        &mut self,
        property: Property,
        value: T,
        field: impl FnOnce(&mut FieldStore) -> &mut T,
    ) -> bool {
        let changed = set_if_changed(field(&mut self.fields), value);
        if changed {
            self.emit_changed(property);
        }
        changed
    }

    fn emit_changed(&self, property: Property) {
        self.sink.emit(JobEvent::Changed {
            job_id: self.id,
            property,
        });
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("address", &self.address)
            .field("state", &self.state)
            .field("fields", &self.fields)
            .field("has_details", &self.has_details)
            .field("dismissed", &self.dismissed)
            .field("updated", &self.updated)
            .finish_non_exhaustive()
    }
}
