//! Jobview core: in-memory model of remotely reported background jobs.
mod context;
mod destination;
mod event;
mod fields;
mod job;
mod places;
mod properties;
mod protocol;
mod registry;
mod text;

pub use context::{Clock, JobContext, DEFAULT_JOBS_ROOT};
pub use destination::pretty_destination;
pub use event::{ChannelEventSink, EventSink, JobEvent, Property};
pub use fields::{
    local_file_or_url, set_if_changed, Amounts, Description, FieldStore, Slot, Unit,
};
pub use job::{FieldUpdate, Finish, Job, JobId, JobState, USER_CANCELED};
pub use places::{Place, PlacesFactory, PlacesLookup, PlacesModel, SharedPlaces};
pub use properties::{Properties, PropertyValue};
pub use protocol::{Call, LegacyCall};
pub use registry::{Dispatch, JobRegistry, RegistryError};
pub use text::{display_text, substitute, EnglishMessages, MessageFormatter, MessageId};
