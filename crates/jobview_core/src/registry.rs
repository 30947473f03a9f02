use std::collections::BTreeMap;
use std::sync::{mpsc, Arc};

use jobview_logging::{jobview_debug, jobview_warn};
use thiserror::Error;

use crate::context::JobContext;
use crate::event::{ChannelEventSink, EventSink, JobEvent};
use crate::job::{Finish, Job, JobId};
use crate::places::SharedPlaces;
use crate::protocol::{Call, LegacyCall};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("job {0} is already registered")]
    DuplicateId(JobId),
    #[error("no job registered with id {0}")]
    NotFound(JobId),
}

/// Result of routing a protocol call to a job.
#[derive(Debug)]
pub enum Dispatch {
    Applied,
    /// The call terminated the job, which is no longer registered.
    /// Carries the job unless the user canceled it.
    Finished(Option<Job>),
    UnknownJob,
}

/// Table of live, remotely addressable jobs.
pub struct JobRegistry {
    jobs: BTreeMap<JobId, Job>,
    context: Arc<JobContext>,
    places: Arc<SharedPlaces>,
    sink: Arc<dyn EventSink>,
    event_rx: mpsc::Receiver<JobEvent>,
}

impl JobRegistry {
    pub fn new(context: JobContext, places: Arc<SharedPlaces>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self {
            jobs: BTreeMap::new(),
            context: Arc::new(context),
            places,
            sink: Arc::new(ChannelEventSink::new(event_tx)),
            event_rx,
        }
    }

    pub fn context(&self) -> &JobContext {
        &self.context
    }

    pub fn create(&mut self, id: JobId) -> Result<&mut Job, RegistryError> {
        if self.jobs.contains_key(&id) {
            jobview_warn!("Refusing to register duplicate job {}", id);
            return Err(RegistryError::DuplicateId(id));
        }
        let job = Job::new(
            id,
            self.context.clone(),
            self.places.acquire(),
            self.sink.clone(),
        );
        jobview_debug!("Registered job {} at {}", id, job.address());
        self.sink.emit(JobEvent::AddressRegistered {
            job_id: id,
            address: job.address().to_string(),
        });
        Ok(self.jobs.entry(id).or_insert(job))
    }

    pub fn get(&self, id: JobId) -> Result<&Job, RegistryError> {
        self.jobs.get(&id).ok_or(RegistryError::NotFound(id))
    }

    pub fn get_mut(&mut self, id: JobId) -> Result<&mut Job, RegistryError> {
        self.jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))
    }

    /// Forgets a job without finishing it. Removing an unknown id is a no-op.
    ///
    /// A job that was still running loses its address, so `AddressUnregistered` is emitted.
    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let job = self.jobs.remove(&id)?;
        if !job.is_stopped() {
            jobview_debug!("Removing live job {}", id);
            self.sink.emit(JobEvent::AddressUnregistered {
                job_id: id,
                address: job.address().to_string(),
            });
        }
        Some(job)
    }

    pub fn dispatch_legacy(&mut self, id: JobId, call: LegacyCall) -> Dispatch {
        let terminating = call.is_terminate();
        self.route(id, terminating, |job| job.handle_legacy(call))
    }

    pub fn dispatch(&mut self, id: JobId, call: Call) -> Dispatch {
        let terminating = call.is_terminate();
        self.route(id, terminating, |job| job.handle(call))
    }

    /// Terminating calls take the job out of the table before it finishes, so the
    /// finish callbacks never observe it as registered.
    fn route(
        &mut self,
        id: JobId,
        terminating: bool,
        apply: impl FnOnce(&mut Job) -> Option<Finish>,
    ) -> Dispatch {
        if !terminating {
            let Some(job) = self.jobs.get_mut(&id) else {
                jobview_warn!("Update for unknown job {}, ignoring", id);
                return Dispatch::UnknownJob;
            };
            apply(job);
            return Dispatch::Applied;
        }

        let Some(mut job) = self.jobs.remove(&id) else {
            jobview_warn!("Termination of unknown job {}, ignoring", id);
            return Dispatch::UnknownJob;
        };
        let Some(finish) = apply(&mut job) else {
            self.jobs.insert(id, job);
            return Dispatch::Applied;
        };
        jobview_debug!("Job {} finished: {:?}", id, finish);
        match finish {
            Finish::Closed => Dispatch::Finished(None),
            Finish::Resurfaced => Dispatch::Finished(Some(job)),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = JobId> + '_ {
        self.jobs.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn try_recv(&self) -> Option<JobEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn drain_events(&self) -> Vec<JobEvent> {
        self.event_rx.try_iter().collect()
    }
}
