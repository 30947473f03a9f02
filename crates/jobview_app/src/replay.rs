use std::sync::Arc;

use jobview_core::{Dispatch, Job, JobEvent, JobId, JobRegistry, SharedPlaces};
use jobview_logging::{jobview_debug, jobview_info, jobview_warn};

use crate::config::{AppConfig, Step};

/// Finished jobs handed back by the registry, newest last.
#[derive(Debug, Default)]
pub struct History {
    pub finished: Vec<Job>,
}

/// Replays `steps` against a fresh registry and returns one status line per step.
pub fn run(config: &AppConfig, steps: Vec<Step>) -> (Vec<String>, History) {
    let places = Arc::new(SharedPlaces::from_places(config.places.clone()));
    let mut registry = JobRegistry::new(config.job_context(), places);
    let mut history = History::default();
    let mut lines = Vec::with_capacity(steps.len());

    for step in steps {
        let (id, dispatch) = match step {
            Step::Create(id) => {
                if let Err(err) = registry.create(id) {
                    jobview_warn!("{}", err);
                }
                (id, Dispatch::Applied)
            }
            Step::Legacy { job, call } => (job, registry.dispatch_legacy(job, call)),
            Step::Call { job, call } => (job, registry.dispatch(job, call)),
            Step::Dismiss(id) => {
                dismiss(&mut registry, &mut history, id);
                (id, Dispatch::Applied)
            }
        };
        log_events(&registry);
        lines.push(status_line(&registry, &mut history, id, dispatch));
    }

    (lines, history)
}

fn dismiss(registry: &mut JobRegistry, history: &mut History, id: JobId) {
    if let Ok(job) = registry.get_mut(id) {
        job.set_dismissed(true);
    } else if let Some(job) = history.finished.iter_mut().find(|job| job.id() == id) {
        job.set_dismissed(true);
    }
}

fn status_line(
    registry: &JobRegistry,
    history: &mut History,
    id: JobId,
    dispatch: Dispatch,
) -> String {
    match dispatch {
        Dispatch::Applied => match registry.get(id) {
            Ok(job) => format!("{id} [{:?}] {}", job.state(), job.display_text()),
            Err(err) => format!("{id} {err}"),
        },
        Dispatch::Finished(Some(job)) => {
            let line = format!(
                "{id} [finished {}] {}",
                job.updated().to_rfc3339(),
                job.display_text()
            );
            history.finished.push(job);
            line
        }
        Dispatch::Finished(None) => format!("{id} [closed]"),
        Dispatch::UnknownJob => format!("{id} [unknown job]"),
    }
}

fn log_events(registry: &JobRegistry) {
    for event in registry.drain_events() {
        match event {
            JobEvent::Changed { job_id, property } => {
                jobview_debug!("job {} changed {:?}", job_id, property)
            }
            other => jobview_info!("{:?}", other),
        }
    }
}
