use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use chrono::{DateTime, TimeZone, Utc};
use jobview_core::{
    Call, Dispatch, JobContext, JobEvent, JobRegistry, JobState, LegacyCall, PlacesLookup,
    PlacesModel, Properties, RegistryError, SharedPlaces, USER_CANCELED,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobview_logging::initialize_for_tests);
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn finished_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

/// Registry whose clock returns `created_at` first and `finished_at` afterwards.
fn registry() -> JobRegistry {
    init_logging();
    let ticks = Arc::new(AtomicUsize::new(0));
    let context = JobContext {
        jobs_root: "/jobs".to_string(),
        home_dir: Some(PathBuf::from("/home/user")),
        clock: Arc::new(move || {
            if ticks.fetch_add(1, Ordering::SeqCst) == 0 {
                created_at()
            } else {
                finished_at()
            }
        }),
        ..JobContext::default()
    };
    JobRegistry::new(context, Arc::new(SharedPlaces::default()))
}

fn lifecycle_events(registry: &JobRegistry) -> Vec<JobEvent> {
    registry
        .drain_events()
        .into_iter()
        .filter(|event| !matches!(event, JobEvent::Changed { .. }))
        .collect()
}

fn terminate(code: u32, message: &str) -> Call {
    Call::Terminate {
        error_code: code,
        error_message: message.to_string(),
        hints: Properties::new(),
    }
}

#[test]
fn create_assigns_deterministic_address() {
    let mut registry = registry();
    let job = registry.create(42).unwrap();
    assert_eq!(job.address(), "/jobs/JobView_42");
    assert_eq!(job.state(), JobState::Running);
    assert_eq!(job.updated(), created_at());

    assert_eq!(
        lifecycle_events(&registry),
        vec![JobEvent::AddressRegistered {
            job_id: 42,
            address: "/jobs/JobView_42".to_string(),
        }]
    );
}

#[test]
fn duplicate_ids_are_rejected() {
    let mut registry = registry();
    registry.create(1).unwrap();
    assert_eq!(registry.create(1).unwrap_err(), RegistryError::DuplicateId(1));
    assert_eq!(registry.len(), 1);
}

#[test]
fn unknown_ids_are_a_noop() {
    let mut registry = registry();
    assert!(matches!(
        registry.dispatch_legacy(9, LegacyCall::SetPercent(10)),
        Dispatch::UnknownJob
    ));
    assert!(matches!(registry.dispatch(9, terminate(0, "")), Dispatch::UnknownJob));
    assert_eq!(registry.get(9).unwrap_err(), RegistryError::NotFound(9));
    assert!(registry.drain_events().is_empty());
}

#[test]
fn user_cancel_closes_without_resurfacing() {
    let mut registry = registry();
    registry.create(3).unwrap();
    registry.drain_events();

    let finished = registry.dispatch(3, terminate(USER_CANCELED, "Canceled"));
    assert!(matches!(finished, Dispatch::Finished(None)));
    assert!(registry.is_empty());
    assert_eq!(
        lifecycle_events(&registry),
        vec![
            JobEvent::AddressUnregistered {
                job_id: 3,
                address: "/jobs/JobView_3".to_string(),
            },
            JobEvent::Closed { job_id: 3 },
        ]
    );

    // Address is gone: further updates do not reach anything.
    assert!(matches!(
        registry.dispatch_legacy(3, LegacyCall::SetPercent(50)),
        Dispatch::UnknownJob
    ));
}

#[test]
fn legacy_cancel_uses_previously_set_error() {
    let mut registry = registry();
    registry.create(4).unwrap();
    registry.dispatch_legacy(4, LegacyCall::SetError(USER_CANCELED));

    let finished = registry.dispatch_legacy(
        4,
        LegacyCall::Terminate {
            error_message: String::new(),
        },
    );
    assert!(matches!(finished, Dispatch::Finished(None)));
}

#[test]
fn other_terminations_resurface_exactly_once() {
    let mut registry = registry();
    let job = registry.create(5).unwrap();
    job.set_dismissed(true);
    registry.drain_events();

    let finished = registry.dispatch(5, terminate(0, ""));
    let job = match finished {
        Dispatch::Finished(Some(job)) => job,
        other => panic!("expected finished job, got {other:?}"),
    };
    assert_eq!(job.state(), JobState::Stopped);
    assert!(!job.dismissed());
    assert_eq!(job.updated(), finished_at());

    let events = lifecycle_events(&registry);
    assert_eq!(
        events,
        vec![
            JobEvent::AddressUnregistered {
                job_id: 5,
                address: "/jobs/JobView_5".to_string(),
            },
            JobEvent::Resurfaced { job_id: 5 },
        ]
    );
}

#[test]
fn stopped_jobs_stay_readable_but_frozen() {
    let mut registry = registry();
    registry.create(6).unwrap();
    registry.dispatch_legacy(6, LegacyCall::SetPercent(30));

    let mut job = match registry.dispatch(6, terminate(100, "Disk full")) {
        Dispatch::Finished(Some(job)) => job,
        other => panic!("expected finished job, got {other:?}"),
    };
    registry.drain_events();

    job.set_percent(90);
    job.set_suspended(false);
    assert_eq!(job.fields().percentage, 30);
    assert_eq!(job.fields().error, 100);
    assert_eq!(job.fields().error_text, "Disk full");
    assert_eq!(job.state(), JobState::Stopped);
    assert_eq!(job.terminate(Some(0), "", &Properties::new()), None);
    assert!(registry.drain_events().is_empty());
}

#[test]
fn places_lookup_is_shared_and_released_with_the_last_job() {
    init_logging();
    let built = Arc::new(AtomicUsize::new(0));
    let counter = built.clone();
    let places = Arc::new(SharedPlaces::new(Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(PlacesModel::default()) as Arc<dyn PlacesLookup>
    })));
    let mut registry = JobRegistry::new(JobContext::default(), places.clone());

    registry.create(1).unwrap();
    registry.create(2).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 1);

    drop(registry.dispatch(1, terminate(USER_CANCELED, "")));
    assert!(places.is_live());
    drop(registry.dispatch(2, terminate(USER_CANCELED, "")));
    assert!(!places.is_live());

    registry.create(3).unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 2);
}

#[test]
fn remove_is_idempotent_and_ids_are_ordered() {
    let mut registry = registry();
    for id in [30, 10, 20] {
        registry.create(id).unwrap();
    }
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![10, 20, 30]);
    assert_eq!(registry.context().jobs_root, "/jobs");
    assert!(matches!(
        registry.try_recv(),
        Some(JobEvent::AddressRegistered { job_id: 30, .. })
    ));

    registry.drain_events();

    assert!(registry.remove(20).is_some());
    assert!(registry.remove(20).is_none());
    assert_eq!(registry.len(), 2);
    assert_eq!(
        lifecycle_events(&registry),
        vec![JobEvent::AddressUnregistered {
            job_id: 20,
            address: "/jobs/JobView_20".to_string(),
        }]
    );
}

#[test]
fn terminate_of_unknown_job_leaves_table_untouched() {
    let mut registry = registry();
    registry.create(1).unwrap();
    registry.drain_events();

    assert!(matches!(registry.dispatch(2, terminate(0, "")), Dispatch::UnknownJob));
    assert!(matches!(
        registry.dispatch_legacy(2, LegacyCall::Terminate { error_message: String::new() }),
        Dispatch::UnknownJob
    ));
    assert_eq!(registry.ids().collect::<Vec<_>>(), vec![1]);
    assert!(registry.drain_events().is_empty());

    assert!(matches!(
        registry.dispatch(1, Call::from(LegacyCall::SetPercent(10))),
        Dispatch::Applied
    ));
    assert_eq!(registry.get(1).unwrap().fields().percentage, 10);
}
