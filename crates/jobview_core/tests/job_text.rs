use std::path::PathBuf;
use std::sync::{Arc, Once};

use jobview_core::{
    Call, Dispatch, JobContext, JobRegistry, MessageFormatter, MessageId, Place, Properties,
    PropertyValue, SharedPlaces,
};
use url::Url;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(jobview_logging::initialize_for_tests);
}

fn registry_with_places(places: Vec<Place>) -> JobRegistry {
    init_logging();
    let context = JobContext {
        jobs_root: "/jobs".to_string(),
        home_dir: Some(PathBuf::from("/home/user")),
        ..JobContext::default()
    };
    JobRegistry::new(context, Arc::new(SharedPlaces::from_places(places)))
}

fn documents_place() -> Place {
    Place::new(
        "Documents",
        Url::parse("file:///home/user/Documents").unwrap(),
    )
}

fn update(registry: &mut JobRegistry, id: u32, entries: &[(&str, PropertyValue)]) {
    let properties: Properties = entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();
    registry.dispatch(id, Call::Update(properties));
}

#[test]
fn processed_files_to_home_relative_destination() {
    let mut registry = registry_with_places(Vec::new());
    registry.create(1).unwrap();
    update(
        &mut registry,
        1,
        &[
            ("processedFiles", PropertyValue::from(3u64)),
            ("destUrl", PropertyValue::from("file:///home/user/Downloads/")),
        ],
    );

    assert_eq!(registry.get(1).unwrap().display_text(), "3 files to ~/Downloads");
}

#[test]
fn processed_of_total_to_place() {
    let mut registry = registry_with_places(vec![documents_place()]);
    registry.create(2).unwrap();
    update(
        &mut registry,
        2,
        &[
            ("totalFiles", PropertyValue::from(5u64)),
            ("processedFiles", PropertyValue::from(2u64)),
            ("destUrl", PropertyValue::from("file:///home/user/Documents/")),
        ],
    );

    let job = registry.get(2).unwrap();
    assert_eq!(job.pretty_destination(), "Documents");
    assert_eq!(job.display_text(), "2 of 5 files to Documents");
}

#[test]
fn single_file_without_destination_shows_file_name() {
    let mut registry = registry_with_places(Vec::new());
    registry.create(3).unwrap();
    update(
        &mut registry,
        3,
        &[
            ("totalFiles", PropertyValue::from(1u64)),
            ("descriptionValue1", PropertyValue::from("/home/user/report.pdf")),
        ],
    );

    assert_eq!(registry.get(3).unwrap().display_text(), "report.pdf");
}

#[test]
fn single_file_destination_comes_from_second_description() {
    let mut registry = registry_with_places(Vec::new());
    registry.create(4).unwrap();
    update(
        &mut registry,
        4,
        &[
            ("totalFiles", PropertyValue::from(1u64)),
            ("descriptionValue2", PropertyValue::from("/home/user/report.pdf")),
        ],
    );

    assert_eq!(registry.get(4).unwrap().display_text(), "report.pdf to ~");
}

#[test]
fn error_text_takes_precedence() {
    let mut registry = registry_with_places(Vec::new());
    registry.create(5).unwrap();
    update(&mut registry, 5, &[("infoMessage", PropertyValue::from("I"))]);
    assert_eq!(registry.get(5).unwrap().display_text(), "I");

    let finished = registry.dispatch(
        5,
        Call::Terminate {
            error_code: 2,
            error_message: "E".to_string(),
            hints: Properties::new(),
        },
    );
    match finished {
        Dispatch::Finished(Some(job)) => assert_eq!(job.display_text(), "E"),
        other => panic!("expected job to be handed back, got {other:?}"),
    }
}

#[test]
fn nothing_known_yields_empty_text() {
    let mut registry = registry_with_places(Vec::new());
    let job = registry.create(6).unwrap();
    assert_eq!(job.display_text(), "");
}

struct Shouting;

impl MessageFormatter for Shouting {
    fn format(&self, id: MessageId, count: Option<u64>, args: &[String]) -> String {
        format!("{id:?}/{count:?}/{}", args.join("|"))
    }
}

#[test]
fn custom_formatter_receives_template_count_and_arguments() {
    init_logging();
    let context = JobContext {
        home_dir: None,
        messages: Arc::new(Shouting),
        ..JobContext::default()
    };
    let mut registry = JobRegistry::new(context, Arc::new(SharedPlaces::default()));
    registry.create(7).unwrap();
    update(
        &mut registry,
        7,
        &[
            ("totalFiles", PropertyValue::from(5u64)),
            ("processedFiles", PropertyValue::from(2u64)),
            ("destUrl", PropertyValue::from("/srv/out")),
        ],
    );

    assert_eq!(
        registry.get(7).unwrap().display_text(),
        "ProcessedOfTotalToDestination/Some(5)/5|2|/srv/out"
    );
}
