use std::path::Path;

use url::Url;

use crate::fields::{local_file_or_url, remove_file_name, FieldStore, Slot};
use crate::places::PlacesLookup;

/// Best user-facing string for where the job's files are going.
///
/// Precedence: place name, then a local path with the home directory shown as
/// `~`, then the URL without credentials. Empty when no destination is known.
pub fn pretty_destination(
    fields: &FieldStore,
    places: &dyn PlacesLookup,
    home_dir: Option<&Path>,
) -> String {
    let url = fields.dest_url.clone().or_else(|| {
        // A single file without destination usually carries it in the second description.
        if fields.total.files == 1 {
            local_file_or_url(&fields.description(Slot::Second).value).map(remove_file_name)
        } else {
            None
        }
    });
    let Some(url) = url else {
        return String::new();
    };

    if let Some(name) = places.resolve(&url) {
        return name;
    }

    if url.scheme() == "file" {
        if let Ok(path) = url.to_file_path() {
            return home_relative(&path, home_dir);
        }
    }

    display_without_user_info(url)
}

fn home_relative(path: &Path, home_dir: Option<&Path>) -> String {
    match home_dir.and_then(|home| path.strip_prefix(home).ok()) {
        Some(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Some(rest) => format!("~/{}", trim_trailing_slash(&rest.display().to_string())),
        None => trim_trailing_slash(&path.display().to_string()).to_string(),
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

fn display_without_user_info(mut url: Url) -> String {
    // Fails only for URLs that cannot carry credentials in the first place.
    let _ = url.set_username("");
    let _ = url.set_password(None);
    urlencoding::decode(url.as_str())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| url.to_string())
}
