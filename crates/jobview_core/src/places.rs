//! Bookmarked places and the process-wide shared lookup over them.
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use jobview_logging::jobview_debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fields::strip_trailing_slash;

/// Resolves a location to the friendly name of a known place.
pub trait PlacesLookup: Send + Sync {
    fn resolve(&self, url: &Url) -> Option<String>;
}

/// A named, user-bookmarked location such as "Downloads".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub url: Url,
    #[serde(default)]
    pub hidden: bool,
}

impl Place {
    pub fn new(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Ordered list of places; the first visible match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacesModel {
    places: Vec<Place>,
}

impl PlacesModel {
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }
}

impl PlacesLookup for PlacesModel {
    fn resolve(&self, url: &Url) -> Option<String> {
        let wanted = strip_trailing_slash(url.clone());
        self.places
            .iter()
            .filter(|place| !place.hidden)
            .find(|place| strip_trailing_slash(place.url.clone()) == wanted)
            .map(|place| place.name.clone())
    }
}

pub type PlacesFactory = Box<dyn Fn() -> Arc<dyn PlacesLookup> + Send + Sync>;

/// Hands out one live lookup instance at a time.
///
/// Only a weak handle is retained here: the instance is dropped together with
/// the last job holding it, and the next `acquire` builds a fresh one.
pub struct SharedPlaces {
    factory: PlacesFactory,
    instance: Mutex<Option<Weak<dyn PlacesLookup>>>,
}

impl SharedPlaces {
    pub fn new(factory: PlacesFactory) -> Self {
        Self {
            factory,
            instance: Mutex::new(None),
        }
    }

    /// Convenience constructor sharing a fixed list of places.
    pub fn from_places(places: Vec<Place>) -> Self {
        Self::new(Box::new(move || {
            Arc::new(PlacesModel::new(places.clone())) as Arc<dyn PlacesLookup>
        }))
    }

    pub fn acquire(&self) -> Arc<dyn PlacesLookup> {
        // Held across construction so two first acquires cannot both build.
        let mut slot = self.instance.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(live) = slot.as_ref().and_then(Weak::upgrade) {
            return live;
        }
        jobview_debug!("Constructing shared places lookup");
        let fresh = (self.factory)();
        *slot = Some(Arc::downgrade(&fresh));
        fresh
    }

    pub fn is_live(&self) -> bool {
        self.instance
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|weak| weak.strong_count() > 0)
    }
}

impl Default for SharedPlaces {
    fn default() -> Self {
        Self::from_places(Vec::new())
    }
}

impl fmt::Debug for SharedPlaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedPlaces")
            .field("live", &self.is_live())
            .finish_non_exhaustive()
    }
}
