use std::rc::Rc;

use super::{ProximityDetector, ProximitySignal};
use crate::config::EngineConfig;
use crate::error::HostError;
use crate::platform::{MarkerVisibility, ScrollHost};

/// Watches an invisible marker at the trailing edge of the container.
///
/// Every intersecting entry of a notification batch emits one signal; the
/// engine's re-entrancy guard absorbs the duplicates.
pub struct ObserverDetector<H: ScrollHost> {
    host: Rc<H>,
    marker: Option<H::Marker>,
    observer: Option<H::Observer>,
}

impl<H: ScrollHost> ProximityDetector<H> for ObserverDetector<H> {
    fn attach(
        host: &Rc<H>,
        config: &EngineConfig<H::Element>,
        on_proximity: ProximitySignal,
    ) -> Result<Self, HostError> {
        let marker = host.insert_marker(&config.container)?;

        let callback = Box::new(move |entries: &[MarkerVisibility]| {
            for entry in entries.iter().filter(|entry| entry.is_intersecting) {
                log::trace!("marker visible (ratio {})", entry.intersection_ratio);
                on_proximity();
            }
        });

        let observer = match host.observe_marker(&marker, &config.container, &config.margin, callback)
        {
            Ok(observer) => observer,
            Err(err) => {
                host.remove_marker(marker);
                return Err(err);
            }
        };

        log::debug!(
            "observer detector attached (margin {:?}, viewport root: {})",
            config.margin,
            config.container.is_viewport()
        );

        Ok(Self {
            host: Rc::clone(host),
            marker: Some(marker),
            observer: Some(observer),
        })
    }

    fn detach(&mut self) {
        if let Some(observer) = self.observer.take() {
            self.host.disconnect_observer(observer);
        }
        if let Some(marker) = self.marker.take() {
            self.host.remove_marker(marker);
            log::debug!("observer detector detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.observer.is_some()
    }
}

impl<H: ScrollHost> Drop for ObserverDetector<H> {
    fn drop(&mut self) {
        self.detach();
    }
}
