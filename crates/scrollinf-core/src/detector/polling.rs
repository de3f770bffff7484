use std::rc::{Rc, Weak};

use super::{ProximityDetector, ProximitySignal};
use crate::config::{EngineConfig, ScrollContainer};
use crate::debounce::Debouncer;
use crate::error::HostError;
use crate::geometry::is_near_end;
use crate::platform::ScrollHost;

/// Listens to scroll events and compares geometry against the threshold.
///
/// Scroll events go through a trailing-edge [`Debouncer`]; the geometry check
/// runs once the delay has elapsed without another event. The debounced
/// handler is also invoked once on attach so content that is already short
/// enough gets a signal without any user scroll.
pub struct PollingDetector<H: ScrollHost> {
    host: Rc<H>,
    container: ScrollContainer<H::Element>,
    listener: Option<H::Listener>,
    debouncer: Rc<Debouncer<H>>,
}

impl<H: ScrollHost> ProximityDetector<H> for PollingDetector<H> {
    fn attach(
        host: &Rc<H>,
        config: &EngineConfig<H::Element>,
        on_proximity: ProximitySignal,
    ) -> Result<Self, HostError> {
        let check: Rc<dyn Fn()> = {
            let host: Weak<H> = Rc::downgrade(host);
            let container = config.container.clone();
            let axis = config.axis;
            let threshold = config.threshold;
            Rc::new(move || {
                let Some(host) = host.upgrade() else {
                    return;
                };
                let metrics = host.scroll_metrics(&container, axis);
                if is_near_end(&metrics, threshold) {
                    log::trace!("near end ({} px remaining)", metrics.remaining());
                    on_proximity();
                }
            })
        };

        let debouncer = Rc::new(Debouncer::new(Rc::clone(host), config.rate_limit_delay_ms));
        let handler: Rc<dyn Fn()> = {
            let debouncer = Rc::downgrade(&debouncer);
            Rc::new(move || {
                if let Some(debouncer) = debouncer.upgrade() {
                    let check = Rc::clone(&check);
                    debouncer.schedule(move || check());
                }
            })
        };

        let listener = host.listen_scroll(&config.container, Rc::clone(&handler))?;
        log::debug!(
            "polling detector attached ({} axis, threshold {}px, delay {}ms)",
            config.axis,
            config.threshold,
            config.rate_limit_delay_ms
        );

        handler();

        Ok(Self {
            host: Rc::clone(host),
            container: config.container.clone(),
            listener: Some(listener),
            debouncer,
        })
    }

    fn detach(&mut self) {
        self.debouncer.cancel();
        if let Some(listener) = self.listener.take() {
            self.host.unlisten_scroll(&self.container, listener);
            log::debug!("polling detector detached");
        }
    }

    fn is_attached(&self) -> bool {
        self.listener.is_some()
    }
}

impl<H: ScrollHost> Drop for PollingDetector<H> {
    fn drop(&mut self) {
        self.detach();
    }
}
