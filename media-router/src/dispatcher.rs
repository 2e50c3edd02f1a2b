//! Deferred, ordered event delivery
//!
//! State transitions append [`RouterEvent`]s to the engine's [`TaskQueue`].
//! Nothing is delivered while the engine is mutating its state; the driver
//! drains the queue later through
//! [`MediaRouterEngine::process_pending`](crate::MediaRouterEngine::process_pending).
//!
//! Each event is first mirrored to the sync sink, when the kind is one the
//! sink cares about, and then offered to every callback registration of every
//! router facade in creation order.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use route_descriptor::{Extras, RouteSelector};
use route_provider::ControlResultCallback;
use tracing::{debug, warn};

use crate::callback::RouterCallback;
use crate::model::{CallbackFlags, Provider, Route};
use crate::router::MediaRouter;
use crate::sync::SyncSink;

// ============================================================================
// Events
// ============================================================================

/// Notification produced by a state transition
#[derive(Debug, Clone)]
pub enum RouterEvent {
    RouteAdded(Route),
    RouteRemoved(Route),
    RouteChanged(Route),
    RouteVolumeChanged(Route),
    RoutePresentationDisplayChanged(Route),
    RouteSelected(Route),
    RouteUnselected(Route),
    ProviderAdded(Provider),
    ProviderRemoved(Provider),
    ProviderChanged(Provider),
}

/// Discriminant of a [`RouterEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    RouteAdded,
    RouteRemoved,
    RouteChanged,
    RouteVolumeChanged,
    RoutePresentationDisplayChanged,
    RouteSelected,
    RouteUnselected,
    ProviderAdded,
    ProviderRemoved,
    ProviderChanged,
}

impl RouterEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RouterEvent::RouteAdded(_) => EventKind::RouteAdded,
            RouterEvent::RouteRemoved(_) => EventKind::RouteRemoved,
            RouterEvent::RouteChanged(_) => EventKind::RouteChanged,
            RouterEvent::RouteVolumeChanged(_) => EventKind::RouteVolumeChanged,
            RouterEvent::RoutePresentationDisplayChanged(_) => {
                EventKind::RoutePresentationDisplayChanged
            }
            RouterEvent::RouteSelected(_) => EventKind::RouteSelected,
            RouterEvent::RouteUnselected(_) => EventKind::RouteUnselected,
            RouterEvent::ProviderAdded(_) => EventKind::ProviderAdded,
            RouterEvent::ProviderRemoved(_) => EventKind::ProviderRemoved,
            RouterEvent::ProviderChanged(_) => EventKind::ProviderChanged,
        }
    }

    /// The route a route-kind event is about
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouterEvent::RouteAdded(route)
            | RouterEvent::RouteRemoved(route)
            | RouterEvent::RouteChanged(route)
            | RouterEvent::RouteVolumeChanged(route)
            | RouterEvent::RoutePresentationDisplayChanged(route)
            | RouterEvent::RouteSelected(route)
            | RouterEvent::RouteUnselected(route) => Some(route),
            _ => None,
        }
    }

    /// The provider a provider-kind event is about
    pub fn provider(&self) -> Option<&Provider> {
        match self {
            RouterEvent::ProviderAdded(provider)
            | RouterEvent::ProviderRemoved(provider)
            | RouterEvent::ProviderChanged(provider) => Some(provider),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::RouteAdded => "route_added",
            EventKind::RouteRemoved => "route_removed",
            EventKind::RouteChanged => "route_changed",
            EventKind::RouteVolumeChanged => "route_volume_changed",
            EventKind::RoutePresentationDisplayChanged => "route_presentation_display_changed",
            EventKind::RouteSelected => "route_selected",
            EventKind::RouteUnselected => "route_unselected",
            EventKind::ProviderAdded => "provider_added",
            EventKind::ProviderRemoved => "provider_removed",
            EventKind::ProviderChanged => "provider_changed",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Task queue
// ============================================================================

/// A unit of deferred work
pub(crate) enum Task {
    Event(RouterEvent),
    /// A control request nobody handled; report the failure to its callback
    ControlRequestFailed(ControlResultCallback),
}

/// FIFO of pending tasks
pub(crate) struct TaskQueue {
    tasks: VecDeque<Task>,
    warning_threshold: usize,
    warned: bool,
}

impl TaskQueue {
    pub(crate) fn new(warning_threshold: usize) -> Self {
        Self {
            tasks: VecDeque::new(),
            warning_threshold,
            warned: false,
        }
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
        if self.tasks.len() > self.warning_threshold && !self.warned {
            warn!(
                pending = self.tasks.len(),
                "Router event queue is growing; is the driver calling process_pending?"
            );
            self.warned = true;
        }
    }

    pub(crate) fn push_events(&mut self, events: Vec<RouterEvent>) {
        for event in events {
            self.push(Task::Event(event));
        }
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        let task = self.tasks.pop_front();
        if self.tasks.is_empty() {
            self.warned = false;
        }
        task
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Queued events, oldest first
    pub(crate) fn events(&self) -> impl Iterator<Item = &RouterEvent> {
        self.tasks.iter().filter_map(|task| match task {
            Task::Event(event) => Some(event),
            Task::ControlRequestFailed(_) => None,
        })
    }
}

// ============================================================================
// Delivery
// ============================================================================

/// One callback registration as seen at delivery time
#[derive(Clone)]
pub(crate) struct RegistrationSnapshot {
    pub(crate) callback: Arc<dyn RouterCallback>,
    pub(crate) selector: RouteSelector,
    pub(crate) flags: CallbackFlags,
}

impl RegistrationSnapshot {
    /// Route events reach a registration when unfiltered or when the route matches
    fn accepts(&self, route: &Route) -> bool {
        self.flags.contains(CallbackFlags::UNFILTERED_EVENTS) || route.matches_selector(&self.selector)
    }
}

/// A router facade and its registrations, in registration order
pub(crate) struct DeliveryTarget {
    pub(crate) router: MediaRouter,
    pub(crate) registrations: Vec<RegistrationSnapshot>,
}

/// Run one task against the targets captured for it
pub(crate) fn run_task(task: Task, sink: Option<&dyn SyncSink>, targets: &[DeliveryTarget]) {
    match task {
        Task::Event(event) => deliver_event(&event, sink, targets),
        Task::ControlRequestFailed(callback) => callback.on_error(None, Extras::new()),
    }
}

fn deliver_event(event: &RouterEvent, sink: Option<&dyn SyncSink>, targets: &[DeliveryTarget]) {
    if let Some(sink) = sink {
        mirror_to_sink(sink, event);
    }

    for target in targets {
        for registration in &target.registrations {
            invoke(&target.router, registration, event);
        }
    }
}

fn mirror_to_sink(sink: &dyn SyncSink, event: &RouterEvent) {
    let result = match event {
        RouterEvent::RouteAdded(route) => sink.on_sync_route_added(route),
        RouterEvent::RouteRemoved(route) => sink.on_sync_route_removed(route),
        RouterEvent::RouteChanged(route) => sink.on_sync_route_changed(route),
        RouterEvent::RouteSelected(route) => sink.on_sync_route_selected(route),
        _ => return,
    };
    if let Err(e) = result {
        debug!(kind = %event.kind(), error = %e, "Sync sink failed; ignoring");
    }
}

fn invoke(router: &MediaRouter, registration: &RegistrationSnapshot, event: &RouterEvent) {
    let callback = registration.callback.as_ref();

    if let Some(route) = event.route() {
        if !registration.accepts(route) {
            return;
        }
        match event {
            RouterEvent::RouteAdded(_) => callback.on_route_added(router, route),
            RouterEvent::RouteRemoved(_) => callback.on_route_removed(router, route),
            RouterEvent::RouteChanged(_) => callback.on_route_changed(router, route),
            RouterEvent::RouteVolumeChanged(_) => callback.on_route_volume_changed(router, route),
            RouterEvent::RoutePresentationDisplayChanged(_) => {
                callback.on_route_presentation_display_changed(router, route)
            }
            RouterEvent::RouteSelected(_) => callback.on_route_selected(router, route),
            RouterEvent::RouteUnselected(_) => callback.on_route_unselected(router, route),
            _ => {}
        }
        return;
    }

    match event {
        RouterEvent::ProviderAdded(provider) => callback.on_provider_added(router, provider),
        RouterEvent::ProviderRemoved(provider) => callback.on_provider_removed(router, provider),
        RouterEvent::ProviderChanged(provider) => callback.on_provider_changed(router, provider),
        _ => {}
    }
}
