//! Route descriptors
//!
//! A [`RouteDescriptor`] is the immutable snapshot a provider reports for one
//! of its routes. The router diffs successive descriptors with the same id to
//! decide which change notifications to send.

use serde::{Deserialize, Serialize};

use crate::control::{ControlFilter, ControlRequest};
use crate::error::{DescriptorError, Result};
use crate::extras::Extras;

/// Where media is rendered when the route is selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaybackType {
    /// Media is played on this device
    #[default]
    Local,
    /// Media is played on a remote device
    Remote,
}

/// Whether the route's volume can be changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeHandling {
    #[default]
    Fixed,
    Variable,
}

/// Default playback stream (the music stream)
pub const DEFAULT_PLAYBACK_STREAM: i32 = 3;

/// Immutable description of a single route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    id: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    enabled: bool,
    connecting: bool,
    #[serde(default)]
    control_filters: Vec<ControlFilter>,
    playback_type: PlaybackType,
    playback_stream: i32,
    volume_handling: VolumeHandling,
    volume: i32,
    volume_max: i32,
    #[serde(default)]
    extras: Extras,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    presentation_display_id: Option<i32>,
}

impl RouteDescriptor {
    /// Start building a descriptor; routes are enabled by default
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> RouteDescriptorBuilder {
        RouteDescriptorBuilder::new(id, name)
    }

    /// Builder seeded with every field of this descriptor
    pub fn to_builder(&self) -> RouteDescriptorBuilder {
        RouteDescriptorBuilder {
            descriptor: self.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }

    pub fn control_filters(&self) -> &[ControlFilter] {
        &self.control_filters
    }

    pub fn playback_type(&self) -> PlaybackType {
        self.playback_type
    }

    pub fn playback_stream(&self) -> i32 {
        self.playback_stream
    }

    pub fn volume_handling(&self) -> VolumeHandling {
        self.volume_handling
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn volume_max(&self) -> i32 {
        self.volume_max
    }

    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    pub fn presentation_display_id(&self) -> Option<i32> {
        self.presentation_display_id
    }

    /// True if any control filter accepts the request
    pub fn supports_control_request(&self, request: &ControlRequest) -> bool {
        self.control_filters.iter().any(|f| f.matches(request))
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check the descriptor for missing id/name
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(DescriptorError::MissingRouteId);
        }
        if self.name.is_empty() {
            return Err(DescriptorError::MissingRouteName(self.id.clone()));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Builder for [`RouteDescriptor`]
#[derive(Debug, Clone)]
pub struct RouteDescriptorBuilder {
    descriptor: RouteDescriptor,
}

impl RouteDescriptorBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            descriptor: RouteDescriptor {
                id: id.into(),
                name: name.into(),
                description: None,
                enabled: true,
                connecting: false,
                control_filters: Vec::new(),
                playback_type: PlaybackType::Remote,
                playback_stream: DEFAULT_PLAYBACK_STREAM,
                volume_handling: VolumeHandling::Fixed,
                volume: 0,
                volume_max: 0,
                extras: Extras::default(),
                presentation_display_id: None,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.descriptor.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = Some(description.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.descriptor.enabled = enabled;
        self
    }

    pub fn connecting(mut self, connecting: bool) -> Self {
        self.descriptor.connecting = connecting;
        self
    }

    pub fn add_control_filter(mut self, filter: ControlFilter) -> Self {
        self.descriptor.control_filters.push(filter);
        self
    }

    pub fn control_filters(mut self, filters: Vec<ControlFilter>) -> Self {
        self.descriptor.control_filters = filters;
        self
    }

    pub fn playback_type(mut self, playback_type: PlaybackType) -> Self {
        self.descriptor.playback_type = playback_type;
        self
    }

    pub fn playback_stream(mut self, stream: i32) -> Self {
        self.descriptor.playback_stream = stream;
        self
    }

    pub fn volume_handling(mut self, handling: VolumeHandling) -> Self {
        self.descriptor.volume_handling = handling;
        self
    }

    pub fn volume(mut self, volume: i32) -> Self {
        self.descriptor.volume = volume;
        self
    }

    pub fn volume_max(mut self, volume_max: i32) -> Self {
        self.descriptor.volume_max = volume_max;
        self
    }

    pub fn extras(mut self, extras: Extras) -> Self {
        self.descriptor.extras = extras;
        self
    }

    pub fn presentation_display_id(mut self, display_id: Option<i32>) -> Self {
        self.descriptor.presentation_display_id = display_id;
        self
    }

    pub fn build(self) -> RouteDescriptor {
        self.descriptor
    }
}
