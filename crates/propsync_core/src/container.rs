//! Ordered registry of properties.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::config::ContainerConfig;
use crate::property::{Permission, Property, WritePolicy};
use crate::record::MapData;
use crate::value::Value;

/// Highest identifier addressable in a light payload.
pub const MAX_LIGHT_IDENTIFIER: u32 = 0xff;

/// Properties of one device, in registration order.
///
/// Registration order is the order in which the encoder scans properties.
pub struct PropertyContainer {
    properties: Vec<Property>,
    clock: Arc<dyn Clock>,
    config: ContainerConfig,
}

impl PropertyContainer {
    /// Creates an empty container.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, ContainerConfig::default())
    }

    /// Creates an empty container with explicit configuration.
    pub fn with_config(clock: Arc<dyn Clock>, config: ContainerConfig) -> Self {
        Self {
            properties: Vec::new(),
            clock,
            config,
        }
    }

    /// The clock shared with every property.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Registers a property with the next free identifier.
    ///
    /// If `name` is already registered the existing property is returned
    /// unchanged.
    pub fn add(
        &mut self,
        name: &str,
        permission: Permission,
        initial: impl Into<Value>,
    ) -> &mut Property {
        let identifier = u32::try_from(self.properties.len() + 1).unwrap_or(u32::MAX);
        self.add_with_identifier(name, permission, initial, identifier)
    }

    /// Registers a property with an explicit identifier.
    pub fn add_with_identifier(
        &mut self,
        name: &str,
        permission: Permission,
        initial: impl Into<Value>,
        identifier: u32,
    ) -> &mut Property {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                if identifier > MAX_LIGHT_IDENTIFIER {
                    warn!(
                        property = name,
                        identifier, "identifier cannot be addressed in light payloads"
                    );
                }
                let mut property = Property::new(name, permission, initial, self.clock.clone());
                property.set_identifier(identifier);
                property.publish_on_change_every(0.0, self.config.default_min_interval_ms);
                debug!(property = name, identifier, "property registered");
                self.properties.push(property);
                self.properties.len() - 1
            }
        };
        &mut self.properties[index]
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|p| p.name() == name)
    }

    /// Looks up a property by name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Looks up a property by name for modification.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name() == name)
    }

    /// Looks up a property by identifier.
    pub fn get_by_identifier(&self, identifier: u32) -> Option<&Property> {
        self.properties.iter().find(|p| p.identifier() == identifier)
    }

    /// Resolves the property part of a light-payload identifier to a name.
    pub fn name_of(&self, light_identifier: u32) -> Option<&str> {
        let id = light_identifier & 0xff;
        self.properties
            .iter()
            .find(|p| p.identifier() & 0xff == id)
            .map(Property::name)
    }

    /// Number of registered properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Iterates mutably in registration order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Property> {
        self.properties.iter_mut()
    }

    /// Property at `index` in registration order.
    pub fn at(&self, index: usize) -> Option<&Property> {
        self.properties.get(index)
    }

    /// Mutable property at `index` in registration order.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Property> {
        self.properties.get_mut(index)
    }

    /// Requests a send of every property on the next pass.
    pub fn request_update_for_all(&mut self) {
        for property in &mut self.properties {
            property.request_update();
        }
    }

    /// Stamps the local change time of every readable property whose value
    /// moved since the previous call.
    ///
    /// Returns the number of properties stamped.
    pub fn update_local_timestamps(&mut self) -> usize {
        let mut stamped = 0;
        for property in &mut self.properties {
            if property.track_local_change() {
                trace!(property = property.name(), "local change recorded");
                stamped += 1;
            }
        }
        stamped
    }

    /// Applies a group of received records addressed to property `name`.
    ///
    /// Unknown properties and properties the remote side may not write are
    /// ignored. Returns true if the records were applied.
    pub fn apply(
        &mut self,
        name: &str,
        cloud_event_time: u64,
        is_sync_message: bool,
        records: &[MapData],
    ) -> bool {
        let property_name = name.split_once(':').map_or(name, |(p, _)| p);
        let Some(property) = self.get_mut(property_name) else {
            debug!(property = property_name, "records for unknown property ignored");
            return false;
        };
        if !property.is_writable_by_cloud() {
            debug!(property = property_name, "records for read-only property ignored");
            return false;
        }

        property.set_last_cloud_change(cloud_event_time);
        property.set_attributes_from_cloud(records);

        if is_sync_message {
            property.exec_callback_on_sync();
        } else {
            match property.write_policy() {
                WritePolicy::Auto => {
                    property.from_cloud_to_local();
                    property.exec_callback_on_change();
                    property.provide_echo();
                }
                WritePolicy::Manual => property.exec_callback_on_change(),
            }
        }
        true
    }
}

impl std::fmt::Debug for PropertyContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyContainer")
            .field("properties", &self.properties)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
