//! Conflict resolution for sync messages.

use tracing::debug;

use crate::property::Property;

/// Policy applied when the remote side answers the initial value fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    /// The side with the later change time wins.
    #[default]
    MostRecentWins,
    /// The remote value always replaces the local one.
    CloudWins,
    /// The local value is kept and sent on the next pass.
    DeviceWins,
}

impl SyncPolicy {
    /// Resolves the shadow received for `property` according to this policy.
    pub fn resolve(&self, property: &mut Property) {
        match self {
            SyncPolicy::MostRecentWins => {
                if property.last_cloud_change() > property.last_local_change() {
                    debug!(
                        property = property.name(),
                        cloud = property.last_cloud_change(),
                        local = property.last_local_change(),
                        "remote value is newer"
                    );
                    property.from_cloud_to_local();
                    property.exec_callback_on_change();
                }
            }
            SyncPolicy::CloudWins => {
                property.from_cloud_to_local();
                property.exec_callback_on_change();
            }
            SyncPolicy::DeviceWins => {}
        }
    }
}
