//! Named contact sensors of one environment.

use indexmap::IndexMap;
use sim_types::{ContactRecord, ModelNamespace};
use tracing::debug;

use crate::config::ContactSensorConfig;
use crate::contact::{ContactAggregate, ContactSensor};
use crate::{Result, SensorError};

/// Every contact sensor of one environment instance, keyed by name.
///
/// Iteration follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct ContactSensorRegistry {
    sensors: IndexMap<String, ContactSensor>,
}

impl ContactSensorRegistry {
    /// Bind all `configs` against `namespace`.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate sensor name or if any sensor fails to bind.
    pub fn bind_all<'c>(
        configs: impl IntoIterator<Item = &'c ContactSensorConfig>,
        namespace: &ModelNamespace,
    ) -> Result<Self> {
        let mut registry = Self::default();
        for config in configs {
            registry.insert(config.bind(namespace)?)?;
        }
        debug!(sensors = registry.len(), "bound contact sensors");
        Ok(registry)
    }

    /// Add a bound sensor.
    ///
    /// # Errors
    ///
    /// Fails if a sensor with the same name is already present.
    pub fn insert(&mut self, sensor: ContactSensor) -> Result<()> {
        if self.sensors.contains_key(sensor.name()) {
            return Err(SensorError::duplicate_sensor(sensor.name()));
        }
        self.sensors.insert(sensor.name().to_owned(), sensor);
        Ok(())
    }

    /// Number of sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Check if there are no sensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Sensor names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sensors.keys().map(String::as_str)
    }

    /// Look up a sensor.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ContactSensor> {
        self.sensors.get(name)
    }

    /// Latest aggregates of a sensor.
    ///
    /// # Errors
    ///
    /// Fails if no sensor has this name.
    pub fn aggregate(&self, name: &str) -> Result<&[ContactAggregate]> {
        self.get(name)
            .map(ContactSensor::aggregates)
            .ok_or_else(|| SensorError::unknown_sensor(name))
    }

    /// Update every sensor from this step's contacts.
    pub fn update(&mut self, contacts: &[ContactRecord], dt: f64) {
        for sensor in self.sensors.values_mut() {
            sensor.update(contacts, dt);
        }
    }

    /// Reset every sensor at episode start.
    pub fn reset(&mut self) {
        for sensor in self.sensors.values_mut() {
            sensor.reset();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{ContactField, ContactMatch, Reduce};
    use nalgebra::Vector3;
    use sim_types::NamespaceBuilder;

    fn biped() -> (ModelNamespace, usize, usize, usize) {
        let mut b = NamespaceBuilder::new();
        b.add_body("terrain", "world").unwrap();
        let floor = b.add_geom("floor", "terrain").unwrap();
        b.enter_entity("robot");
        b.add_body("pelvis", "world").unwrap();
        let pelvis = b.add_geom("pelvis_collision", "pelvis").unwrap();
        b.add_body("left_ankle_roll_link", "pelvis").unwrap();
        let left = b.add_geom("left_foot1_collision", "left_ankle_roll_link").unwrap();
        b.add_body("right_ankle_roll_link", "pelvis").unwrap();
        b.add_geom("right_foot1_collision", "right_ankle_roll_link").unwrap();
        (b.build(), floor, pelvis, left)
    }

    fn configs() -> Vec<ContactSensorConfig> {
        vec![
            ContactSensorConfig::new(
                "feet_ground_contact",
                ContactMatch::subtree("left_ankle_roll_link|right_ankle_roll_link")
                    .in_entity("robot"),
            )
            .with_secondary(ContactMatch::body("terrain"))
            .with_fields([ContactField::Found, ContactField::Force])
            .with_reduce(Reduce::NetForce)
            .with_air_time(true),
            ContactSensorConfig::new(
                "self_collision",
                ContactMatch::subtree("pelvis").in_entity("robot"),
            )
            .with_secondary(ContactMatch::subtree("pelvis").in_entity("robot")),
        ]
    }

    #[test]
    fn test_bind_and_update_together() {
        let (ns, floor, pelvis, left) = biped();
        let mut registry = ContactSensorRegistry::bind_all(&configs(), &ns).unwrap();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["feet_ground_contact", "self_collision"]
        );

        registry.update(
            &[
                ContactRecord::new(left, floor, Vector3::z()),
                ContactRecord::new(pelvis, left, Vector3::x()),
            ],
            0.02,
        );
        let feet = registry.aggregate("feet_ground_contact").unwrap();
        assert!(feet[0].in_contact);
        assert!(!feet[1].in_contact);
        assert!(registry.aggregate("self_collision").unwrap()[0].in_contact);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (ns, ..) = biped();
        let mut cfgs = configs();
        cfgs.push(cfgs[0].clone());
        let err = ContactSensorRegistry::bind_all(&cfgs, &ns).unwrap_err();
        assert_eq!(err, SensorError::duplicate_sensor("feet_ground_contact"));
    }

    #[test]
    fn test_unknown_sensor() {
        let (ns, ..) = biped();
        let registry = ContactSensorRegistry::bind_all(&configs(), &ns).unwrap();
        assert!(matches!(
            registry.aggregate("illegal_contact"),
            Err(SensorError::UnknownSensor(_))
        ));
    }
}
