//! Contact sensor: matching and per-step reduction.
//!
//! A [`ContactSensor`] is created by binding a [`ContactSensorConfig`]
//! against one model namespace. Each step it filters the engine's contact
//! list to pairs with one geom on the primary side and the other on the
//! secondary side (in either order), then reduces the matching contacts
//! of every tracked element into a fixed number of slots.

use nalgebra::Vector3;
use sim_types::{ContactRecord, ElementKind, EntityHandle, ModelId, ModelNamespace};
use tracing::{debug, warn};

use crate::air_time::AirTimeTracker;
use crate::config::{ContactField, ContactSensorConfig, Reduce};
use crate::Result;

/// Lifecycle of a bound sensor.
///
/// An unbound sensor is just its [`ContactSensorConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorState {
    /// Resolved against a model, not yet updated since bind or reset.
    Bound,
    /// Updated at least once.
    Active,
}

/// Reduced contact data in one slot.
///
/// Fields the sensor was not configured to report are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactSlot {
    /// Whether any contact landed in this slot.
    pub found: Option<bool>,
    /// Force on the tracked element, summed over the slot's contacts.
    pub force: Option<Vector3<f64>>,
}

impl ContactSlot {
    fn empty(found: bool, force: bool) -> Self {
        Self {
            found: found.then_some(false),
            force: force.then(Vector3::zeros),
        }
    }

    fn accumulate(&mut self, force: Vector3<f64>) {
        if let Some(found) = &mut self.found {
            *found = true;
        }
        if let Some(f) = &mut self.force {
            *f += force;
        }
    }
}

/// Per-step result for one tracked element.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactAggregate {
    /// The tracked geom or body.
    pub element: EntityHandle,
    /// At least one matching contact this step.
    pub in_contact: bool,
    /// Matching contacts this step, including ones dropped on overflow.
    pub contact_count: usize,
    /// Slot data, `num_slots` entries.
    pub slots: Vec<ContactSlot>,
    /// Phase durations, if tracking is enabled.
    pub air_time: Option<AirTimeTracker>,
}

impl ContactAggregate {
    /// Sum of the force over all slots, if force is reported.
    #[must_use]
    pub fn net_force(&self) -> Option<Vector3<f64>> {
        self.slots
            .iter()
            .map(|s| s.force)
            .try_fold(Vector3::zeros(), |acc, f| f.map(|f| acc + f))
    }

    fn clear(&mut self, found: bool, force: bool) {
        self.in_contact = false;
        self.contact_count = 0;
        for slot in &mut self.slots {
            *slot = ContactSlot::empty(found, force);
        }
    }
}

/// A contact sensor bound to one model instance.
///
/// # Example
///
/// ```
/// use nalgebra::Vector3;
/// use sim_sensor::{ContactField, ContactMatch, ContactSensorConfig, Reduce};
/// use sim_types::{ContactRecord, NamespaceBuilder};
///
/// let mut b = NamespaceBuilder::new();
/// b.add_body("terrain", "world").unwrap();
/// let floor = b.add_geom("floor", "terrain").unwrap();
/// b.add_body("foot", "world").unwrap();
/// let sole = b.add_geom("sole", "foot").unwrap();
/// let ns = b.build();
///
/// let mut sensor = ContactSensorConfig::new("foot_contact", ContactMatch::body("foot"))
///     .with_secondary(ContactMatch::body("terrain"))
///     .with_fields([ContactField::Found, ContactField::Force])
///     .with_reduce(Reduce::NetForce)
///     .bind(&ns)
///     .unwrap();
///
/// sensor.update(&[ContactRecord::new(floor, sole, Vector3::new(0.0, 0.0, -50.0))], 0.005);
/// let foot = &sensor.aggregates()[0];
/// assert!(foot.in_contact);
/// assert_eq!(foot.net_force(), Some(Vector3::new(0.0, 0.0, 50.0)));
/// ```
#[derive(Debug, Clone)]
pub struct ContactSensor {
    config: ContactSensorConfig,
    model: ModelId,
    /// Tracked elements owning each geom, indexed by geom.
    owners: Vec<Vec<usize>>,
    /// Geoms accepted on the other side, indexed by geom; `None` accepts all.
    secondary: Option<Vec<bool>>,
    state: SensorState,
    aggregates: Vec<ContactAggregate>,
    /// Index+1 of the last contact counted for each element.
    stamp: Vec<usize>,
    saturation_logged: bool,
}

impl ContactSensorConfig {
    /// Resolve both sides against `namespace`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or a side matches nothing
    /// without `allow_empty`.
    pub fn bind(&self, namespace: &ModelNamespace) -> Result<ContactSensor> {
        ContactSensor::bind(self.clone(), namespace)
    }
}

impl ContactSensor {
    /// Bind `config` against `namespace`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or a side matches nothing
    /// without `allow_empty`.
    pub fn bind(config: ContactSensorConfig, namespace: &ModelNamespace) -> Result<Self> {
        config.validate()?;
        let num_geoms = namespace.len(ElementKind::Geom);

        let primary = config.primary.resolve(namespace)?;
        let mut owners = vec![Vec::new(); num_geoms];
        for (element, geoms) in primary.geoms.iter().enumerate() {
            for geom in geoms {
                owners[geom.index()].push(element);
            }
        }

        let secondary = match &config.secondary {
            Some(side) => {
                let matched = side.resolve(namespace)?;
                let mut mask = vec![false; num_geoms];
                for geom in matched.geoms.iter().flatten() {
                    mask[geom.index()] = true;
                }
                Some(mask)
            }
            None => None,
        };

        let found = config.has_field(ContactField::Found);
        let force = config.has_field(ContactField::Force);
        let aggregates: Vec<ContactAggregate> = primary
            .elements
            .iter()
            .map(|&element| ContactAggregate {
                element,
                in_contact: false,
                contact_count: 0,
                slots: vec![ContactSlot::empty(found, force); config.num_slots],
                air_time: config.track_air_time.then(AirTimeTracker::default),
            })
            .collect();

        debug!(
            sensor = %config.name,
            elements = aggregates.len(),
            secondary = secondary.as_ref().map_or(num_geoms, |m| m.iter().filter(|&&s| s).count()),
            "bound contact sensor"
        );

        Ok(Self {
            stamp: vec![0; aggregates.len()],
            config,
            model: namespace.id(),
            owners,
            secondary,
            state: SensorState::Bound,
            aggregates,
            saturation_logged: false,
        })
    }

    /// Sensor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration this sensor was bound from.
    #[must_use]
    pub fn config(&self) -> &ContactSensorConfig {
        &self.config
    }

    /// Model this sensor is bound to.
    #[must_use]
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SensorState {
        self.state
    }

    /// Results of the latest step, one per tracked element in namespace
    /// order.
    #[must_use]
    pub fn aggregates(&self) -> &[ContactAggregate] {
        &self.aggregates
    }

    /// Tracked elements in namespace order.
    pub fn elements(&self) -> impl Iterator<Item = EntityHandle> + '_ {
        self.aggregates.iter().map(|a| a.element)
    }

    /// `in_contact` of every tracked element.
    #[must_use]
    pub fn found(&self) -> Vec<bool> {
        self.aggregates.iter().map(|a| a.in_contact).collect()
    }

    /// Elements that made contact during the last step of length `dt`.
    ///
    /// Empty when air time is not tracked.
    #[must_use]
    pub fn first_contact(&self, dt: f64) -> Vec<bool> {
        self.aggregates
            .iter()
            .filter_map(|a| a.air_time.map(|t| t.compute_first_contact(dt)))
            .collect()
    }

    /// Elements that lost contact during the last step of length `dt`.
    ///
    /// Empty when air time is not tracked.
    #[must_use]
    pub fn first_air(&self, dt: f64) -> Vec<bool> {
        self.aggregates
            .iter()
            .filter_map(|a| a.air_time.map(|t| t.compute_first_air(dt)))
            .collect()
    }

    /// Recompute every aggregate from this step's contacts.
    ///
    /// Contacts naming geoms outside the bound model are ignored. A contact
    /// counts at most once per element; when both of its geoms belong to the
    /// same element, the `geom1` side is used.
    pub fn update(&mut self, contacts: &[ContactRecord], dt: f64) {
        let found = self.config.has_field(ContactField::Found);
        let force = self.config.has_field(ContactField::Force);
        for aggregate in &mut self.aggregates {
            aggregate.clear(found, force);
        }
        self.stamp.fill(0);

        let Self {
            config,
            owners,
            secondary,
            aggregates,
            stamp,
            ..
        } = self;

        for (k, contact) in contacts.iter().enumerate() {
            let sides = [
                (contact.geom1, contact.geom2, contact.force),
                (contact.geom2, contact.geom1, -contact.force),
            ];
            for (geom, other, force_on_geom) in sides {
                let accepted = match secondary {
                    Some(mask) => mask.get(other).copied().unwrap_or(false),
                    None => true,
                };
                if !accepted {
                    continue;
                }
                let Some(elements) = owners.get(geom) else {
                    continue;
                };
                for &e in elements {
                    if stamp[e] == k + 1 {
                        continue;
                    }
                    stamp[e] = k + 1;
                    record(&mut aggregates[e], config, force_on_geom);
                }
            }
        }

        // Only slot-per-contact reduction drops data on overflow.
        if !self.saturation_logged && self.config.reduce == Reduce::None {
            let num_slots = self.config.num_slots;
            if let Some(worst) = self
                .aggregates
                .iter()
                .map(|a| a.contact_count)
                .filter(|&count| count > num_slots)
                .max()
            {
                warn!(
                    sensor = %self.config.name,
                    contacts = worst,
                    num_slots,
                    "contact slots saturated"
                );
                self.saturation_logged = true;
            }
        }

        for aggregate in &mut self.aggregates {
            let in_contact = aggregate.in_contact;
            if let Some(tracker) = &mut aggregate.air_time {
                tracker.update(in_contact, dt);
            }
        }
        self.state = SensorState::Active;
    }

    /// Clear aggregates and zero all phase durations.
    pub fn reset(&mut self) {
        let found = self.config.has_field(ContactField::Found);
        let force = self.config.has_field(ContactField::Force);
        for aggregate in &mut self.aggregates {
            aggregate.clear(found, force);
            if let Some(tracker) = &mut aggregate.air_time {
                tracker.reset();
            }
        }
        self.state = SensorState::Bound;
    }
}

fn record(aggregate: &mut ContactAggregate, config: &ContactSensorConfig, force: Vector3<f64>) {
    let k = aggregate.contact_count;
    aggregate.contact_count += 1;
    aggregate.in_contact = true;

    let slot = match config.reduce {
        Reduce::None if k < config.num_slots => Some(k),
        Reduce::None => None,
        Reduce::NetForce => Some(k % config.num_slots),
    };
    if let Some(slot) = slot.and_then(|i| aggregate.slots.get_mut(i)) {
        slot.accumulate(force);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::ContactMatch;
    use approx::assert_relative_eq;
    use sim_types::NamespaceBuilder;

    const DT: f64 = 0.005;

    struct Quadruped {
        ns: ModelNamespace,
        floor: usize,
        feet: [usize; 4],
        base: usize,
        thigh: usize,
    }

    fn quadruped() -> Quadruped {
        let mut b = NamespaceBuilder::new();
        b.add_body("terrain", "world").unwrap();
        let floor = b.add_geom("terrain", "terrain").unwrap();
        b.enter_entity("robot");
        b.add_body("base_link", "world").unwrap();
        let base = b.add_geom("base_collision", "base_link").unwrap();
        let mut feet = [0; 4];
        let mut thigh = 0;
        for (i, leg) in ["FR", "FL", "RR", "RL"].iter().enumerate() {
            b.add_body(&format!("{leg}_thigh"), "base_link").unwrap();
            let t = b
                .add_geom(&format!("{leg}_thigh_collision"), &format!("{leg}_thigh"))
                .unwrap();
            if i == 0 {
                thigh = t;
            }
            b.add_body(&format!("{leg}_calf"), &format!("{leg}_thigh")).unwrap();
            feet[i] = b
                .add_geom(&format!("{leg}_foot_collision"), &format!("{leg}_calf"))
                .unwrap();
        }
        Quadruped {
            ns: b.build(),
            floor,
            feet,
            base,
            thigh,
        }
    }

    fn feet_cfg() -> ContactSensorConfig {
        ContactSensorConfig::new(
            "feet_ground_contact",
            ContactMatch::geom(".*_foot_collision").in_entity("robot"),
        )
        .with_secondary(ContactMatch::body("terrain"))
        .with_fields([ContactField::Found, ContactField::Force])
        .with_reduce(Reduce::NetForce)
        .with_air_time(true)
    }

    fn up(z: f64) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, z)
    }

    #[test]
    fn test_bind_state_machine() {
        let q = quadruped();
        let mut sensor = feet_cfg().bind(&q.ns).unwrap();
        assert_eq!(sensor.state(), SensorState::Bound);
        assert_eq!(sensor.aggregates().len(), 4);
        assert_eq!(sensor.model(), q.ns.id());

        sensor.update(&[], DT);
        assert_eq!(sensor.state(), SensorState::Active);
        sensor.reset();
        assert_eq!(sensor.state(), SensorState::Bound);
    }

    #[test]
    fn test_bind_fails_on_empty_side() {
        let q = quadruped();
        let cfg = feet_cfg().with_secondary(ContactMatch::body("lava"));
        assert!(cfg.bind(&q.ns).unwrap_err().is_resolution());

        let cfg = feet_cfg().with_secondary(ContactMatch::body("lava").allow_empty());
        let mut sensor = cfg.bind(&q.ns).unwrap();
        sensor.update(&[ContactRecord::new(q.feet[0], q.floor, up(1.0))], DT);
        assert!(sensor.found().iter().all(|f| !f));
    }

    #[test]
    fn test_pairing_is_symmetric() {
        let q = quadruped();
        let mut sensor = feet_cfg().bind(&q.ns).unwrap();
        sensor.update(
            &[
                ContactRecord::new(q.feet[0], q.floor, up(30.0)),
                ContactRecord::new(q.floor, q.feet[2], up(-40.0)),
            ],
            DT,
        );
        assert_eq!(sensor.found(), [true, false, true, false]);
        assert_relative_eq!(sensor.aggregates()[0].net_force().unwrap().z, 30.0);
        assert_relative_eq!(sensor.aggregates()[2].net_force().unwrap().z, 40.0);
    }

    #[test]
    fn test_non_matching_contacts_ignored() {
        let q = quadruped();
        let mut sensor = feet_cfg().bind(&q.ns).unwrap();
        sensor.update(
            &[
                ContactRecord::new(q.base, q.floor, up(5.0)),
                ContactRecord::new(q.feet[1], q.thigh, up(5.0)),
                ContactRecord::new(q.feet[1], 999, up(5.0)),
            ],
            DT,
        );
        assert!(sensor.found().iter().all(|f| !f));
        assert_eq!(sensor.aggregates()[1].contact_count, 0);
    }

    #[test]
    fn test_netforce_single_slot_sums_independent_of_order() {
        let q = quadruped();
        let contacts = [
            ContactRecord::new(q.feet[3], q.floor, Vector3::new(1.0, 0.0, 10.0)),
            ContactRecord::new(q.floor, q.feet[3], Vector3::new(0.0, 2.0, -20.0)),
            ContactRecord::new(q.feet[3], q.floor, Vector3::new(-3.0, 0.0, 30.0)),
        ];
        let expected = Vector3::new(-2.0, -2.0, 60.0);

        let mut forward = feet_cfg().bind(&q.ns).unwrap();
        forward.update(&contacts, DT);
        let mut reversed = feet_cfg().bind(&q.ns).unwrap();
        let mut rev = contacts;
        rev.reverse();
        reversed.update(&rev, DT);

        for sensor in [&forward, &reversed] {
            let rl = &sensor.aggregates()[3];
            assert_eq!(rl.contact_count, 3);
            assert_eq!(rl.slots.len(), 1);
            assert_eq!(rl.slots[0].found, Some(true));
            assert_relative_eq!(rl.slots[0].force.unwrap(), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_netforce_overflow_is_round_robin() {
        let q = quadruped();
        let mut sensor = feet_cfg().with_num_slots(2).bind(&q.ns).unwrap();
        sensor.update(
            &[
                ContactRecord::new(q.feet[0], q.floor, up(1.0)),
                ContactRecord::new(q.feet[0], q.floor, up(2.0)),
                ContactRecord::new(q.feet[0], q.floor, up(4.0)),
            ],
            DT,
        );
        let fr = &sensor.aggregates()[0];
        assert_relative_eq!(fr.slots[0].force.unwrap().z, 5.0);
        assert_relative_eq!(fr.slots[1].force.unwrap().z, 2.0);
        assert_relative_eq!(fr.net_force().unwrap().z, 7.0);
    }

    #[test]
    fn test_reduce_none_drops_overflow() {
        let q = quadruped();
        let mut sensor = feet_cfg()
            .with_reduce(Reduce::None)
            .with_num_slots(2)
            .bind(&q.ns)
            .unwrap();
        sensor.update(
            &[
                ContactRecord::new(q.feet[0], q.floor, up(1.0)),
                ContactRecord::new(q.feet[0], q.floor, up(2.0)),
                ContactRecord::new(q.feet[0], q.floor, up(4.0)),
            ],
            DT,
        );
        let fr = &sensor.aggregates()[0];
        assert_eq!(fr.contact_count, 3);
        assert_relative_eq!(fr.slots[0].force.unwrap().z, 1.0);
        assert_relative_eq!(fr.slots[1].force.unwrap().z, 2.0);

        let fl = &sensor.aggregates()[1];
        assert_eq!(fl.slots[0].found, Some(false));
    }

    #[test]
    fn test_unrequested_fields_are_none() {
        let q = quadruped();
        let mut sensor = feet_cfg()
            .with_fields([ContactField::Found])
            .with_air_time(false)
            .bind(&q.ns)
            .unwrap();
        sensor.update(&[ContactRecord::new(q.feet[0], q.floor, up(1.0))], DT);
        let fr = &sensor.aggregates()[0];
        assert_eq!(fr.slots[0].found, Some(true));
        assert!(fr.slots[0].force.is_none());
        assert!(fr.net_force().is_none());
        assert!(fr.air_time.is_none());
        assert!(sensor.first_contact(DT).is_empty());
    }

    #[test]
    fn test_self_contact_counted_once() {
        let q = quadruped();
        let cfg = ContactSensorConfig::new(
            "self_collision",
            ContactMatch::subtree("base_link").in_entity("robot"),
        )
        .with_secondary(ContactMatch::subtree("base_link").in_entity("robot"));
        let mut sensor = cfg.bind(&q.ns).unwrap();
        assert_eq!(sensor.aggregates().len(), 1);

        sensor.update(
            &[
                ContactRecord::new(q.feet[0], q.thigh, up(1.0)),
                ContactRecord::new(q.feet[0], q.floor, up(1.0)),
            ],
            DT,
        );
        let base = &sensor.aggregates()[0];
        assert!(base.in_contact);
        assert_eq!(base.contact_count, 1);
    }

    #[test]
    fn test_air_time_across_steps_and_reset() {
        let q = quadruped();
        let mut sensor = feet_cfg().bind(&q.ns).unwrap();
        let touch = [ContactRecord::new(q.feet[0], q.floor, up(10.0))];

        for _ in 0..4 {
            sensor.update(&[], DT);
        }
        let fr = sensor.aggregates()[0].air_time.unwrap();
        assert_relative_eq!(fr.current_air_time, 4.0 * DT, epsilon = 1e-12);

        sensor.update(&touch, DT);
        assert_eq!(sensor.first_contact(DT), [true, false, false, false]);
        let fr = sensor.aggregates()[0].air_time.unwrap();
        assert_relative_eq!(fr.last_air_time, 4.0 * DT, epsilon = 1e-12);
        assert_eq!(fr.current_air_time, 0.0);

        sensor.reset();
        for aggregate in sensor.aggregates() {
            assert_eq!(aggregate.air_time.unwrap(), AirTimeTracker::default());
            assert!(!aggregate.in_contact);
        }
    }
}
