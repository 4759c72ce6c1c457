//! Named element namespace of a compiled model.
//!
//! A [`ModelNamespace`] is the read-only view of a physics model that the
//! configuration layer needs: the names of every joint, body, geom, and site
//! in declaration order, which body owns each element, and the parent/child
//! topology of the body tree. Body 0 is always the implicit `world` body.
//!
//! Namespaces are built once per model instance through
//! [`NamespaceBuilder`]; each build receives a fresh [`ModelId`].

use hashbrown::HashMap;
use tracing::debug;

use crate::element::{ElementKind, EntityHandle, ModelId};
use crate::error::{ResolutionError, ValidationError};

/// Name of the implicit root body.
pub const WORLD_BODY: &str = "world";

#[derive(Debug, Clone, Default)]
struct ElementTable {
    names: Vec<String>,
    // Owning body for joints/geoms/sites, parent body for bodies.
    owner: Vec<usize>,
    entity: Vec<Option<usize>>,
    lookup: HashMap<String, usize>,
}

impl ElementTable {
    fn push(
        &mut self,
        kind: ElementKind,
        name: &str,
        owner: usize,
        entity: Option<usize>,
    ) -> Result<usize, ValidationError> {
        if self.lookup.contains_key(name) {
            return Err(ValidationError::DuplicateName {
                kind,
                name: name.to_owned(),
            });
        }
        let index = self.names.len();
        self.names.push(name.to_owned());
        self.owner.push(owner);
        self.entity.push(entity);
        self.lookup.insert(name.to_owned(), index);
        Ok(index)
    }

    fn len(&self) -> usize {
        self.names.len()
    }
}

/// Builder for a [`ModelNamespace`].
///
/// Elements are declared parent-first; declaration order becomes the
/// canonical order used by every resolution result.
///
/// # Example
///
/// ```
/// use sim_types::{ElementKind, NamespaceBuilder};
///
/// let mut builder = NamespaceBuilder::new();
/// builder.enter_entity("robot");
/// builder.add_body("pelvis", "world").unwrap();
/// builder.add_joint("hip", "pelvis").unwrap();
/// builder.add_geom("pelvis_collision", "pelvis").unwrap();
/// let ns = builder.build();
///
/// assert_eq!(ns.len(ElementKind::Body), 2);
/// assert!(ns.lookup(ElementKind::Joint, "hip").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceBuilder {
    tables: [ElementTable; 4],
    children: Vec<Vec<usize>>,
    entities: Vec<String>,
    current_entity: Option<usize>,
}

impl Default for NamespaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceBuilder {
    /// Create a builder holding only the `world` body.
    #[must_use]
    pub fn new() -> Self {
        let mut bodies = ElementTable::default();
        bodies.names.push(WORLD_BODY.to_owned());
        bodies.owner.push(0);
        bodies.entity.push(None);
        bodies.lookup.insert(WORLD_BODY.to_owned(), 0);

        Self {
            tables: [
                ElementTable::default(),
                bodies,
                ElementTable::default(),
                ElementTable::default(),
            ],
            children: vec![Vec::new()],
            entities: Vec::new(),
            current_entity: None,
        }
    }

    /// Attribute subsequently declared bodies to the named entity.
    pub fn enter_entity(&mut self, name: &str) {
        let index = match self.entities.iter().position(|e| e == name) {
            Some(index) => index,
            None => {
                self.entities.push(name.to_owned());
                self.entities.len() - 1
            }
        };
        self.current_entity = Some(index);
    }

    /// Stop attributing bodies to an entity; later bodies belong to the
    /// static world.
    pub fn leave_entity(&mut self) {
        self.current_entity = None;
    }

    /// Declare a body under `parent`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken or the parent is undeclared.
    pub fn add_body(&mut self, name: &str, parent: &str) -> Result<usize, ValidationError> {
        let parent = self.body_index(parent)?;
        let entity = self.current_entity;
        let index = table_mut(&mut self.tables, ElementKind::Body).push(
            ElementKind::Body,
            name,
            parent,
            entity,
        )?;
        self.children.push(Vec::new());
        self.children[parent].push(index);
        Ok(index)
    }

    /// Declare a joint on `body`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken or the body is undeclared.
    pub fn add_joint(&mut self, name: &str, body: &str) -> Result<usize, ValidationError> {
        self.add_attached(ElementKind::Joint, name, body)
    }

    /// Declare a geom on `body`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken or the body is undeclared.
    pub fn add_geom(&mut self, name: &str, body: &str) -> Result<usize, ValidationError> {
        self.add_attached(ElementKind::Geom, name, body)
    }

    /// Declare a site on `body`.
    ///
    /// # Errors
    ///
    /// Fails if the name is already taken or the body is undeclared.
    pub fn add_site(&mut self, name: &str, body: &str) -> Result<usize, ValidationError> {
        self.add_attached(ElementKind::Site, name, body)
    }

    fn add_attached(
        &mut self,
        kind: ElementKind,
        name: &str,
        body: &str,
    ) -> Result<usize, ValidationError> {
        let owner = self.body_index(body)?;
        // Attached elements inherit the entity of their body.
        let entity = table(&self.tables, ElementKind::Body).entity[owner];
        table_mut(&mut self.tables, kind).push(kind, name, owner, entity)
    }

    fn body_index(&self, name: &str) -> Result<usize, ValidationError> {
        table(&self.tables, ElementKind::Body)
            .lookup
            .get(name)
            .copied()
            .ok_or_else(|| ValidationError::UnknownBody(name.to_owned()))
    }

    /// Freeze the namespace and assign it a fresh model identity.
    #[must_use]
    pub fn build(self) -> ModelNamespace {
        let id = ModelId::next();
        debug!(
            model = %id,
            bodies = self.tables[1].len(),
            joints = self.tables[0].len(),
            geoms = self.tables[2].len(),
            sites = self.tables[3].len(),
            "built model namespace"
        );
        ModelNamespace {
            id,
            tables: self.tables,
            children: self.children,
            entities: self.entities,
        }
    }
}

const fn slot(kind: ElementKind) -> usize {
    match kind {
        ElementKind::Joint => 0,
        ElementKind::Body => 1,
        ElementKind::Geom => 2,
        ElementKind::Site => 3,
    }
}

fn table(tables: &[ElementTable; 4], kind: ElementKind) -> &ElementTable {
    &tables[slot(kind)]
}

fn table_mut(tables: &mut [ElementTable; 4], kind: ElementKind) -> &mut ElementTable {
    &mut tables[slot(kind)]
}

/// Read-only namespace of one compiled model instance.
#[derive(Debug, Clone)]
pub struct ModelNamespace {
    id: ModelId,
    tables: [ElementTable; 4],
    children: Vec<Vec<usize>>,
    entities: Vec<String>,
}

impl ModelNamespace {
    /// Identity of this model instance.
    #[must_use]
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Number of elements of `kind` (bodies include `world`).
    #[must_use]
    pub fn len(&self, kind: ElementKind) -> usize {
        table(&self.tables, kind).len()
    }

    /// Names of every element of `kind`, in declaration order.
    pub fn names(&self, kind: ElementKind) -> impl Iterator<Item = &str> + '_ {
        table(&self.tables, kind).names.iter().map(String::as_str)
    }

    /// Handles of every element of `kind`, in declaration order.
    pub fn handles(&self, kind: ElementKind) -> impl Iterator<Item = EntityHandle> + '_ {
        (0..self.len(kind)).map(move |i| EntityHandle::new(self.id, kind, i))
    }

    /// Handle for the element at `index`, if it exists.
    #[must_use]
    pub fn handle(&self, kind: ElementKind, index: usize) -> Option<EntityHandle> {
        (index < self.len(kind)).then(|| EntityHandle::new(self.id, kind, index))
    }

    /// Look up an element by exact name.
    #[must_use]
    pub fn lookup(&self, kind: ElementKind, name: &str) -> Option<EntityHandle> {
        table(&self.tables, kind)
            .lookup
            .get(name)
            .map(|&i| EntityHandle::new(self.id, kind, i))
    }

    /// Check whether `handle` was minted by this namespace.
    #[must_use]
    pub fn owns(&self, handle: EntityHandle) -> bool {
        handle.model() == self.id && handle.index() < self.len(handle.kind())
    }

    /// Reject handles minted by another model instance.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::ForeignHandle`] for handles of another model.
    pub fn check(&self, handle: EntityHandle) -> Result<(), ResolutionError> {
        if self.owns(handle) {
            Ok(())
        } else {
            Err(ResolutionError::ForeignHandle {
                handle,
                model: self.id,
            })
        }
    }

    /// Name of the element behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle belongs to another model.
    pub fn name(&self, handle: EntityHandle) -> Result<&str, ResolutionError> {
        self.check(handle)?;
        Ok(&table(&self.tables, handle.kind()).names[handle.index()])
    }

    /// Body owning a joint, geom, or site. A body maps to itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle belongs to another model.
    pub fn body_of(&self, handle: EntityHandle) -> Result<EntityHandle, ResolutionError> {
        self.check(handle)?;
        if handle.kind() == ElementKind::Body {
            return Ok(handle);
        }
        let owner = table(&self.tables, handle.kind()).owner[handle.index()];
        Ok(EntityHandle::new(self.id, ElementKind::Body, owner))
    }

    /// Parent of a body; `None` for `world`.
    ///
    /// # Errors
    ///
    /// Returns an error for foreign or non-body handles.
    pub fn parent(&self, body: EntityHandle) -> Result<Option<EntityHandle>, ResolutionError> {
        self.require_body(body)?;
        if body.index() == 0 {
            return Ok(None);
        }
        let parent = table(&self.tables, ElementKind::Body).owner[body.index()];
        Ok(Some(EntityHandle::new(self.id, ElementKind::Body, parent)))
    }

    /// Direct children of a body, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error for foreign or non-body handles.
    pub fn children(&self, body: EntityHandle) -> Result<Vec<EntityHandle>, ResolutionError> {
        self.require_body(body)?;
        Ok(self.children[body.index()]
            .iter()
            .map(|&i| EntityHandle::new(self.id, ElementKind::Body, i))
            .collect())
    }

    /// Mark every body in the subtree rooted at `body` (inclusive).
    ///
    /// The returned mask is indexed by body index.
    ///
    /// # Errors
    ///
    /// Returns an error for foreign or non-body handles.
    pub fn subtree_mask(&self, body: EntityHandle) -> Result<Vec<bool>, ResolutionError> {
        self.require_body(body)?;
        let mut mask = vec![false; self.len(ElementKind::Body)];
        let mut stack = vec![body.index()];
        while let Some(b) = stack.pop() {
            if !mask[b] {
                mask[b] = true;
                stack.extend(self.children[b].iter().copied());
            }
        }
        Ok(mask)
    }

    /// Bodies in the subtree rooted at `body` (inclusive), in declaration order.
    ///
    /// # Errors
    ///
    /// Returns an error for foreign or non-body handles.
    pub fn subtree(&self, body: EntityHandle) -> Result<Vec<EntityHandle>, ResolutionError> {
        let mask = self.subtree_mask(body)?;
        Ok(self.masked_bodies(&mask))
    }

    /// Elements of `kind` owned by any body in the subtree rooted at `body`,
    /// in declaration order. For `kind == Body` this is [`Self::subtree`].
    ///
    /// # Errors
    ///
    /// Returns an error for foreign or non-body handles.
    pub fn subtree_elements(
        &self,
        body: EntityHandle,
        kind: ElementKind,
    ) -> Result<Vec<EntityHandle>, ResolutionError> {
        let mask = self.subtree_mask(body)?;
        Ok(self.elements_in_bodies(&mask, kind))
    }

    /// Elements of `kind` owned by a body whose mask entry is set, in
    /// declaration order. For `kind == Body` the mask selects bodies directly.
    #[must_use]
    pub fn elements_in_bodies(&self, body_mask: &[bool], kind: ElementKind) -> Vec<EntityHandle> {
        if kind == ElementKind::Body {
            return self.masked_bodies(body_mask);
        }
        table(&self.tables, kind)
            .owner
            .iter()
            .enumerate()
            .filter(|&(_, &owner)| body_mask.get(owner).copied().unwrap_or(false))
            .map(|(i, _)| EntityHandle::new(self.id, kind, i))
            .collect()
    }

    fn masked_bodies(&self, mask: &[bool]) -> Vec<EntityHandle> {
        mask.iter()
            .enumerate()
            .filter(|&(_, &m)| m)
            .map(|(i, _)| EntityHandle::new(self.id, ElementKind::Body, i))
            .collect()
    }

    /// Entity the element belongs to, or `None` for the static world.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle belongs to another model.
    pub fn entity_of(&self, handle: EntityHandle) -> Result<Option<&str>, ResolutionError> {
        self.check(handle)?;
        Ok(table(&self.tables, handle.kind()).entity[handle.index()]
            .map(|e| self.entities[e].as_str()))
    }

    /// Check whether an entity with this name was declared.
    #[must_use]
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.iter().any(|e| e == name)
    }

    /// Declared entity names.
    pub fn entities(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.iter().map(String::as_str)
    }

    fn require_body(&self, handle: EntityHandle) -> Result<(), ResolutionError> {
        self.check(handle)?;
        if handle.kind() == ElementKind::Body {
            Ok(())
        } else {
            Err(ResolutionError::WrongKind {
                expected: ElementKind::Body,
                handle,
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn leg_model() -> ModelNamespace {
        let mut b = NamespaceBuilder::new();
        b.add_body("terrain", "world").unwrap();
        b.add_geom("terrain", "terrain").unwrap();
        b.enter_entity("robot");
        b.add_body("pelvis", "world").unwrap();
        b.add_body("thigh", "pelvis").unwrap();
        b.add_body("foot", "thigh").unwrap();
        b.add_joint("hip", "thigh").unwrap();
        b.add_joint("knee", "foot").unwrap();
        b.add_geom("pelvis_collision", "pelvis").unwrap();
        b.add_geom("foot_collision", "foot").unwrap();
        b.add_site("foot_site", "foot").unwrap();
        b.build()
    }

    #[test]
    fn test_world_body_is_root() {
        let ns = leg_model();
        let world = ns.lookup(ElementKind::Body, WORLD_BODY).unwrap();
        assert_eq!(world.index(), 0);
        assert_eq!(ns.parent(world).unwrap(), None);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut b = NamespaceBuilder::new();
        b.add_body("a", "world").unwrap();
        let err = b.add_body("a", "world").unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateName { .. }));
        // Same name in another kind is fine.
        assert!(b.add_geom("a", "a").is_ok());
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut b = NamespaceBuilder::new();
        assert_eq!(
            b.add_body("a", "missing").unwrap_err(),
            ValidationError::UnknownBody("missing".into())
        );
    }

    #[test]
    fn test_subtree_is_transitive() {
        let ns = leg_model();
        let pelvis = ns.lookup(ElementKind::Body, "pelvis").unwrap();
        let names: Vec<_> = ns
            .subtree_elements(pelvis, ElementKind::Geom)
            .unwrap()
            .into_iter()
            .map(|h| ns.name(h).unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["pelvis_collision", "foot_collision"]);

        let bodies = ns.subtree(pelvis).unwrap();
        assert_eq!(bodies.len(), 3);
    }

    #[test]
    fn test_entity_attribution() {
        let ns = leg_model();
        let terrain = ns.lookup(ElementKind::Geom, "terrain").unwrap();
        let foot = ns.lookup(ElementKind::Geom, "foot_collision").unwrap();
        assert_eq!(ns.entity_of(terrain).unwrap(), None);
        assert_eq!(ns.entity_of(foot).unwrap(), Some("robot"));
        assert!(ns.has_entity("robot"));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let a = leg_model();
        let b = leg_model();
        let h = a.lookup(ElementKind::Joint, "hip").unwrap();
        assert!(a.check(h).is_ok());
        assert!(matches!(
            b.name(h),
            Err(ResolutionError::ForeignHandle { .. })
        ));
    }

    #[test]
    fn test_body_of_and_children() {
        let ns = leg_model();
        let knee = ns.lookup(ElementKind::Joint, "knee").unwrap();
        let foot = ns.body_of(knee).unwrap();
        assert_eq!(ns.name(foot).unwrap(), "foot");

        let thigh = ns.lookup(ElementKind::Body, "thigh").unwrap();
        assert_eq!(ns.children(thigh).unwrap(), vec![foot]);
        assert!(matches!(
            ns.children(knee),
            Err(ResolutionError::WrongKind { .. })
        ));
    }
}
