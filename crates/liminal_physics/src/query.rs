//! Ray and overlap queries against the synced query pipeline
//!
//! Results reflect collider poses as of the last `step` or
//! `sync_query_pipeline`; transforms written in between are not visible.

use crate::body::isometry;
use crate::collider::ColliderHandle;
use crate::events::user_data_entity;
use crate::layers::CollisionGroups;
use liminal_grab::{EntityId, LayerMask};
use rapier3d::prelude as rapier;

/// Closest hit of a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub collider: ColliderHandle,
    /// Entity owning the collider, if it was spawned through the world
    pub entity: Option<EntityId>,
    pub point: [f32; 3],
    pub normal: [f32; 3],
    /// World units along the normalized ray
    pub distance: f32,
}

/// Box enclosing a collider, in the collider's own frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderBounds {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    /// x, y, z, w
    pub rotation: [f32; 4],
}

/// Which colliders a query sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerFilter {
    /// Colliders whose membership intersects this mask
    pub layers: LayerMask,
    /// Whether sensors (pressure plates) are reported
    pub sensors: bool,
    /// Collider the query passes through
    pub excluded: Option<ColliderHandle>,
}

impl LayerFilter {
    /// Solid colliders on `layers`
    pub const fn solid(layers: LayerMask) -> Self {
        Self {
            layers,
            sensors: false,
            excluded: None,
        }
    }

    /// Also report sensors
    pub const fn with_sensors(mut self) -> Self {
        self.sensors = true;
        self
    }

    /// Skip one collider, typically the held object itself
    pub const fn excluding(mut self, collider: ColliderHandle) -> Self {
        self.excluded = Some(collider);
        self
    }

    fn to_rapier(self) -> rapier::QueryFilter<'static> {
        let mut filter =
            rapier::QueryFilter::new().groups(CollisionGroups::query(self.layers).to_rapier());
        if !self.sensors {
            filter = filter.exclude_sensors();
        }
        if let Some(collider) = self.excluded {
            filter = filter.exclude_collider(collider.0);
        }
        filter
    }
}

impl Default for LayerFilter {
    fn default() -> Self {
        Self::solid(LayerMask::ALL)
    }
}

impl From<LayerMask> for LayerFilter {
    fn from(layers: LayerMask) -> Self {
        Self::solid(layers)
    }
}

/// Read-only view over the world's query pipeline
pub struct PhysicsQuery<'a> {
    pub(crate) query_pipeline: &'a rapier::QueryPipeline,
    pub(crate) colliders: &'a rapier::ColliderSet,
    pub(crate) bodies: &'a rapier::RigidBodySet,
}

impl<'a> PhysicsQuery<'a> {
    /// Unbounded ray; `direction` need not be normalized
    ///
    /// A ray starting inside a solid collider hits it at distance zero.
    pub fn raycast(
        &self,
        origin: [f32; 3],
        direction: [f32; 3],
        filter: LayerFilter,
    ) -> Option<RaycastHit> {
        let dir = rapier::Vector::new(direction[0], direction[1], direction[2])
            .try_normalize(f32::EPSILON)?;
        let ray = rapier::Ray::new(rapier::Point::new(origin[0], origin[1], origin[2]), dir);

        let (handle, hit) = self.query_pipeline.cast_ray_and_get_normal(
            self.bodies,
            self.colliders,
            &ray,
            f32::MAX,
            true,
            filter.to_rapier(),
        )?;
        let point = ray.point_at(hit.time_of_impact);

        Some(RaycastHit {
            collider: ColliderHandle(handle),
            entity: self
                .colliders
                .get(handle)
                .and_then(|c| user_data_entity(c.user_data)),
            point: [point.x, point.y, point.z],
            normal: [hit.normal.x, hit.normal.y, hit.normal.z],
            distance: hit.time_of_impact,
        })
    }

    /// Colliders intersecting an oriented box
    pub fn overlap_box(
        &self,
        center: [f32; 3],
        half_extents: [f32; 3],
        rotation: [f32; 4],
        filter: LayerFilter,
    ) -> Vec<ColliderHandle> {
        let [hx, hy, hz] = half_extents.map(f32::abs);
        let cuboid = rapier::Cuboid::new(rapier::Vector::new(hx, hy, hz));

        let mut found = Vec::new();
        self.query_pipeline.intersections_with_shape(
            self.bodies,
            self.colliders,
            &isometry(center, rotation),
            &cuboid,
            filter.to_rapier(),
            |handle| {
                found.push(ColliderHandle(handle));
                true
            },
        );
        found
    }

    /// Local bounding box of a collider placed at its synced pose
    pub fn collider_bounds(&self, handle: ColliderHandle) -> Option<ColliderBounds> {
        let collider = self.colliders.get(handle.0)?;
        let local = collider.shape().compute_local_aabb();
        let pose = collider.position();
        let center = pose * local.center();
        let half = local.half_extents();
        let rot = pose.rotation;

        Some(ColliderBounds {
            center: [center.x, center.y, center.z],
            half_extents: [half.x, half.y, half.z],
            rotation: [rot.i, rot.j, rot.k, rot.w],
        })
    }
}
