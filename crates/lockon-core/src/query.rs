//! Spatial query adapter.
//!
//! Lock tracing only needs one thing from physics: "what blocks a sphere swept
//! from here to there". [`SpatialQuery`] is that seam; hosts with a real
//! physics engine implement it, and [`WorldSweep`] answers it from the
//! `Collider` components in the world.

use hecs::{Entity, World};
use lockon_logic::math::Vec3;
use lockon_logic::sweep::{sweep_sphere_vs_sphere, SweepShape};

use crate::components::{AttachedTo, Collider, Transform};

/// One blocking hit from a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Entity the hit counts against (the collider's owner)
    pub actor: Entity,
    /// Collider that was hit
    pub collider: Entity,
    /// Time of impact along the sweep, 0 at `from`, 1 at `to`
    pub time: f32,
}

/// Actors a sweep must not report
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    ignored_actors: Vec<Entity>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore `actor` and every primitive attached to it.
    pub fn ignore_actor(mut self, actor: Entity) -> Self {
        self.ignored_actors.push(actor);
        self
    }

    pub fn ignores(&self, actor: Entity) -> bool {
        self.ignored_actors.contains(&actor)
    }
}

#[derive(Debug, Clone)]
pub struct SweepRequest {
    pub shape: SweepShape,
    pub from: Vec3,
    pub to: Vec3,
    pub filter: QueryFilter,
}

pub trait SpatialQuery {
    /// Blocking hits along the sweep, in order of time of impact.
    /// An empty result means nothing was hit; queries never fail.
    fn sweep(&self, world: &World, request: &SweepRequest) -> Vec<Hit>;
}

/// Sweeps against every `Collider` + `Transform` in the world.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorldSweep;

impl SpatialQuery for WorldSweep {
    fn sweep(&self, world: &World, request: &SweepRequest) -> Vec<Hit> {
        let inflation = request.shape.inflation();
        let mut hits = Vec::new();

        for (entity, (transform, collider, attached)) in world
            .query::<(&Transform, &Collider, Option<&AttachedTo>)>()
            .iter()
        {
            if !collider.blocking {
                continue;
            }
            let actor = attached.map(|a| a.0).unwrap_or(entity);
            if request.filter.ignores(actor) {
                continue;
            }
            if let Some(time) = sweep_sphere_vs_sphere(
                request.from,
                request.to,
                inflation,
                transform.position,
                collider.radius,
            ) {
                hits.push(Hit {
                    actor,
                    collider: entity,
                    time,
                });
            }
        }

        hits.sort_by(|a, b| a.time.total_cmp(&b.time));
        log::trace!(
            "Sweep {:?} -> {:?} r={} hit {} colliders",
            request.from,
            request.to,
            inflation,
            hits.len()
        );
        hits
    }
}
