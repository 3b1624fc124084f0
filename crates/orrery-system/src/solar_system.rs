//! The assembled simulation: ECS world, physics scene and schedules.

use bevy_ecs::prelude::*;
use glam::Vec3;
use orrery_config::{Config, PlanetGenConfig};
use orrery_log::DiagnosticsSink;
use orrery_math::Frame;
use orrery_physics::{BodyId, Collider, ColliderShape, CollisionLayers, PhysicsScene};
use orrery_planet::PlanetBody;
use orrery_player::{InputSnapshot, LocomotionStateMachine};
use tracing::{info, warn};

use crate::{
    BodyTransform, Collidable, Diagnostics, Planet, Player, PlayerInput, SimClock, SimSchedule,
    SimSchedules, Star, SystemError, SystemPlan, TransitionEvent, TransitionLog, advance_orbits,
    plan_system, player_look_and_capture, player_movement, sync_scene,
};

/// Read-only summary of a spawned planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetView {
    pub entity: Entity,
    pub id: BodyId,
    pub index: usize,
    pub frame: Frame,
    pub outer_radius: f32,
    pub surface_gravity: f32,
}

/// A running solar system.
pub struct SolarSystem {
    world: World,
    schedules: SimSchedules,
    frame_dt: f64,
    star: Entity,
    planets: Vec<Entity>,
    player: Entity,
}

/// Assemble the system for `seed` from `config`.
pub fn assemble(seed: u64, config: &Config) -> Result<SolarSystem, SystemError> {
    SolarSystem::from_plan(&plan_system(seed, config)?, config)
}

impl SolarSystem {
    /// Generate every planned planet and spawn the star, planets and player.
    pub fn from_plan(plan: &SystemPlan, config: &Config) -> Result<Self, SystemError> {
        let mut world = World::new();
        let mut scene = PhysicsScene::new();

        let star_frame = Frame::IDENTITY;
        let star_id = scene.insert(Collider::new(
            ColliderShape::Sphere {
                radius: plan.star.radius,
            },
            star_frame,
            CollisionLayers::STAR,
        ));
        let star = world
            .spawn((
                Star {
                    radius: plan.star.radius,
                    intensity: plan.star.intensity,
                    color: plan.star.color,
                    light_range: plan.light_range,
                },
                BodyTransform(star_frame),
                Collidable(star_id),
            ))
            .id();

        let mut planets = Vec::with_capacity(plan.planets.len());
        for planet in &plan.planets {
            let mut body = PlanetBody::new(planet.config.clone());
            body.generate(planet.seed).map_err(|source| SystemError::Planet {
                index: planet.index,
                source,
            })?;

            let mut orbit = planet.orbit;
            orbit.center = star_frame.position;
            let frame = orbit.frame_at_phase(planet.start_phase_deg);

            let Some(shape) = body.collider_shape() else {
                warn!(index = planet.index, "Planet has no mesh after generation, skipping");
                continue;
            };
            let mut collider = Collider::new(shape, frame, body.layer());
            if let Some(surface) = body.surface_info() {
                collider = collider.with_surface(surface);
            }
            let id = scene.insert(collider);

            planets.push(
                world
                    .spawn((
                        Planet {
                            index: planet.index,
                            body,
                        },
                        orbit,
                        BodyTransform(frame),
                        Collidable(id),
                    ))
                    .id(),
            );
        }

        let mut machine = LocomotionStateMachine::new(
            plan.player_spawn,
            0.0,
            config.locomotion.clone(),
            config.free_flight.clone(),
        );
        machine.face_towards(star_frame.position);
        let player = world.spawn(Player { machine }).id();

        world.insert_resource(scene);
        world.insert_resource(SimClock::default());
        world.insert_resource(PlayerInput::default());
        world.insert_resource(TransitionLog::default());

        let mut schedules = SimSchedules::new(&config.sim);
        schedules.add_system(
            SimSchedule::Variable,
            (advance_orbits, sync_scene, player_look_and_capture).chain(),
        );
        schedules.add_system(SimSchedule::Fixed, player_movement);
        schedules.initialize(&mut world)?;

        info!(
            seed = plan.seed,
            planets = planets.len(),
            star_radius = plan.star.radius,
            light_range = plan.light_range,
            "Assembled solar system"
        );

        Ok(Self {
            world,
            schedules,
            frame_dt: config.sim.frame_dt,
            star,
            planets,
            player,
        })
    }

    /// Forward every log event recorded into `sink`, and clear it on capture.
    pub fn with_diagnostics(mut self, sink: DiagnosticsSink) -> Self {
        self.world.insert_resource(Diagnostics(sink));
        self
    }

    /// Advance one frame at the configured frame delta.
    pub fn step(&mut self, input: InputSnapshot) -> Vec<TransitionEvent> {
        self.step_with_dt(input, self.frame_dt)
    }

    /// Advance one frame of `frame_dt` seconds and return its transitions.
    ///
    /// A jump not yet consumed by a fixed step stays pending.
    pub fn step_with_dt(&mut self, input: InputSnapshot, frame_dt: f64) -> Vec<TransitionEvent> {
        {
            let mut current = self.world.resource_mut::<PlayerInput>();
            let pending_jump = current.0.jump;
            current.0 = InputSnapshot {
                jump: input.jump || pending_jump,
                ..input
            };
        }
        self.schedules.run(&mut self.world, frame_dt);
        self.world.resource_mut::<TransitionLog>().drain()
    }

    pub fn player(&self) -> Option<&LocomotionStateMachine> {
        self.world
            .get::<Player>(self.player)
            .map(|player| &player.machine)
    }

    /// Mutable player access, for scripted setups.
    pub fn player_mut(&mut self) -> Option<Mut<'_, Player>> {
        self.world.get_mut::<Player>(self.player)
    }

    pub fn star(&self) -> Option<(&Star, Frame)> {
        let star = self.world.get::<Star>(self.star)?;
        let transform = self.world.get::<BodyTransform>(self.star)?;
        Some((star, transform.0))
    }

    /// Every planet still present, innermost first.
    pub fn planets(&self) -> Vec<PlanetView> {
        self.planets
            .iter()
            .filter_map(|&entity| self.planet_view(entity))
            .collect()
    }

    pub fn planet(&self, id: BodyId) -> Option<PlanetView> {
        self.planets().into_iter().find(|view| view.id == id)
    }

    pub fn planet_body(&self, id: BodyId) -> Option<&PlanetBody> {
        let view = self.planet(id)?;
        self.world.get::<Planet>(view.entity).map(|planet| &planet.body)
    }

    fn planet_view(&self, entity: Entity) -> Option<PlanetView> {
        let planet = self.world.get::<Planet>(entity)?;
        let transform = self.world.get::<BodyTransform>(entity)?;
        let collidable = self.world.get::<Collidable>(entity)?;
        Some(PlanetView {
            entity,
            id: collidable.0,
            index: planet.index,
            frame: transform.0,
            outer_radius: planet.body.outer_radius(),
            surface_gravity: planet.body.surface_gravity(),
        })
    }

    /// Planet whose center is nearest to `point`.
    pub fn nearest_planet(&self, point: Vec3) -> Option<PlanetView> {
        self.planets().into_iter().min_by(|a, b| {
            a.frame
                .position
                .distance_squared(point)
                .total_cmp(&b.frame.position.distance_squared(point))
        })
    }

    /// Regenerate a planet with new settings and swap its collider.
    ///
    /// On failure the planet keeps its old geometry.
    pub fn regenerate_planet(
        &mut self,
        id: BodyId,
        config: PlanetGenConfig,
        seed: u64,
    ) -> Result<(), SystemError> {
        let view = self.planet(id).ok_or(SystemError::UnknownBody(id))?;
        let mut planet = self
            .world
            .get_mut::<Planet>(view.entity)
            .ok_or(SystemError::UnknownBody(id))?;
        planet
            .body
            .regenerate_with(config, seed)
            .map_err(|source| SystemError::Planet {
                index: view.index,
                source,
            })?;
        let shape = planet.body.collider_shape();
        let surface = planet.body.surface_info();

        if let Some(shape) = shape {
            self.world
                .resource_mut::<PhysicsScene>()
                .replace_shape(id, shape, surface);
        }
        Ok(())
    }

    /// Remove a planet from the world and the scene.
    pub fn despawn_planet(&mut self, id: BodyId) -> bool {
        let Some(view) = self.planet(id) else {
            return false;
        };
        self.world.despawn(view.entity);
        self.planets.retain(|&entity| entity != view.entity);
        self.world.resource_mut::<PhysicsScene>().remove(id).is_some()
    }

    pub fn scene(&self) -> &PhysicsScene {
        self.world.resource::<PhysicsScene>()
    }

    pub fn clock(&self) -> SimClock {
        *self.world.resource::<SimClock>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
