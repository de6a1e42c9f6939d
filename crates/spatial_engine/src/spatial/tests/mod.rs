//! Scenario tests across bounds, quadtree and region partition

use approx::assert_relative_eq;

use crate::config::SpatialConfig;
use crate::ecs::{EntityId, EntityTraits, SpatialEntity, World};
use crate::foundation::logging;
use crate::foundation::math::{utils, Orientation, Vec3};
use crate::physics::{Aabb, Bounds, BoundsCollisionType, Geometry, Sphere};
use crate::spatial::{EntityRegionSpatialPartition, PartitionContext, PartitionContextFlags, PartitionId};

const EPSILON: f32 = 1e-5;

fn placed(geometry: Geometry, position: Vec3, orientation: Orientation) -> Bounds {
    let mut bounds = Bounds::with_geometry(geometry, BoundsCollisionType::Blocking);
    bounds.set_orientation(orientation);
    bounds.set_center(position);
    bounds
}

fn sphere_at(radius: f32, position: Vec3) -> Bounds {
    placed(Geometry::new_sphere(radius), position, Orientation::ZERO)
}

fn every_shape(position: Vec3, orientation: Orientation) -> Vec<Bounds> {
    vec![
        placed(Geometry::new_box(4.0, 2.0, 3.0, false, &orientation), position, orientation),
        placed(Geometry::new_box(4.0, 2.0, 3.0, true, &orientation), position, orientation),
        placed(Geometry::new_capsule(1.0, 2.0), position, orientation),
        placed(Geometry::new_sphere(1.5), position, orientation),
        placed(Geometry::new_triangle(60.0, 1.0, 6.0), position, orientation),
        placed(Geometry::new_wedge(60.0, 1.0, 6.0, 2.0), position, orientation),
    ]
}

fn world() -> World {
    logging::try_init();
    World::from_config(&SpatialConfig::default()).unwrap()
}

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort();
    ids
}

#[test]
fn test_sphere_insert_move_and_requery() {
    let mut world = world();
    let id = world.spawn(sphere_at(10.0, Vec3::zeros()), EntityTraits::empty(), None);

    let volume = Aabb::new(Vec3::repeat(-5.0), Vec3::repeat(5.0));
    assert!(world.get(id).unwrap().bounds().intersects_aabb(&volume));
    let found: Vec<_> = world.partition().iterate_elements_in_volume(volume, PartitionContext::all()).collect();
    assert_eq!(found, vec![id]);

    assert!(world.set_position(id, Vec3::new(100.0, 0.0, 0.0)));
    let found: Vec<_> = world.partition().iterate_elements_in_volume(volume, PartitionContext::all()).collect();
    assert!(found.is_empty());
}

#[test]
fn test_wedge_triangles_share_diagonal() {
    let wedge = placed(Geometry::new_wedge(60.0, 1.0, 10.0, 4.0), Vec3::zeros(), Orientation::ZERO);
    let [first, second] = wedge.wedge_triangles().unwrap();

    let shared = first
        .points()
        .iter()
        .filter(|a| second.points().iter().any(|b| (*a - b).norm() < EPSILON))
        .count();
    assert_eq!(shared, 2);

    // The wide edge sits a third of the length in front of the center
    let front = first.points()[2];
    assert_relative_eq!(front.x, 10.0 / 3.0, epsilon = 1e-4);
}

#[test]
fn test_sphere_sweep_through_bounds() {
    let mover = sphere_at(1.0, Vec3::zeros());
    let target = sphere_at(1.0, Vec3::new(10.0, 0.0, 0.0));
    let hit = mover
        .sweep(&target, &Vec3::new(10.0, 0.0, 0.0), &Vec3::zeros())
        .unwrap();
    assert_relative_eq!(hit.time, 0.8, epsilon = EPSILON);
}

#[test]
fn test_intersection_is_symmetric() {
    let orientations = [Orientation::ZERO, Orientation::from_yaw(utils::deg_to_rad(35.0))];
    let offsets = [
        Vec3::zeros(),
        Vec3::new(2.5, 0.0, 0.0),
        Vec3::new(3.0, 3.0, 0.0),
        Vec3::new(0.0, 4.5, 1.0),
        Vec3::new(-5.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 6.5),
    ];

    for orientation in orientations {
        let anchors = every_shape(Vec3::zeros(), Orientation::ZERO);
        for offset in offsets {
            let movers = every_shape(offset, orientation);
            for a in &anchors {
                for b in &movers {
                    assert_eq!(
                        a.intersects(b),
                        b.intersects(a),
                        "{} vs {} at {offset:?}",
                        a.geometry().kind(),
                        b.geometry().kind()
                    );
                }
            }
        }
    }
}

#[test]
fn test_aabb_encloses_shape() {
    let orientation = Orientation::new(utils::deg_to_rad(30.0), 0.0, 0.0);
    for bounds in every_shape(Vec3::new(7.0, -3.0, 2.0), orientation) {
        let aabb = bounds.to_aabb().expanded(1e-4);
        let c = bounds.center();

        let samples: Vec<Vec3> = match *bounds.geometry() {
            Geometry::Sphere { radius } => [Vec3::x(), -Vec3::x(), Vec3::y(), -Vec3::y(), Vec3::z(), -Vec3::z()]
                .iter()
                .map(|d| c + d * radius)
                .collect(),
            Geometry::Capsule { radius, half_height } => vec![
                c + Vec3::new(0.0, 0.0, half_height + radius),
                c - Vec3::new(0.0, 0.0, half_height + radius),
                c + Vec3::new(radius, 0.0, half_height),
                c - Vec3::new(0.0, radius, half_height),
            ],
            Geometry::Obb { half_extents } | Geometry::Aabb { half_extents, .. } => {
                let rotation = bounds.orientation().rotation();
                let mut corners = Vec::new();
                for sx in [-1.0, 1.0] {
                    for sy in [-1.0, 1.0] {
                        for sz in [-1.0, 1.0] {
                            let local = half_extents.component_mul(&Vec3::new(sx, sy, sz));
                            corners.push(c + rotation * local);
                        }
                    }
                }
                corners
            }
            Geometry::Triangle { half_height, .. } => bounds
                .to_triangle()
                .unwrap()
                .points()
                .iter()
                .flat_map(|p| [p + Vec3::z() * half_height, p - Vec3::z() * half_height])
                .collect(),
            Geometry::Wedge { half_height, .. } => bounds
                .wedge_vertices()
                .unwrap()
                .iter()
                .flat_map(|p| [p + Vec3::z() * half_height, p - Vec3::z() * half_height])
                .collect(),
            Geometry::None => Vec::new(),
        };

        for sample in samples {
            assert!(aabb.contains_point(&sample), "{} misses {sample:?}", bounds.geometry().kind());
        }
    }
}

#[test]
fn test_aabb_is_tight_for_round_shapes() {
    let sphere = sphere_at(2.0, Vec3::new(1.0, 1.0, 1.0));
    assert_relative_eq!(sphere.to_aabb().extents(), Vec3::repeat(2.0), epsilon = EPSILON);

    let capsule = placed(Geometry::new_capsule(1.0, 3.0), Vec3::zeros(), Orientation::ZERO);
    assert_relative_eq!(capsule.to_aabb().extents(), Vec3::new(1.0, 1.0, 4.0), epsilon = EPSILON);
}

#[test]
fn test_scale_round_trip() {
    let orientation = Orientation::from_yaw(0.4);
    for original in every_shape(Vec3::zeros(), orientation) {
        let mut bounds = original;
        bounds.scale(2.5);
        bounds.scale(1.0 / 2.5);

        match (*original.geometry(), *bounds.geometry()) {
            (Geometry::Triangle { base: b0, length: l0, .. }, Geometry::Triangle { base: b1, length: l1, .. })
            | (Geometry::Wedge { base: b0, length: l0, .. }, Geometry::Wedge { base: b1, length: l1, .. }) => {
                assert_relative_eq!((b0 * 0.5 / l0).atan(), (b1 * 0.5 / l1).atan(), epsilon = EPSILON);
                assert_relative_eq!(l0, l1, epsilon = 1e-4);
            }
            _ => {
                assert_relative_eq!(original.radius(), bounds.radius(), epsilon = 1e-4);
                assert_relative_eq!(original.half_height(), bounds.half_height(), epsilon = 1e-4);
                assert_relative_eq!(original.to_aabb().extents(), bounds.to_aabb().extents(), epsilon = 1e-4);
            }
        }
    }
}

#[test]
fn test_triangle_scale_keeps_apex_angle() {
    let mut bounds = placed(Geometry::new_triangle(50.0, 1.0, 8.0), Vec3::zeros(), Orientation::ZERO);
    bounds.scale(3.0);
    let Geometry::Triangle { base, length, .. } = *bounds.geometry() else {
        panic!("expected a triangle");
    };
    assert_relative_eq!(length, 24.0, epsilon = 1e-4);
    assert_relative_eq!((base * 0.5 / length).atan(), utils::deg_to_rad(25.0), epsilon = EPSILON);
}

#[test]
fn test_insert_remove_round_trip() {
    let mut world = world();
    let baseline = world.spawn(sphere_at(1.0, Vec3::zeros()), EntityTraits::empty(), None);
    let before = world.partition().total_elements();

    let traits = [
        EntityTraits::empty(),
        EntityTraits::AVATAR,
        EntityTraits::HOTSPOT,
        EntityTraits::NEVER_AFFECTED_BY_POWERS,
    ];
    for (i, traits) in traits.into_iter().enumerate() {
        let restricted = (i % 2 == 1).then_some(9);
        let id = world.spawn(sphere_at(1.0, Vec3::new(i as f32 * 50.0, 0.0, 0.0)), traits, restricted);
        let entity = world.despawn(id).unwrap();
        assert!(!entity.spatial_location().is_valid());
        assert_eq!(world.partition().total_elements(), before);
    }
    assert_eq!(world.partition().avatar_count(), 0);
    assert!(world.get(baseline).is_some());
}

#[test]
fn test_query_has_no_bucketing_errors() {
    let mut world = world();
    let mut seed: u32 = 12_345;
    let mut next = move || {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (seed >> 8) as f32 / (1u32 << 24) as f32
    };

    let mut ids = Vec::new();
    for _ in 0..300 {
        let position = Vec3::new(next() * 6000.0 - 3000.0, next() * 6000.0 - 3000.0, next() * 100.0);
        let radius = 1.0 + next() * 200.0;
        ids.push(world.spawn(sphere_at(radius, position), EntityTraits::empty(), None));
    }

    for id in &ids {
        let center = world.get(*id).unwrap().bounds().center();
        let query = Sphere::new(center, 1.0);
        let found: Vec<_> = world.partition().iterate_elements_in_volume(query, PartitionContext::all()).collect();
        assert!(found.contains(id));

        for other in found {
            let aabb = world.get(other).unwrap().bounds().to_aabb();
            assert!(query.intersects_aabb(&aabb));
        }
    }
}

#[test]
fn test_abandoned_query_releases_scratch() {
    let mut world = world();
    for i in 0..20 {
        world.spawn(sphere_at(1.0, Vec3::new(i as f32 * 3.0, 0.0, 0.0)), EntityTraits::empty(), Some(4));
        world.spawn(sphere_at(1.0, Vec3::new(i as f32 * 3.0, 5.0, 0.0)), EntityTraits::empty(), None);
    }

    let volume = Sphere::new(Vec3::zeros(), 500.0);
    for found in world.partition().iterate_elements_in_volume(volume, PartitionContext::all()) {
        if world.get(found).is_some() {
            break;
        }
    }

    let partition = world.partition();
    assert_eq!(partition.tree(PartitionId::Primary).unwrap().iterators_in_flight(), 0);
    assert_eq!(partition.tree(PartitionId::PlayerRestricted(4)).unwrap().iterators_in_flight(), 0);

    // A fresh query after the early exit still sees everything
    assert_eq!(partition.iterate_elements_in_volume(volume, PartitionContext::all()).count(), 40);
}

#[test]
fn test_avatar_iteration() {
    let mut world = world();
    let near = world.spawn(sphere_at(1.0, Vec3::new(5.0, 0.0, 0.0)), EntityTraits::AVATAR, None);
    world.spawn(sphere_at(1.0, Vec3::new(50.0, 0.0, 0.0)), EntityTraits::AVATAR, None);
    world.spawn(sphere_at(1.0, Vec3::new(4.0, 0.0, 0.0)), EntityTraits::empty(), None);
    world.spawn(sphere_at(1.0, Vec3::new(3.0, 0.0, 0.0)), EntityTraits::AVATAR, Some(8));
    assert_eq!(world.partition().avatar_count(), 2);

    let sphere = Sphere::new(Vec3::zeros(), 10.0);
    let found: Vec<_> = world.partition().iterate_avatars_in_volume(sphere).collect();
    assert_eq!(found, vec![near]);

    // Avatar positions follow updates
    assert!(world.set_position(near, Vec3::new(500.0, 0.0, 0.0)));
    assert_eq!(world.partition().iterate_avatars_in_volume(sphere).count(), 0);
}

#[test]
fn test_reinsert_does_not_duplicate_avatar() {
    let mut partition = EntityRegionSpatialPartition::from_config(&SpatialConfig::default()).unwrap();
    let mut world = world();
    let id = world.spawn(sphere_at(1.0, Vec3::zeros()), EntityTraits::AVATAR, None);
    let mut entity = world.despawn(id).unwrap();

    partition.insert(&mut entity);
    partition.insert(&mut entity);
    assert_eq!(partition.avatar_count(), 1);
    assert_eq!(partition.total_elements(), 1);

    assert!(partition.remove(&mut entity));
    assert!(!partition.remove(&mut entity));
    assert_eq!(partition.total_elements(), 0);
}

#[test]
fn test_partition_routing() {
    let mut world = world();
    let here = Vec3::zeros();
    let solid = world.spawn(sphere_at(1.0, here), EntityTraits::empty(), None);
    let immune = world.spawn(sphere_at(1.0, here), EntityTraits::NEVER_AFFECTED_BY_POWERS, None);
    let passive = world.spawn(sphere_at(1.0, here), EntityTraits::HOTSPOT, None);
    let blocking_hotspot = world.spawn(
        sphere_at(1.0, here),
        EntityTraits::HOTSPOT | EntityTraits::COLLIDABLE_HOTSPOT,
        None,
    );
    let loot = world.spawn(sphere_at(1.0, here), EntityTraits::NEVER_AFFECTED_BY_POWERS, Some(42));

    let partition_of = |id| world.get(id).unwrap().spatial_location().partition();
    assert_eq!(partition_of(solid), Some(PartitionId::Primary));
    assert_eq!(partition_of(immune), Some(PartitionId::NotAffectedByPowers));
    assert_eq!(partition_of(passive), Some(PartitionId::NotAffectedByPowers));
    assert_eq!(partition_of(blocking_hotspot), Some(PartitionId::Primary));
    assert_eq!(partition_of(loot), Some(PartitionId::PlayerRestricted(42)));
    assert_eq!(world.partition().player_restricted_partition_count(), 1);

    let volume = Sphere::new(here, 5.0);
    let query = |context| sorted(world.partition().iterate_elements_in_volume(volume, context).collect());

    assert_eq!(query(PartitionContext::all()).len(), 5);
    assert!(query(PartitionContext::for_player(42)).contains(&loot));
    assert!(!query(PartitionContext::for_player(7)).contains(&loot));
    assert_eq!(
        query(PartitionContext::new(PartitionContextFlags::PRIMARY, None)),
        sorted(vec![solid, blocking_hotspot])
    );
    assert_eq!(
        query(PartitionContext::new(PartitionContextFlags::PLAYER_RESTRICTED, None)),
        vec![loot]
    );
}

#[test]
fn test_composed_iteration_drains_each_tree() {
    let mut world = world();
    let here = Vec3::new(10.0, 10.0, 0.0);
    let immune = world.spawn(sphere_at(1.0, here), EntityTraits::NEVER_AFFECTED_BY_POWERS, None);
    let restricted = world.spawn(sphere_at(1.0, here), EntityTraits::empty(), Some(3));
    let primary = world.spawn(sphere_at(1.0, here), EntityTraits::empty(), None);

    let mut out = Vec::new();
    let added = world
        .partition()
        .get_elements_in_volume(&mut out, Sphere::new(here, 2.0), PartitionContext::all());
    assert_eq!(added, 3);
    assert_eq!(out, vec![primary, restricted, immune]);
}
