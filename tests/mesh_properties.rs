use approx::assert_abs_diff_eq;
use glam::{DVec3, IVec3};
use hermite_octree::{
    build_octree, qef::QefSolver, Cuboid, Error, Mesh, NodeKind, Octree, OctreeNode,
    OctreeSettings, Sdf, Sphere,
};

fn sphere_settings(threshold: f64) -> OctreeSettings {
    OctreeSettings::new(IVec3::splat(-4), 8, threshold)
}

fn leaf_like(root: &OctreeNode) -> Vec<&OctreeNode> {
    fn collect<'a>(node: &'a OctreeNode, out: &mut Vec<&'a OctreeNode>) {
        if node.is_leaf_like() {
            out.push(node);
        }
        for child in node.children() {
            collect(child, out);
        }
    }
    let mut out = vec![];
    collect(root, &mut out);
    out
}

#[test]
fn sphere_mesh_hugs_surface() {
    let sphere = Sphere::new(2.5);
    let mut octree = Octree::build(&sphere, &sphere_settings(1e-6)).unwrap();
    let mesh = octree.generate_mesh();

    assert!(mesh.triangle_count() > 0);
    assert!(mesh.vertex_count() > 0);

    // Tangent planes of a convex surface meet outside of it, and crossings are
    // only located to within half a sampling step, so vertices drift by up to
    // ~0.13 in the worst cells.
    let deviations: Vec<f64> = mesh
        .positions()
        .map(|p| (p.length() - 2.5).abs())
        .collect();
    let max = deviations.iter().cloned().fold(0.0, f64::max);
    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    assert!(max < 0.15, "max deviation {max}");
    assert!(mean < 0.1, "mean deviation {mean}");

    for n in mesh.normals() {
        assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn field_without_sampled_solid_is_empty() {
    // Too small to contain any lattice point.
    let sphere = Sphere::new(0.01).with_center(DVec3::splat(0.5));
    let mut octree = Octree::build(&sphere, &sphere_settings(1e-6)).unwrap();
    assert!(octree.is_empty());
    assert_eq!(octree.leaf_count(), 0);

    let mesh = octree.generate_mesh();
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(mesh.triangle_count(), 0);
    assert_eq!(mesh, Mesh::default());

    let far = Sphere::new(0.01).with_center(DVec3::splat(100.0));
    assert!(build_octree(IVec3::splat(-4), 8, 1e-6, &far).is_none());
}

#[test]
fn tiny_solid_on_lattice_corner() {
    // The origin is a corner of the 8 unit cells around it, so they all see
    // one solid corner.
    let sphere = Sphere::new(0.01);
    let mut octree = Octree::construct(&sphere, IVec3::splat(-4), 8).unwrap();
    assert_eq!(octree.leaf_count(), 8);
    let mesh = octree.clone().generate_mesh();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);

    // All 8 crossings fit one point, so the whole tree collapses.
    octree.simplify(1e-6);
    assert_eq!(octree.leaf_count(), 1);
    let mesh = octree.generate_mesh();
    assert_eq!(mesh.vertex_count(), 1);
    assert_eq!(mesh.triangle_count(), 0);
}

#[test]
fn signs_and_containment() {
    let sphere = Sphere::new(2.5);
    for threshold in [0.0, 1e-6, 0.1, 1.0, 10.0] {
        let root = build_octree(IVec3::splat(-4), 8, threshold, &sphere).unwrap();
        let mut pseudo = 0;
        for node in leaf_like(&root) {
            assert!(node.children().next().is_none());
            pseudo += (node.kind == NodeKind::Pseudo) as usize;
            let info = node.draw_info.as_ref().unwrap();
            assert!(
                info.corner_signs != 0 && info.corner_signs != u8::MAX,
                "uniform corners on {:?} node at {} (threshold {threshold})",
                node.kind,
                node.min
            );

            let mass_point = QefSolver::from_data(info.qef).mass_point();
            assert!(node.contains_point(info.position) || info.position == mass_point);
        }
        if threshold >= 0.1 {
            assert!(pseudo > 0);
        }
    }
}

#[test]
fn triangles_index_leaf_vertices() {
    let sphere = Sphere::new(2.5);
    for threshold in [1e-6, 0.1, 1.0, 10.0] {
        let mut octree = Octree::build(&sphere, &sphere_settings(threshold)).unwrap();
        let mesh = octree.generate_mesh();
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(mesh.vertex_count(), octree.leaf_count());

        let root = octree.root().unwrap();
        let mut internal_ids = 0;
        root.visit(&mut |n| {
            if n.kind == NodeKind::Internal {
                assert!(n.draw_info.is_none());
                internal_ids += 1;
            }
        });
        assert!(internal_ids > 0);

        for [a, b, c] in mesh.triangles() {
            for i in [a, b, c] {
                assert!((i as usize) < mesh.vertex_count());
            }
        }
    }
}

#[test]
fn decimation_is_monotonic() {
    let field = |p: DVec3| {
        let torus = hermite_octree::sdf_primitives::torus(glam::DVec2::new(4.0, 1.5), p);
        torus.min(Sphere::new(2.0).with_center(DVec3::new(0.0, 3.0, 0.0)).distance(p))
    };
    let settings = OctreeSettings::new(IVec3::splat(-8), 16, 0.0);
    let mut last = usize::MAX;
    for threshold in [0.0, 1e-6, 1e-4, 1e-2, 0.1, 0.5, 2.0, 100.0] {
        let settings = OctreeSettings {
            threshold,
            ..settings
        };
        let mut octree = Octree::build(&field, &settings).unwrap();
        let vertices = octree.generate_mesh().vertex_count();
        assert!(vertices <= last, "{vertices} > {last} at {threshold}");
        last = vertices;
    }
}

#[test]
fn box_collapses_to_corners() {
    let cuboid = Cuboid::new(DVec3::splat(1.5));
    let settings = OctreeSettings::enclosing(cuboid.bounds().unwrap(), 1e-6).unwrap();
    assert_eq!(settings.min, IVec3::splat(-3));
    assert_eq!(settings.size, 8);

    // The padded domain isn't centered on the box, so use the symmetric one.
    let mut octree = Octree::build(&cuboid, &sphere_settings(1e-6)).unwrap();
    assert_eq!(octree.leaf_count(), 8);
    let mesh = octree.generate_mesh();
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    for p in mesh.positions() {
        assert_abs_diff_eq!(p.abs().x, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(p.abs().y, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(p.abs().z, 1.5, epsilon = 1e-6);
    }
}

#[test]
fn unsimplified_sphere_is_watertight() {
    let sphere = Sphere::new(2.5);
    let mut octree = Octree::construct(&sphere, IVec3::splat(-4), 8).unwrap();
    let mesh = octree.generate_mesh();

    let mut edges = std::collections::HashMap::<(u32, u32), u32>::new();
    for [a, b, c] in mesh.triangles() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            *edges.entry((u.min(v), u.max(v))).or_default() += 1;
        }
    }
    assert!(edges.values().all(|&n| n == 2));
    // Euler characteristic of a sphere.
    let v = mesh.vertex_count() as i64;
    let e = edges.len() as i64;
    let f = mesh.triangle_count() as i64;
    assert_eq!(v - e + f, 2);
}

#[test]
fn invalid_settings_are_rejected() {
    let sphere = Sphere::new(1.0);
    let bad_size = OctreeSettings::new(IVec3::ZERO, 10, 0.0);
    assert_eq!(
        Octree::build(&sphere, &bad_size).unwrap_err(),
        Error::SizeNotPowerOfTwo(10)
    );
    let bad_threshold = OctreeSettings::new(IVec3::ZERO, 8, -0.5);
    assert_eq!(
        Octree::build(&sphere, &bad_threshold).unwrap_err(),
        Error::InvalidThreshold(-0.5)
    );
}
