use env_logger::Env;
use glam::{DVec2, DVec3, IVec3};
use hermite_octree::{sdf_primitives::*, Octree, OctreeSettings};
use log::info;
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // let field = |p: DVec3| torus(DVec2::new(4.0, 2.0), p);
    // let field = |p: DVec3| {
    //     torus(DVec2::new(4.0, 2.0), p)
    //         .max(plane(DVec3::ZERO, DVec3::ONE.normalize(), p))
    //         .max(-torus(DVec2::new(4.0, 1.5), p))
    // };
    let field = |p: DVec3| {
        cube(DVec3::splat(8.0), p)
            .max(-tri_prism(p, DVec2::new(10.0, 1.0)))
            .max(-torus(DVec2::new(4.0, 2.0), p - DVec3::splat(5.0)))
            .max(-octahedron(p + DVec3::splat(3.5), 4.20))
    };

    let settings = OctreeSettings::new(IVec3::splat(-16), 32, 1e-4);

    let build_t0 = Instant::now();
    let mut octree = match Octree::construct(&field, settings.min, settings.size) {
        Ok(octree) => octree,
        Err(e) => {
            eprintln!("bad domain: {e}");
            return;
        }
    };
    info!("octree construction took {} us", build_t0.elapsed().as_micros());
    let leaves_before = octree.leaf_count();

    let simplify_t0 = Instant::now();
    octree.simplify(settings.threshold);
    info!("simplification took {} us", simplify_t0.elapsed().as_micros());

    let contour_t0 = Instant::now();
    let mut mesh = octree.generate_mesh();
    info!("dual contour took {} us", contour_t0.elapsed().as_micros());

    println!("# leaves = {leaves_before} -> {}", octree.leaf_count());
    println!("# octree nodes = {}", octree.node_count());

    mesh.repair_sharp_normals(0.95);

    println!("# isosurface vertices = {}", mesh.vertex_count());
    println!("# isosurface triangles = {}", mesh.triangle_count());
}
