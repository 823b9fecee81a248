use glam::{DVec2, DVec3, Vec3Swizzles};

pub fn sphere(r: f64, p: DVec3) -> f64 {
    p.length() - r
}

pub fn plane(o: DVec3, n: DVec3, p: DVec3) -> f64 {
    (p - o).dot(n)
}

pub fn torus(t: DVec2, p: DVec3) -> f64 {
    let q = DVec2::new(p.xz().length() - t.x, p.y);
    q.length() - t.y
}

pub fn cube(b: DVec3, p: DVec3) -> f64 {
    let q = p.abs() - b;
    q.max(DVec3::ZERO).length() + q.max_element().min(0.0)
}

pub fn octahedron(p: DVec3, s: f64) -> f64 {
    let p = p.abs();
    (p.x + p.y + p.z - s) * 0.57735027
}

pub fn tri_prism(p: DVec3, h: DVec2) -> f64 {
    let q = p.abs();
    (q.z - h.y).max((q.x * 0.866025 + p.y * 0.5).max(-p.y) - h.x * 0.5)
}
