use earcut_rings::{deviation, Earcut};

fn main() {
    let quad = [[10, 0], [0, 50], [60, 60], [70, 10]];
    let rings = [quad];

    let mut earcut = Earcut::new();
    let mut count = 0;
    earcut
        .earcut(&rings, true, &mut |[a, b, c]: [[i32; 2]; 3]| {
            count += 1;
            println!("{:?} {:?} {:?}", a, b, c);
        })
        .unwrap();
    println!("{} triangles", count);

    let triangles = earcut.triangulate(&rings, true).unwrap();
    println!("deviation: {}", deviation(&rings, &triangles));
}
