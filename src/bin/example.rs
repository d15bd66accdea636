use link_cut_forest::{LinkCutForest, NodeHandle, LCF};

fn query(f: &mut LCF, u: NodeHandle, v: NodeHandle) {
    println!(
        "Sum of the path from {} to {}: {}",
        f.value(u),
        f.value(v),
        f.path_query(u, v)
    );
}

fn connected(f: &mut LCF, u: NodeHandle, v: NodeHandle) {
    println!(
        "Are {} and {} connected? {}",
        f.value(u),
        f.value(v),
        if f.are_connected(u, v) { "Yes" } else { "No" }
    );
}

fn main() {
    let mut f = LCF::new();
    let n: Vec<_> = (0..5)
        .map(|i| f.create_node(i, (i + 1) as f64))
        .collect();
    f.link(n[1], n[0]);
    f.link(n[2], n[0]);
    f.link(n[3], n[1]);
    f.link(n[4], n[1]);
    println!("Built a tree: 0 above 1 and 2, 1 above 3 and 4");
    query(&mut f, n[3], n[2]);
    println!("Adding 10 across that path");
    f.path_update(n[3], n[2], 10.0);
    query(&mut f, n[3], n[2]);
    println!("Cutting 1 from its parent");
    f.cut(n[1]);
    connected(&mut f, n[0], n[3]);
    connected(&mut f, n[1], n[3]);
    query(&mut f, n[4], n[3]);
}
