//! Benchmark workloads.
//!
//! Generates catalog-shaped key sets so that benchmarks exercise realistic
//! fan-out: a few namespaces, more tables per namespace and many fields per
//! table.

/// Generates `count` dotted paths of the form `ns{i}.t{j}.f{k}`.
///
/// Paths are produced in a scrambled order so that inserts do not always
/// append at the right edge of a node.
pub fn catalog_paths(count: usize) -> Vec<String> {
    let mut paths: Vec<String> = (0..count)
        .map(|i| format!("ns{}.t{}.f{}", i % 8, (i / 8) % 64, i / 512))
        .collect();
    // fixed stride permutation keeps runs reproducible
    let len = paths.len();
    if len > 1 {
        let stride = (len / 2) | 1;
        let mut scrambled = Vec::with_capacity(len);
        let mut index = 0;
        let step = if gcd(stride, len) == 1 { stride } else { 1 };
        for _ in 0..len {
            scrambled.push(std::mem::take(&mut paths[index]));
            index = (index + step) % len;
        }
        paths = scrambled;
    }
    paths
}

/// Splits a dotted path into owned segments.
pub fn segments(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
