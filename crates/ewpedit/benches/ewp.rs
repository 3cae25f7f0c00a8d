use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use ewpedit::{add_file, parse, serialize};

const SMALL_EWP: &str = "<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\n<project>\n  <fileVersion>3</fileVersion>\n  <group>\n    <name>App</name>\n    <file>\n      <name>$PROJ_DIR$\\main.c</name>\n    </file>\n  </group>\n</project>\n";

/// A project with `groups` groups of `files` files each
fn large_ewp(groups: usize, files: usize) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\n<project>\n");
    for g in 0..groups {
        out.push_str(&format!("  <group>\n    <name>Group{g}</name>\n"));
        for f in 0..files {
            out.push_str(&format!(
                "    <file>\n      <name>$PROJ_DIR$\\src\\g{g}\\file{f}.c</name>\n    </file>\n"
            ));
        }
        out.push_str("  </group>\n");
    }
    out.push_str("</project>\n");
    out
}

fn bench_parse(c: &mut Criterion) {
    let large = large_ewp(50, 40);
    c.bench_function("ewp_parse_small", |b| {
        b.iter(|| parse(black_box(SMALL_EWP.as_bytes())))
    });
    c.bench_function("ewp_parse_large", |b| {
        b.iter(|| parse(black_box(large.as_bytes())))
    });
}

fn bench_serialize(c: &mut Criterion) {
    let Ok(project) = parse(large_ewp(50, 40).as_bytes()) else {
        return;
    };
    c.bench_function("ewp_serialize_large", |b| {
        b.iter(|| serialize(black_box(&project)))
    });
}

fn bench_add_file(c: &mut Criterion) {
    let large = large_ewp(50, 40);
    c.bench_function("ewp_add_file_present", |b| {
        b.iter(|| add_file(black_box(large.as_bytes()), black_box("$PROJ_DIR$/src/g49/file39.c")))
    });
    c.bench_function("ewp_add_file_absent", |b| {
        b.iter(|| add_file(black_box(large.as_bytes()), black_box("new.c")))
    });
}

criterion_group!(benches, bench_parse, bench_serialize, bench_add_file);
criterion_main!(benches);
