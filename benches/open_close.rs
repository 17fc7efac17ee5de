//! This bench test simulates a pinning run: open a module file, pin its tool
//! to a new version and write it back.

#![allow(missing_docs)]

use std::{fs, path::PathBuf};

use bingo_mod::{ModFile, ModuleVersion, Package};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;

/// Writes a module file with a large replace block next to the managed require
fn preseed_file(dir: &TempDir) -> PathBuf {
    let mut content = String::from(
        "module _ // Auto generated by https://github.com/bwplotka/bingo. DO NOT EDIT\n\ngo 1.14\n\nreplace (\n",
    );
    for i in 0..500 {
        content.push_str(&format!(
            "\tgithub.com/org/dep{i} => github.com/fork/dep{i} v0.0.0-20170110192607-30d10be49292\n"
        ));
    }
    content.push_str(
        ")\n\nrequire github.com/prometheus/prometheus v2.4.3+incompatible // cmd/prometheus CGO_ENABLED=1 -tags=netgo\n",
    );

    let path = dir.path().join("prometheus.mod");
    fs::write(&path, content).unwrap();
    path
}

fn open_set_close(c: &mut Criterion) {
    c.bench_function("open set close", |b| {
        b.iter_batched(
            || {
                let tmp_dir = TempDir::new().unwrap();
                let path = preseed_file(&tmp_dir);
                (tmp_dir, path)
            },
            |(_tmp_dir, path)| {
                let mut mod_file = ModFile::open(&path).unwrap();
                let package = Package::new(ModuleVersion::new(
                    "github.com/prometheus/prometheus",
                    "v2.5.0+incompatible",
                ))
                .with_rel_path("cmd/prometheus")
                .with_build_flags(["-tags=netgo"]);
                mod_file.set_direct_require(package);
                mod_file.close().unwrap();
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, open_set_close);
criterion_main!(benches);
