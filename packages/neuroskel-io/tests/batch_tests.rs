//! Batch reading tests
//!
//! Folder fixtures live in tempdirs; per-item failure policy and the
//! discovery options are exercised end to end.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use neuroskel_io::{
    read_nml, read_nml_sources, read_nml_with, read_nmx, read_nmx_sources, CollectSink, Parallel,
    Payload, ReadOptions, SkipReason, SourceItem,
};
use pretty_assertions::assert_eq;

fn valid_nml(name: &str) -> String {
    format!(
        r#"<things>
  <thing id="1" name="{name}">
    <nodes>
      <node id="1" radius="1" x="0" y="0" z="0"/>
      <node id="2" radius="1" x="1" y="1" z="1"/>
    </nodes>
    <edges>
      <edge source="1" target="2"/>
    </edges>
  </thing>
</things>"#
    )
}

/// Dangling edge: structurally broken, fails in the canonicalizer.
fn broken_nml() -> &'static str {
    r#"<things>
  <thing id="1">
    <nodes>
      <node id="1" radius="1" x="0" y="0" z="0"/>
    </nodes>
    <edges>
      <edge source="1" target="99"/>
    </edges>
  </thing>
</things>"#
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn folder_read_skips_bad_files_and_keeps_going() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "a.nml", &valid_nml("a"));
    write_file(dir.path(), "b.nml", &valid_nml("b"));
    write_file(dir.path(), "z_broken.nml", broken_nml());

    let sink = CollectSink::new();
    let batch = read_nml_with(dir.path(), &ReadOptions::new(), sink.clone()).unwrap();

    assert_eq!(batch.len(), 3);
    let names: Vec<_> = batch
        .skeletons()
        .map(|t| t.meta().name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);

    let skips: Vec<_> = batch.skipped().collect();
    assert_eq!(skips.len(), 1);
    match skips[0] {
        SkipReason::ReadFailed { path, error } => {
            assert!(path.ends_with("z_broken.nml"));
            assert!(error.contains("unknown node 99"), "got: {error}");
        }
        other => panic!("expected ReadFailed, got {other:?}"),
    }
    assert_eq!(sink.messages().len(), 1);
}

#[test]
fn single_file_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "broken.nml", broken_nml());

    assert!(read_nml(&path, &ReadOptions::new()).is_err());
}

#[test]
fn single_file_read_records_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "one.nml", &valid_nml("one"));

    let batch = read_nml(&path, &ReadOptions::new()).unwrap();
    assert_eq!(batch.len(), 1);
    let tree = batch.into_skeletons().remove(0);
    assert_eq!(tree.meta().file.as_deref(), Some(path.as_path()));
}

#[test]
fn limit_caps_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..5 {
        write_file(dir.path(), &format!("n{i}.nml"), &valid_nml(&format!("n{i}")));
    }

    let batch = read_nml(dir.path(), &ReadOptions::new().limit(2)).unwrap();
    assert_eq!(batch.len(), 2);
}

#[test]
fn subdirectories_require_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "top.nml", &valid_nml("top"));
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    write_file(&dir.path().join("nested"), "deep.nml", &valid_nml("deep"));

    let flat = read_nml(dir.path(), &ReadOptions::new()).unwrap();
    assert_eq!(flat.len(), 1);

    let deep = read_nml(dir.path(), &ReadOptions::new().include_subdirs(true)).unwrap();
    assert_eq!(deep.len(), 2);
}

#[test]
fn explicit_worker_pool_matches_serial_results() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..6 {
        write_file(dir.path(), &format!("n{i}.nml"), &valid_nml(&format!("n{i}")));
    }

    let serial = read_nml(dir.path(), &ReadOptions::new().parallel(Parallel::Off)).unwrap();
    let pooled = read_nml(dir.path(), &ReadOptions::new().parallel(Parallel::Workers(2))).unwrap();

    let names = |b: &neuroskel_io::SkeletonBatch| -> Vec<String> {
        b.skeletons()
            .map(|t| t.meta().name.clone().unwrap())
            .collect()
    };
    assert_eq!(names(&serial), names(&pooled));
    assert_eq!(pooled.len(), 6);
}

#[test]
fn nmx_folder_mixes_skeletons_and_skips() {
    let dir = tempfile::tempdir().unwrap();

    let with_member = build_zip(&[("n1/skeleton.nml", &valid_nml("archived"))]);
    std::fs::write(dir.path().join("good.nmx"), &with_member).unwrap();

    let without_member = build_zip(&[("n2/readme.txt", "no skeleton here")]);
    std::fs::write(dir.path().join("empty.nmx"), &without_member).unwrap();

    let batch = read_nmx(dir.path(), &ReadOptions::new()).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.skeletons().count(), 1);
    assert_eq!(
        batch.skipped().next(),
        Some(&SkipReason::NoSkeletonMember {
            archive: "empty".to_string()
        })
    );
}

#[test]
fn preloaded_nml_sources_accept_text_and_bytes() {
    let sources = vec![
        SourceItem {
            path: PathBuf::from("as_text.nml"),
            payload: Payload::Text(valid_nml("text")),
        },
        SourceItem {
            path: PathBuf::from("as_bytes.nml"),
            payload: Payload::Binary(valid_nml("bytes").into_bytes()),
        },
    ];

    let sink = CollectSink::new();
    let batch = read_nml_sources(sources, &ReadOptions::new(), sink);
    assert_eq!(batch.skeletons().count(), 2);
}

#[test]
fn preloaded_nmx_text_source_becomes_a_skip() {
    let sources = vec![SourceItem {
        path: PathBuf::from("mislabeled.nmx"),
        payload: Payload::Text("<things/>".to_string()),
    }];

    let sink = CollectSink::new();
    let batch = read_nmx_sources(sources, &ReadOptions::new(), sink.clone());

    assert_eq!(batch.skeletons().count(), 0);
    let skips: Vec<_> = batch.skipped().collect();
    assert_eq!(skips.len(), 1);
    assert!(sink.messages()[0].contains("binary"));
}

fn build_zip(members: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        for (name, content) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}
