//! End-to-end pack command tests.

mod helpers;

use helpers::*;
use ziplist::commands::{cmd_pack, PackOptions};
use ziplist::config::MissingAction;
use ziplist::report::Event;
use ziplist::resolve::Policy;
use ziplist::PackError;

fn pack_error(err: &anyhow::Error) -> &PackError {
    err.downcast_ref::<PackError>()
        .unwrap_or_else(|| panic!("expected a PackError, got: {:#}", err))
}

#[test]
fn test_pack_writes_mapping_in_order() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest(
        "# release package\n\
         Sounds/**\n\
         !**/*.wav\n\
         Debug/AgentExe.exe -> bin/Agent.exe\n\
         *.dll -> lib\n",
    );

    let outcome = cmd_pack(
        &env.options(&manifest),
        &config(Policy::Sequential, MissingAction::Abort),
    )
    .unwrap();

    let archive = env.archive_path();
    assert_eq!(outcome.output, archive);
    assert_eq!(outcome.archive.as_ref().map(|s| s.files), Some(5));
    assert_eq!(
        archive_names(&archive),
        vec![
            "b.mp3",
            "sub/c.ogg",
            "bin/Agent.exe",
            "lib/Ping.dll",
            "lib/SipVoice.dll"
        ]
    );
    assert_eq!(
        archive_entry(&archive, "bin/Agent.exe"),
        "contents of Debug/AgentExe.exe"
    );
    assert_not_exists(&env.root.join("pkg.zip.tmp"));
    let phases: Vec<_> = outcome.timings.iter().map(|t| t.phase).collect();
    assert_eq!(phases, vec!["Resolve", "Write archive"]);
}

#[test]
fn test_root_destination_keeps_file_name() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll -> .\nDebug/AgentExe.exe -> ./\n");

    let outcome = cmd_pack(
        &env.options(&manifest),
        &config(Policy::Sequential, MissingAction::Abort),
    )
    .unwrap();

    assert_eq!(outcome.resolution.arcnames(), vec!["Ping.dll", "AgentExe.exe"]);
    assert_eq!(
        archive_names(&env.archive_path()),
        vec!["Ping.dll", "AgentExe.exe"]
    );
}

#[test]
fn test_collision_archive_holds_later_source() {
    let env = TestEnv::new();
    env.write_file("a/flat.txt", "first");
    env.write_file("b/flat.txt", "second");
    let manifest = env.write_manifest("a/*.txt\nb/*.txt\n");

    for policy in [Policy::Sequential, Policy::Collect] {
        let outcome = cmd_pack(
            &env.options(&manifest),
            &config(policy, MissingAction::Abort),
        )
        .unwrap();
        assert_eq!(outcome.resolution.report.duplicate_count(), 1);
        assert_eq!(archive_names(&env.archive_path()), vec!["flat.txt"]);
        assert_eq!(archive_entry(&env.archive_path(), "flat.txt"), "second");
    }
}

#[test]
fn test_missing_rule_aborts_with_exit_code_2() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\nMissing/*.dll\n");

    let err = cmd_pack(
        &env.options(&manifest),
        &config(Policy::Sequential, MissingAction::Abort),
    )
    .unwrap_err();

    let err = pack_error(&err);
    assert!(matches!(err, PackError::RuleMatchedNothing { patterns } if patterns == &["Missing/*.dll"]));
    assert_eq!(err.exit_code(), 2);
    assert_not_exists(&env.archive_path());
}

#[test]
fn test_missing_rule_continue_packs_the_rest() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\nMissing/*.dll\n");

    let outcome = cmd_pack(
        &env.options(&manifest),
        &config(Policy::Collect, MissingAction::Continue),
    )
    .unwrap();

    assert!(outcome.resolution.report.has_missing_rules());
    assert_eq!(archive_names(&env.archive_path()), vec!["Ping.dll"]);
}

#[test]
fn test_missing_manifest_exit_code_1() {
    let env = TestEnv::new();
    let err = cmd_pack(
        &env.options(&env.root.join("absent.ziplist")),
        &config(Policy::Sequential, MissingAction::Abort),
    )
    .unwrap_err();

    let err = pack_error(&err);
    assert!(matches!(err, PackError::ManifestNotFound { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_missing_source_dir() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\n");
    let options = PackOptions {
        source_dir: Some(env.root.join("bin")),
        ..env.options(&manifest)
    };

    let err = cmd_pack(&options, &config(Policy::Sequential, MissingAction::Abort)).unwrap_err();
    assert!(matches!(
        pack_error(&err),
        PackError::SourceDirectoryNotFound { .. }
    ));
}

#[test]
fn test_dry_run_writes_nothing() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("*.dll\n");
    let options = PackOptions {
        dry_run: true,
        ..env.options(&manifest)
    };

    let outcome = cmd_pack(&options, &config(Policy::Sequential, MissingAction::Abort)).unwrap();
    assert!(outcome.archive.is_none());
    assert_eq!(outcome.resolution.arcnames(), vec!["Ping.dll", "SipVoice.dll"]);
    assert_not_exists(&env.archive_path());
}

#[test]
fn test_empty_mapping_writes_no_archive() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\n!Ping.dll\n");

    let outcome = cmd_pack(
        &env.options(&manifest),
        &config(Policy::Sequential, MissingAction::Abort),
    )
    .unwrap();

    assert!(outcome.resolution.is_empty());
    assert!(outcome.archive.is_none());
    assert_not_exists(&env.archive_path());
}

#[test]
fn test_report_json_written() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\nMissing/*.dll\n");
    let report = env.root.join("report.json");
    let options = PackOptions {
        report_json: Some(report.clone()),
        ..env.options(&manifest)
    };

    cmd_pack(&options, &config(Policy::Sequential, MissingAction::Continue)).unwrap();

    assert_file_exists(&report);
    assert_file_contains(&report, "\"rule_matched_nothing\"");
    assert_file_contains(&report, "\"Missing/*.dll\"");
}

#[test]
fn test_previous_archive_not_packed_into_itself() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("**\n!pkg.ziplist\n");
    let cfg = config(Policy::Sequential, MissingAction::Abort);

    cmd_pack(&env.options(&manifest), &cfg).unwrap();
    let first = archive_names(&env.archive_path());

    cmd_pack(&env.options(&manifest), &cfg).unwrap();
    let second = archive_names(&env.archive_path());

    assert!(!second.iter().any(|n| n == "pkg.zip"));
    assert_eq!(first, second);
}

#[test]
fn test_previous_archive_skipped_through_relative_source_dir() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("**\n!pkg.ziplist\n");
    let options = PackOptions {
        source_dir: Some(env.root.join("../Release")),
        ..env.options(&manifest)
    };
    let cfg = config(Policy::Sequential, MissingAction::Abort);

    cmd_pack(&options, &cfg).unwrap();
    let outcome = cmd_pack(&options, &cfg).unwrap();

    let names = archive_names(&env.archive_path());
    assert!(!names.iter().any(|n| n == "pkg.zip"), "{:?}", names);
    assert!(outcome
        .resolution
        .report
        .events
        .iter()
        .any(|e| matches!(e, Event::OutputSkipped { path, .. } if path == "pkg.zip")));
}

#[test]
fn test_output_dir_created() {
    let env = TestEnv::with_sample_tree();
    let manifest = env.write_manifest("Ping.dll\n");
    let out_dir = env.root.join("dist/nested");
    let mut cfg = config(Policy::Sequential, MissingAction::Abort);
    cfg.output_dir = Some(out_dir.clone());

    let outcome = cmd_pack(&env.options(&manifest), &cfg).unwrap();

    assert_eq!(outcome.output, out_dir.join("pkg.zip"));
    assert_eq!(archive_names(&out_dir.join("pkg.zip")), vec!["Ping.dll"]);
}
