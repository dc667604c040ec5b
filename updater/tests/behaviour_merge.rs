//! Behaviour-driven tests for the merge policy.
//!
//! These scenarios stage a real release archive and merge it into a
//! temporary installation, covering protection, replace-all and per-entry
//! lock failures.

mod support;

use camino::{Utf8Path, Utf8PathBuf};
use drupdate::error::UpdaterError;
use drupdate::merge::decision::{MergeDecision, MergeReport};
use drupdate::merge::engine::MergeEngine;
use drupdate::merge::fs_ops::{FileOps, StdFileOps};
use drupdate::staging::extraction::GzipTarExtractor;
use drupdate::staging::scratch::ScratchWorkspace;
use drupdate::staging::stager::Stager;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::io;
use support::{CORE_FILES, Sandbox, write_file, write_package};

/// [`FileOps`] that refuses to remove the named destination entries.
struct LockingOps {
    locked: Vec<String>,
}

impl FileOps for LockingOps {
    fn exists(&self, path: &Utf8Path) -> bool {
        StdFileOps.exists(path)
    }

    fn remove(&self, path: &Utf8Path) -> io::Result<()> {
        let is_locked = path
            .file_name()
            .is_some_and(|name| self.locked.iter().any(|locked| locked == name));
        if is_locked {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        StdFileOps.remove(path)
    }

    fn move_entry(&self, from: &Utf8Path, to: &Utf8Path) -> io::Result<()> {
        StdFileOps.move_entry(from, to)
    }
}

#[derive(Default)]
struct MergeWorld {
    sandbox: Option<Sandbox>,
    destination: Option<Utf8PathBuf>,
    locked: Vec<String>,
    result: Option<Result<MergeReport, UpdaterError>>,
    status: String,
    skip_assertions: bool,
}

impl MergeWorld {
    fn sandbox(&self) -> &Sandbox {
        self.sandbox.as_ref().expect("sandbox not set")
    }

    fn destination(&self) -> &Utf8Path {
        self.destination.as_deref().expect("destination not set")
    }

    fn report(&self) -> &MergeReport {
        match self.result.as_ref().expect("merge not run") {
            Ok(report) => report,
            Err(err) => panic!("merge failed: {err}"),
        }
    }

    fn read_destination(&self, relative: &str) -> Vec<u8> {
        std::fs::read(self.destination().join(relative)).expect("failed to read destination")
    }
}

#[fixture]
fn world() -> MergeWorld {
    MergeWorld::default()
}

fn merge(world: &mut MergeWorld, replace_all: bool) {
    let sandbox = world.sandbox();
    let scratch = ScratchWorkspace::new(sandbox.path(".tempdir"));
    let archive = sandbox.path("drupal-7.98.tar.gz");
    let destination = world.destination().to_owned();
    let ops = LockingOps {
        locked: world.locked.clone(),
    };
    let mut status = Vec::new();

    let result = Stager::new(&scratch, &GzipTarExtractor)
        .stage(&archive, &destination)
        .and_then(|staged| {
            MergeEngine::new(&ops).apply(&staged, &destination, replace_all, &mut status)
        });

    world.status = String::from_utf8(status).expect("status output not UTF-8");
    world.result = Some(result);
}

fn assert_decision(world: &MergeWorld, entry: &str, expected: &MergeDecision) {
    assert_eq!(world.report().decision_for(entry), Some(expected));
}

#[given("a release archive with sites and CHANGELOG.txt")]
fn given_release_archive(world: &mut MergeWorld) {
    let sandbox = Sandbox::new();
    write_package(&sandbox.path("drupal-7.98.tar.gz"), "drupal-7.98", CORE_FILES);
    world.destination = Some(sandbox.path("www"));
    world.sandbox = Some(sandbox);
}

#[given("an installation that already has sites and CHANGELOG.txt")]
fn given_existing_installation(world: &mut MergeWorld) {
    let destination = world.destination().to_owned();
    write_file(&destination.join("sites/default/settings.php"), b"user settings");
    write_file(&destination.join("CHANGELOG.txt"), b"Drupal 7.97");
}

#[given("{entry} cannot be removed")]
fn given_locked_entry(world: &mut MergeWorld, entry: String) {
    world.locked.push(entry);
}

#[given("a destination inside a read-only directory")]
fn given_read_only_parent(world: &mut MergeWorld) {
    let parent = world.sandbox().path("readonly");
    std::fs::create_dir_all(&parent).expect("failed to create parent");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&parent, std::fs::Permissions::from_mode(0o555))
            .expect("failed to set permissions");
        world.skip_assertions = support::running_as_root();
    }
    #[cfg(not(unix))]
    {
        world.skip_assertions = true;
    }
    world.destination = Some(parent.join("www"));
}

#[when("the release is merged without replace")]
fn when_merged_default(world: &mut MergeWorld) {
    merge(world, false);
}

#[when("the release is merged with replace")]
fn when_merged_replace(world: &mut MergeWorld) {
    merge(world, true);
}

#[then("{entry} is moved in")]
fn then_moved_in(world: &mut MergeWorld, entry: String) {
    assert_decision(world, &entry, &MergeDecision::MoveIn);
}

#[then("{entry} is replaced")]
fn then_replaced(world: &mut MergeWorld, entry: String) {
    assert_decision(world, &entry, &MergeDecision::Replace);
}

#[then("{entry} is skipped as protected")]
fn then_skipped_protected(world: &mut MergeWorld, entry: String) {
    assert_decision(world, &entry, &MergeDecision::SkipProtected);
}

#[then("{entry} is skipped as locked")]
fn then_skipped_locked(world: &mut MergeWorld, entry: String) {
    assert!(matches!(
        world.report().decision_for(&entry),
        Some(MergeDecision::SkipLocked { .. })
    ));
    assert_eq!(world.read_destination(&entry), b"Drupal 7.97");
}

#[then("the installation keeps its site settings")]
fn then_site_settings_kept(world: &mut MergeWorld) {
    assert_eq!(
        world.read_destination("sites/default/settings.php"),
        b"user settings"
    );
    assert!(
        !world
            .destination()
            .join("sites/default/default.settings.php")
            .exists()
    );
}

#[then("the installation has stock site settings")]
fn then_stock_site_settings(world: &mut MergeWorld) {
    assert_eq!(
        world.read_destination("sites/default/default.settings.php"),
        b"stock settings"
    );
    assert!(!world.destination().join("sites/default/settings.php").exists());
}

#[then("the status output includes \"{line}\"")]
fn then_status_includes(world: &mut MergeWorld, line: String) {
    assert!(
        world.status.lines().any(|status| status == line),
        "missing status line {line:?} in:\n{}",
        world.status
    );
}

#[then("the merge fails with a filesystem error")]
fn then_fails_filesystem(world: &mut MergeWorld) {
    if world.skip_assertions {
        return;
    }
    let result = world.result.as_ref().expect("merge not run");
    assert!(
        matches!(result, Err(UpdaterError::Filesystem { .. })),
        "expected Filesystem error, got {result:?}"
    );
}

#[scenario(
    path = "tests/features/merge.feature",
    name = "Default merge protects site data"
)]
fn scenario_default_merge(world: MergeWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/merge.feature", name = "Replace overrides protection")]
fn scenario_replace_all(world: MergeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/merge.feature",
    name = "A locked entry does not stop the merge"
)]
fn scenario_locked_entry(world: MergeWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/merge.feature",
    name = "An uncreatable destination aborts the merge"
)]
fn scenario_uncreatable_destination(world: MergeWorld) {
    let _ = world;
}
