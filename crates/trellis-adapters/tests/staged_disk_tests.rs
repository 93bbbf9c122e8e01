//! Staged and direct runs of the Rails blueprint against a real directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use trellis_adapters::{
    DirectoryTemplateSource, EmbeddedTemplateSource, LocalFilesystem, MiniJinjaRenderer,
    SkippingCommandRunner, builtin_blueprints::rails_blueprint,
};
use trellis_core::{
    application::{ExecutionMode, ScaffoldService, TemplateSource},
    domain::RawOptions,
    error::TrellisResult,
};

fn service(source: Box<dyn TemplateSource>) -> ScaffoldService {
    ScaffoldService::new(
        source,
        Box::new(MiniJinjaRenderer::new()),
        Box::new(LocalFilesystem::new()),
        Box::new(SkippingCommandRunner::new()),
    )
}

fn options() -> RawOptions {
    RawOptions::new()
        .with("app_name", "acme")
        .with("database", "postgresql")
}

fn run(source: Box<dyn TemplateSource>, dest: &Path, mode: ExecutionMode) -> TrellisResult<()> {
    let blueprint = rails_blueprint()?;
    service(source).scaffold(&blueprint, &options(), dest, mode)?;
    Ok(())
}

/// Names in `dir`, sorted.
fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(unix)]
#[test]
fn staged_run_keeps_symlinks_and_empty_directories() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("acme");
    fs::create_dir_all(dest.join("emptydir")).unwrap();
    fs::write(dest.join("real.txt"), "mine\n").unwrap();
    std::os::unix::fs::symlink("real.txt", dest.join("link.txt")).unwrap();

    run(
        Box::new(EmbeddedTemplateSource::rails()),
        &dest,
        ExecutionMode::Staged,
    )
    .unwrap();

    let link = fs::symlink_metadata(dest.join("link.txt")).unwrap();
    assert!(link.file_type().is_symlink());
    assert_eq!(
        fs::read_link(dest.join("link.txt")).unwrap(),
        PathBuf::from("real.txt")
    );
    assert!(dest.join("emptydir").is_dir());
    assert_eq!(fs::read_to_string(dest.join("real.txt")).unwrap(), "mine\n");
    assert!(dest.join("Gemfile").is_file());

    // Neither the staging tree nor the previous contents are left behind.
    assert_eq!(entries(temp.path()), vec!["acme"]);
}

#[test]
fn staged_run_creates_missing_destination() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("acme");

    run(
        Box::new(EmbeddedTemplateSource::rails()),
        &dest,
        ExecutionMode::Staged,
    )
    .unwrap();

    assert!(dest.join("config/database.yml").is_file());
    assert_eq!(entries(temp.path()), vec!["acme"]);
}

#[cfg(unix)]
#[test]
fn staged_output_matches_direct_output() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let direct = temp.path().join("direct/acme");
    let staged = temp.path().join("staged/acme");

    run(
        Box::new(EmbeddedTemplateSource::rails()),
        &direct,
        ExecutionMode::Direct,
    )
    .unwrap();
    run(
        Box::new(EmbeddedTemplateSource::rails()),
        &staged,
        ExecutionMode::Staged,
    )
    .unwrap();

    for entry in walkdir::WalkDir::new(&direct) {
        let entry = entry.unwrap();
        let relative = entry.path().strip_prefix(&direct).unwrap();
        let twin = staged.join(relative);
        if entry.file_type().is_file() {
            assert_eq!(fs::read(entry.path()).unwrap(), fs::read(&twin).unwrap());
            let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o111;
            assert_eq!(mode(entry.path()), mode(&twin), "{}", relative.display());
        } else {
            assert!(twin.is_dir(), "{}", relative.display());
        }
    }
}

#[test]
fn staged_failure_leaves_destination_untouched() {
    let temp = TempDir::new().unwrap();
    let templates = TempDir::new().unwrap();
    let dest = temp.path().join("acme");
    fs::create_dir_all(dest.join("emptydir")).unwrap();
    fs::write(dest.join("Gemfile"), "source \"mine\"\n").unwrap();

    let err = run(
        Box::new(DirectoryTemplateSource::new(templates.path())),
        &dest,
        ExecutionMode::Staged,
    )
    .unwrap_err();

    assert_eq!(
        err.failed_step(),
        Some("create_app_skeleton: copy-directory .")
    );
    assert_eq!(entries(&dest), vec!["Gemfile", "emptydir"]);
    assert_eq!(
        fs::read_to_string(dest.join("Gemfile")).unwrap(),
        "source \"mine\"\n"
    );
    assert_eq!(entries(temp.path()), vec!["acme"]);
}

#[cfg(unix)]
#[test]
fn rerun_clears_a_foreign_exec_bit() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("acme");
    fs::create_dir_all(&dest).unwrap();
    fs::write(dest.join("Rakefile"), "task :default\n").unwrap();
    fs::set_permissions(dest.join("Rakefile"), fs::Permissions::from_mode(0o755)).unwrap();

    run(
        Box::new(EmbeddedTemplateSource::rails()),
        &dest,
        ExecutionMode::Direct,
    )
    .unwrap();

    let mode = fs::metadata(dest.join("Rakefile")).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0);
    let setup = fs::metadata(dest.join("bin/setup")).unwrap().permissions().mode();
    assert_ne!(setup & 0o111, 0);
}
