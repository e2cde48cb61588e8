//! End-to-end build tests
//!
//! These tests lay out project trees in temporary directories and drive the
//! whole build (resolution, compilation, linking) against a recording fake
//! toolchain that just creates the files a real compiler would write.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use sun::build::{BuildOutcome, Builder};
use sun::config::Settings;
use sun::error::{ExitStatus, SunError};
use sun::toolchain::{Executor, Platform};

#[derive(Default)]
struct FakeToolchain {
    calls: Mutex<Vec<(String, Vec<String>)>>,
    link_output: String,
}

impl FakeToolchain {
    fn failing_link(output: &str) -> Self {
        Self {
            link_output: output.to_string(),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn compile_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(_, args)| args.iter().any(|a| a == "-c"))
            .map(|(_, args)| args)
            .collect()
    }

    fn archive_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(program, _)| program == "ar")
            .map(|(_, args)| args)
            .collect()
    }

    fn link_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(program, args)| program != "ar" && !args.iter().any(|a| a == "-c"))
            .map(|(_, args)| args)
            .collect()
    }
}

impl Executor for FakeToolchain {
    fn execute(&self, program: &str, args: &[String]) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));

        if program == "ar" {
            fs::write(&args[1], "archive")?;
            return Ok(String::new());
        }
        let compiling = args.iter().any(|a| a == "-c");
        if !compiling && !self.link_output.is_empty() {
            return Ok(self.link_output.clone());
        }
        if let Some(i) = args.iter().position(|a| a == "-o") {
            fs::write(&args[i + 1], "binary")?;
        }
        Ok(String::new())
    }
}

fn settings() -> Settings {
    let mut settings = Settings::for_platform(Platform::host());
    settings.default_compiler = "clang".to_string();
    settings.archiver = "ar".to_string();
    settings.jobs = Some(4);
    settings
}

/// Write a project with the given project file and empty sources, all
/// dated well in the past so freshly written objects are newer.
fn write_project(dir: &Path, project_file: &str, sources: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    fs::write(dir.join(".sun"), project_file).unwrap();
    let past = SystemTime::now() - Duration::from_secs(3600);
    for source in sources {
        let path = dir.join(source);
        fs::write(&path, "int f() { return 0; }\n").unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(past)
            .unwrap();
    }
}

fn build(dir: &Path, exec: &FakeToolchain) -> Result<BuildOutcome> {
    let settings = settings();
    let mut builder = Builder::new(&settings, exec);
    let project = builder.load(dir, None)?;
    builder.build(&project)
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    let mut names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

fn int_subdirs(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir.join("int"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect()
}

fn status_of(err: &anyhow::Error) -> ExitStatus {
    ExitStatus::from_error(err)
}

#[test]
fn test_clean_build_compiles_every_source_once() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp", "b.cpp", "c.cpp"]);

    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();

    assert_eq!(exec.compile_calls().len(), 3);
    assert_eq!(exec.link_calls().len(), 1);
    assert_eq!(
        file_names(&outcome.report.recompiled),
        vec!["a.cpp", "b.cpp", "c.cpp"]
    );
    assert_eq!(file_names(&outcome.report.objects), vec!["a.o", "b.o", "c.o"]);
    assert!(outcome.output.exists());
    assert!(tmp.path().join("compile_commands.json").exists());
}

#[test]
fn test_second_build_is_up_to_date() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp", "b.cpp"]);

    let exec = FakeToolchain::default();
    build(tmp.path(), &exec).unwrap();

    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();
    assert!(exec.compile_calls().is_empty());
    assert!(outcome.report.recompiled.is_empty());
    assert_eq!(outcome.report.objects.len(), 2);
    // linking always happens
    assert_eq!(exec.link_calls().len(), 1);
}

#[test]
fn test_touched_source_is_the_only_one_recompiled() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp", "b.cpp"]);
    build(tmp.path(), &FakeToolchain::default()).unwrap();

    let future = SystemTime::now() + Duration::from_secs(60);
    fs::File::options()
        .write(true)
        .open(tmp.path().join("b.cpp"))
        .unwrap()
        .set_modified(future)
        .unwrap();

    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();
    assert_eq!(exec.compile_calls().len(), 1);
    assert_eq!(file_names(&outcome.report.recompiled), vec!["b.cpp"]);
}

#[test]
fn test_changed_arguments_use_a_new_intermediate_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp", "b.cpp"]);
    build(tmp.path(), &FakeToolchain::default()).unwrap();
    let before = int_subdirs(tmp.path());
    assert_eq!(before.len(), 1);

    fs::write(tmp.path().join(".sun"), "+*.cpp\nname tool\narg -O2\n").unwrap();
    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();

    assert_eq!(exec.compile_calls().len(), 2);
    assert_eq!(outcome.report.recompiled.len(), 2);
    let after = int_subdirs(tmp.path());
    assert_eq!(after.len(), 2);
    assert!(after.contains(&before[0]), "old configuration is kept");
    assert!(exec.compile_calls()[0].contains(&"-O2".to_string()));
}

#[test]
fn test_changed_compiler_uses_a_new_intermediate_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp"]);
    build(tmp.path(), &FakeToolchain::default()).unwrap();

    fs::write(tmp.path().join(".sun"), "+*.cpp\nname tool\ncompiler clang-18\n").unwrap();
    let exec = FakeToolchain::default();
    build(tmp.path(), &exec).unwrap();

    assert_eq!(int_subdirs(tmp.path()).len(), 2);
    assert!(exec.calls().iter().all(|(program, _)| program == "clang-18"));
}

#[test]
fn test_static_library_archives_every_object() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nstatic\nname mylib\n", &["a.cpp", "b.cpp"]);

    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();

    let archives = exec.archive_calls();
    assert_eq!(archives.len(), 1);
    let args = &archives[0];
    assert_eq!(args[0], "rc");
    assert!(args[1].ends_with("mylib.a") || args[1].ends_with("mylib.lib"));
    assert_eq!(args.len(), 4);
    assert!(args[2].ends_with("a.o"));
    assert!(args[3].ends_with("b.o"));
    assert!(exec.link_calls().is_empty());
    assert!(outcome.output.exists());
}

#[test]
fn test_static_dependency_is_flattened_into_static_library() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let util = tmp.path().join("util");
    write_project(&app, "+*.cpp\nstatic\nname app\nrequire ../util\n", &["a.cpp"]);
    write_project(&util, "+*.cpp\nstatic\nname util\n", &["u.cpp"]);

    let exec = FakeToolchain::default();
    let outcome = build(&app, &exec).unwrap();

    let archives = exec.archive_calls();
    assert_eq!(archives.len(), 1, "only the depending archive is written");
    let objects: Vec<PathBuf> = archives[0][2..].iter().map(PathBuf::from).collect();
    assert_eq!(file_names(&objects), vec!["a.o", "u.o"]);
    assert!(!util.join("util.a").exists());
    assert!(!util.join("util.lib").exists());
    assert_eq!(outcome.report.objects.len(), 2);

    // the dependent sees the dependency's headers
    let app_compile = exec
        .compile_calls()
        .into_iter()
        .find(|args| args.last().is_some_and(|a| a.ends_with("a.cpp")))
        .unwrap();
    assert!(app_compile.iter().any(|a| a.starts_with("-I") && a.ends_with("util")));
}

#[test]
fn test_executable_links_static_dependency_archive() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let util = tmp.path().join("util");
    write_project(&app, "+main.cpp\nname app\nrequire ../util\n", &["main.cpp"]);
    write_project(&util, "+*.cpp\nstatic\nname util\n", &["u.cpp"]);

    let exec = FakeToolchain::default();
    build(&app, &exec).unwrap();

    assert_eq!(exec.archive_calls().len(), 1);
    let links = exec.link_calls();
    assert_eq!(links.len(), 1);
    let archive = exec.archive_calls()[0][1].clone();
    assert!(links[0].contains(&archive));
}

#[cfg(target_os = "linux")]
#[test]
fn test_executable_links_dynamic_dependency_by_name() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let net = tmp.path().join("net");
    write_project(&app, "+main.cpp\nname app\nrequire ../net\n", &["main.cpp"]);
    write_project(&net, "+*.cpp\ndynamic\nname net\n", &["socket.cpp"]);

    let exec = FakeToolchain::default();
    build(&app, &exec).unwrap();

    assert!(net.join("libnet.so").exists());
    let net_compile = exec
        .compile_calls()
        .into_iter()
        .find(|args| args.last().is_some_and(|a| a.ends_with("socket.cpp")))
        .unwrap();
    assert!(net_compile.contains(&"-fPIC".to_string()));

    let links = exec.link_calls();
    assert_eq!(links.len(), 2);
    assert!(links[0].contains(&"--shared".to_string()));
    let app_link = &links[1];
    assert!(app_link.contains(&format!("-L{}", net.display())));
    assert!(app_link.contains(&"-lnet".to_string()));
}

#[test]
fn test_dependency_without_link_kind_is_rejected_before_compiling() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let util = tmp.path().join("util");
    write_project(&app, "+*.cpp\nname app\nrequire ../util\n", &["a.cpp"]);
    write_project(&util, "+*.cpp\nname util\n", &["u.cpp"]);

    let exec = FakeToolchain::default();
    let err = build(&app, &exec).unwrap_err();

    assert_eq!(status_of(&err), ExitStatus::BadDependency);
    assert!(matches!(
        err.downcast_ref::<SunError>(),
        Some(SunError::DependencyLinkKindMissing { .. })
    ));
    assert!(exec.calls().is_empty());
}

#[test]
fn test_missing_dependency() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    write_project(&app, "+*.cpp\nname app\nrequire ../nowhere\n", &["a.cpp"]);

    let exec = FakeToolchain::default();
    let err = build(&app, &exec).unwrap_err();

    assert_eq!(status_of(&err), ExitStatus::BadDependency);
    assert!(matches!(
        err.downcast_ref::<SunError>(),
        Some(SunError::DependencyNotFound(_))
    ));
    assert!(exec.calls().is_empty());
}

#[test]
fn test_require_cycle_is_detected() {
    let tmp = tempfile::tempdir().unwrap();
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    write_project(&a, "+*.cpp\nstatic\nname a\nrequire ../b\n", &["a.cpp"]);
    write_project(&b, "+*.cpp\nstatic\nname b\nrequire ../a\n", &["b.cpp"]);

    let exec = FakeToolchain::default();
    let err = build(&a, &exec).unwrap_err();

    assert_eq!(status_of(&err), ExitStatus::BadDependency);
    assert!(matches!(
        err.downcast_ref::<SunError>(),
        Some(SunError::CyclicDependency(_))
    ));
}

#[test]
fn test_linker_output_fails_the_build() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp"]);

    let exec = FakeToolchain::failing_link("a.o: undefined reference to `helper()'\n");
    let err = build(tmp.path(), &exec).unwrap_err();

    assert_eq!(status_of(&err), ExitStatus::LinkError);
    match err.downcast_ref::<SunError>() {
        Some(SunError::LinkFailed { log, .. }) => assert!(log.contains("undefined reference")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_project_file_is_a_bad_argument() {
    let tmp = tempfile::tempdir().unwrap();
    let exec = FakeToolchain::default();
    let err = build(tmp.path(), &exec).unwrap_err();
    assert_eq!(status_of(&err), ExitStatus::BadArgument);
}

#[test]
fn test_platform_conditions_select_sources() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(
        tmp.path(),
        "name tool\n+common.cpp\nif windows\n+win.cpp\nendif\nif not windows\n+posix.cpp\nendif\n",
        &["common.cpp", "win.cpp", "posix.cpp"],
    );

    let exec = FakeToolchain::default();
    let outcome = build(tmp.path(), &exec).unwrap();

    let expected = if Platform::host().is_windows() {
        vec!["common.cpp", "win.cpp"]
    } else {
        vec!["common.cpp", "posix.cpp"]
    };
    assert_eq!(file_names(&outcome.report.recompiled), expected);
}

#[test]
fn test_flattened_dependency_linker_args_reach_the_final_link() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let engine = tmp.path().join("engine");
    let util = tmp.path().join("util");
    write_project(&app, "+main.cpp\nname app\nrequire ../engine\n", &["main.cpp"]);
    write_project(&engine, "+*.cpp\nstatic\nname engine\nrequire ../util\n", &["e.cpp"]);
    write_project(&util, "+*.cpp\nstatic\nname util\nlinker_arg -lz\n", &["u.cpp"]);

    // flattening hands the archive's requirements to the static project
    let settings = settings();
    let exec = FakeToolchain::default();
    let mut builder = Builder::new(&settings, &exec);
    let engine_project = builder.load(&engine, None).unwrap();
    let mut toolchain = engine_project.toolchain(&settings);
    builder.compile(&engine_project, &mut toolchain).unwrap();
    assert!(toolchain.extra_linker_args.contains(&"-lz".to_string()));

    // and whoever links that archive gets them after it
    let exec = FakeToolchain::default();
    build(&app, &exec).unwrap();

    let archives = exec.archive_calls();
    assert_eq!(archives.len(), 1);
    assert!(!archives[0].contains(&"-lz".to_string()));
    let objects: Vec<PathBuf> = archives[0][2..].iter().map(PathBuf::from).collect();
    assert_eq!(file_names(&objects), vec!["e.o", "u.o"]);

    let links = exec.link_calls();
    assert_eq!(links.len(), 1);
    let archive_pos = links[0].iter().position(|a| *a == archives[0][1]).unwrap();
    let lz_pos = links[0].iter().position(|a| a == "-lz").unwrap();
    assert!(archive_pos < lz_pos);
}

#[test]
fn test_require_include_dir_override() {
    let tmp = tempfile::tempdir().unwrap();
    let app = tmp.path().join("app");
    let util = tmp.path().join("util");
    write_project(
        &app,
        "+main.cpp\nname app\nrequire ../util include_dir=../util/include\n",
        &["main.cpp"],
    );
    write_project(&util, "+*.cpp\nstatic\nname util\n", &["u.cpp"]);

    let exec = FakeToolchain::default();
    build(&app, &exec).unwrap();

    let app_compile = exec
        .compile_calls()
        .into_iter()
        .find(|args| args.last().is_some_and(|a| a.ends_with("main.cpp")))
        .unwrap();
    let include = format!("-I{}", util.join("include").display());
    assert!(app_compile.contains(&include), "{:?}", app_compile);
    assert!(!app_compile.contains(&format!("-I{}", util.display())));
}

#[test]
fn test_configured_compiler_uses_a_new_intermediate_dir() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(tmp.path(), "+*.cpp\nname tool\n", &["a.cpp"]);
    build(tmp.path(), &FakeToolchain::default()).unwrap();

    let mut gcc_settings = settings();
    gcc_settings.default_compiler = "g++".to_string();
    let exec = FakeToolchain::default();
    let mut builder = Builder::new(&gcc_settings, &exec);
    let project = builder.load(tmp.path(), None).unwrap();
    let outcome = builder.build(&project).unwrap();

    assert_eq!(int_subdirs(tmp.path()).len(), 2);
    assert_eq!(outcome.report.recompiled.len(), 1);
    assert!(exec.calls().iter().all(|(program, _)| program == "g++"));
}
