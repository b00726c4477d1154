use super::*;
use clap::Parser;

fn args(argv: &[&str]) -> CliArgs {
    let mut full = vec!["tscc"];
    full.extend_from_slice(argv);
    CliArgs::try_parse_from(full).unwrap()
}

#[test]
fn test_parse_project_config() {
    let config = parse_project_config(
        r#"{ "compilerOptions": { "kk": "rt", "outDir": "gen" }, "files": ["a.json"] }"#,
    )
    .unwrap();
    let options = config.compiler_options.unwrap();
    assert_eq!(options.kk.as_deref(), Some("rt"));
    assert_eq!(options.out_dir.as_deref(), Some("gen"));
    assert_eq!(config.files, Some(vec!["a.json".to_string()]));
}

#[test]
fn test_parse_project_config_rejects_invalid_json() {
    assert!(parse_project_config("{ compilerOptions: ").is_err());
}

#[test]
fn test_defaults_without_project_or_flags() {
    let cwd = Path::new("/work");
    let options = resolve_options(None, cwd, &args(&[]), cwd);
    assert_eq!(options, CodegenOptions::default());
}

#[test]
fn test_flags_override_project_file() {
    let config = parse_project_config(r#"{ "compilerOptions": { "kk": "rt", "outDir": "gen" } }"#)
        .unwrap();
    let cwd = Path::new("/work");
    let config_dir = Path::new("/work/app");

    let options = resolve_options(Some(&config), config_dir, &args(&[]), cwd);
    assert_eq!(options.namespace, "rt");
    assert_eq!(options.out_dir, Some(PathBuf::from("/work/app/gen")));

    let options = resolve_options(
        Some(&config),
        config_dir,
        &args(&["--kk", "ui", "--outDir", "out"]),
        cwd,
    );
    assert_eq!(options.namespace, "ui");
    assert_eq!(options.out_dir, Some(PathBuf::from("/work/out")));
}

#[test]
fn test_resolve_project_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{ "compilerOptions": { "kk": "rt" }, "files": ["units/demo.json"] }"#,
    )
    .unwrap();

    let project = resolve_project(&args(&[]), dir.path()).unwrap();
    assert_eq!(project.options.namespace, "rt");
    assert_eq!(project.files, vec![dir.path().join("units/demo.json")]);
    assert_eq!(project.config_path, Some(dir.path().join(CONFIG_FILE_NAME)));
}

#[test]
fn test_resolve_project_flag_points_at_folder() {
    let dir = tempfile::tempdir().unwrap();
    let app = dir.path().join("app");
    std::fs::create_dir(&app).unwrap();
    std::fs::write(app.join(CONFIG_FILE_NAME), r#"{ "files": ["demo.json"] }"#).unwrap();

    let project = resolve_project(&args(&["-p", "app"]), dir.path()).unwrap();
    assert_eq!(project.files, vec![app.join("demo.json")]);
    assert_eq!(project.options.namespace, "kk");
}

#[test]
fn test_positional_inputs_skip_implicit_project() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{ "compilerOptions": { "kk": "rt" }, "files": ["listed.json"] }"#,
    )
    .unwrap();

    let project = resolve_project(&args(&["given.json"]), dir.path()).unwrap();
    assert_eq!(project.files, vec![dir.path().join("given.json")]);
    assert_eq!(project.options.namespace, "kk");
    assert!(project.config_path.is_none());
}

#[test]
fn test_missing_project_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = resolve_project(&args(&["-p", "nowhere"]), dir.path()).unwrap_err();
    assert!(err.to_string().contains("project file not found"));
}

#[test]
fn test_no_inputs_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = resolve_project(&args(&[]), dir.path()).unwrap_err();
    assert!(err.to_string().contains("no input files"));
}
