use super::*;

#[test]
fn test_defaults_match_service_defaults() {
    let args = ServerArgs::try_parse_from(["tsu-server", "/work/game"]).expect("parse");
    assert_eq!(args.project_dir, PathBuf::from("/work/game"));
    assert_eq!(args.settings(), ServiceSettings::default());
}

#[test]
fn test_overrides() {
    let args = ServerArgs::try_parse_from([
        "tsu-server",
        "scripts",
        "--root-type",
        "HostObject",
        "--cache-ttl-ms",
        "250",
    ])
    .expect("parse");
    let settings = args.settings();
    assert_eq!(settings.root_type, "HostObject");
    assert_eq!(settings.cache_ttl, Duration::from_millis(250));
}

#[test]
fn test_project_dir_is_required() {
    assert!(ServerArgs::try_parse_from(["tsu-server"]).is_err());
}

#[test]
fn test_invalid_ttl_is_rejected() {
    assert!(ServerArgs::try_parse_from(["tsu-server", ".", "--cache-ttl-ms", "soon"]).is_err());
}

#[test]
fn test_command_is_well_formed() {
    use clap::CommandFactory;
    ServerArgs::command().debug_assert();
}
