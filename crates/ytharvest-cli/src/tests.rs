use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["ytharvest-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
    assert!(cli.html.is_none());
}

#[test]
fn extract_defaults_to_ten() {
    let cli = Cli::try_parse_from(["ytharvest-cli", "extract"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Extract {
            limit: 10,
            out: None
        })
    ));
}

#[test]
fn extract_with_limit_and_out_dir() {
    let cli = Cli::try_parse_from([
        "ytharvest-cli",
        "extract",
        "--limit",
        "40",
        "--out",
        "/tmp/exports",
    ])
    .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Extract { limit, out }) => {
            assert_eq!(limit, 40);
            assert_eq!(out, Some(PathBuf::from("/tmp/exports")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn extract_limit_above_platform_maximum_is_rejected() {
    assert!(Cli::try_parse_from(["ytharvest-cli", "extract", "--limit", "101"]).is_err());
}

#[test]
fn html_snapshot_is_a_global_flag() {
    let cli = Cli::try_parse_from(["ytharvest-cli", "extract", "--html", "page.html"])
        .expect("expected valid cli args");
    assert_eq!(cli.html, Some(PathBuf::from("page.html")));
}

#[test]
fn reply_requires_a_message() {
    assert!(Cli::try_parse_from(["ytharvest-cli", "reply", "--limit", "3"]).is_err());
}

#[test]
fn reply_limit_must_be_between_one_and_fifty() {
    assert!(Cli::try_parse_from(["ytharvest-cli", "reply", "--limit", "0", "--message", "hi"]).is_err());
    assert!(Cli::try_parse_from(["ytharvest-cli", "reply", "--limit", "51", "--message", "hi"]).is_err());

    let cli = Cli::try_parse_from(["ytharvest-cli", "reply", "--limit", "50", "--message", "Thanks!"])
        .expect("expected valid cli args");
    match cli.command {
        Some(Commands::Reply { limit, message }) => {
            assert_eq!(limit, 50);
            assert_eq!(message, "Thanks!");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_channel_and_serve() {
    let cli = Cli::try_parse_from(["ytharvest-cli", "channel"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Channel)));

    let cli = Cli::try_parse_from(["ytharvest-cli", "serve"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Serve)));
}

#[test]
fn builtin_locators_load_without_override_file() {
    let config = ytharvest_core::build_app_config(|_| Err(std::env::VarError::NotPresent))
        .expect("defaults are valid");
    assert!(load_locator_set(&config).is_ok());
}
