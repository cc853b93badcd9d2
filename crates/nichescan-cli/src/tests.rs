use super::*;

#[test]
fn parses_analyze_with_defaults() {
    let cli = Cli::try_parse_from(["nichescan", "analyze", "habit tracker"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Analyze {
            keyword,
            country,
            no_enrich,
            json,
        }) => {
            assert_eq!(keyword, "habit tracker");
            assert_eq!(country, "us");
            assert!(!no_enrich);
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_analyze_flags() {
    let cli = Cli::try_parse_from([
        "nichescan",
        "analyze",
        "crm",
        "--country",
        "uk",
        "--no-enrich",
        "--json",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            no_enrich: true,
            json: true,
            ..
        })
    ));
}

#[test]
fn parses_classify_command() {
    let cli = Cli::try_parse_from(["nichescan", "classify", "payload.json", "--json"])
        .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Classify { file, json }) => {
            assert_eq!(file, PathBuf::from("payload.json"));
            assert!(json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_override_files() {
    let cli = Cli::try_parse_from([
        "nichescan",
        "override",
        "habit tracker",
        "--apps",
        "apps.json",
        "--report",
        "report.json",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Override {
            keyword,
            country,
            apps,
            targets,
            report,
            raw,
        }) => {
            assert_eq!(keyword, "habit tracker");
            assert_eq!(country, "us");
            assert_eq!(apps, Some(PathBuf::from("apps.json")));
            assert_eq!(targets, None);
            assert_eq!(report, Some(PathBuf::from("report.json")));
            assert_eq!(raw, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_prompts_command() {
    let cli = Cli::try_parse_from(["nichescan", "prompts", "crm", "--country", "de", "--json"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Prompts { ref country, json: true, .. }) if country == "de"
    ));
}

#[test]
fn analyze_requires_keyword() {
    assert!(Cli::try_parse_from(["nichescan", "analyze"]).is_err());
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["nichescan"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}
