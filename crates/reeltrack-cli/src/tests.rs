use std::path::PathBuf;

use super::*;

#[test]
fn parses_submit_command() {
    let cli = Cli::try_parse_from([
        "reeltrack",
        "submit",
        "https://www.instagram.com/reel/ABC123/",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Submit { ref url }) if url == "https://www.instagram.com/reel/ABC123/"
    ));
}

#[test]
fn submit_requires_a_url() {
    assert!(Cli::try_parse_from(["reeltrack", "submit"]).is_err());
}

#[test]
fn parses_batch_with_urls_and_file() {
    let cli = Cli::try_parse_from([
        "reeltrack",
        "batch",
        "https://instagram.com/p/A1",
        "https://instagram.com/p/B2",
        "--file",
        "urls.txt",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Batch { urls, file }) => {
            assert_eq!(urls.len(), 2);
            assert_eq!(file, Some(PathBuf::from("urls.txt")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn batch_with_only_a_file_has_no_positional_urls() {
    let cli = Cli::try_parse_from(["reeltrack", "batch", "--file", "urls.txt"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Batch { ref urls, file: Some(_) }) if urls.is_empty()
    ));
}

#[test]
fn list_limit_defaults_to_twenty() {
    let cli = Cli::try_parse_from(["reeltrack", "list"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::List { limit: 20 })));

    let cli = Cli::try_parse_from(["reeltrack", "list", "--limit", "3"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::List { limit: 3 })));
}

#[test]
fn parses_settings_with_and_without_file() {
    let cli = Cli::try_parse_from(["reeltrack", "settings"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Settings { file: None })
    ));

    let cli = Cli::try_parse_from(["reeltrack", "settings", "--file", "me.yaml"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Settings { file: Some(ref f) }) if f == &PathBuf::from("me.yaml")
    ));
}

#[test]
fn parses_unit_commands() {
    for (arg, expected) in [
        ("analytics", "Analytics"),
        ("refresh", "Refresh"),
        ("profile", "Profile"),
        ("watch", "Watch"),
    ] {
        let cli = Cli::try_parse_from(["reeltrack", arg]).unwrap();
        assert_eq!(format!("{:?}", cli.command.unwrap()), expected);
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["reeltrack"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn url_file_skips_blanks_and_comments() {
    let content = "# reels to track\nhttps://instagram.com/reel/A1/\n\n   https://instagram.com/p/B2  \n#https://instagram.com/tv/C3\n";
    let urls: Vec<_> = posts::parse_url_lines(content).collect();
    assert_eq!(
        urls,
        ["https://instagram.com/reel/A1/", "https://instagram.com/p/B2"]
    );
}

#[test]
fn time_ago_buckets() {
    use chrono::Duration;

    assert_eq!(posts::time_ago(Duration::seconds(30)), "just now");
    assert_eq!(posts::time_ago(Duration::minutes(5)), "5m ago");
    assert_eq!(posts::time_ago(Duration::hours(3)), "3h ago");
    assert_eq!(posts::time_ago(Duration::days(2)), "2d ago");
    // clock skew can make ages negative
    assert_eq!(posts::time_ago(Duration::seconds(-5)), "just now");
}
