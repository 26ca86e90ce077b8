use clap::Parser;
use sortpack::cli::Cli;
use std::path::PathBuf;

#[test]
fn no_arguments_packs_current_directory() {
    // Given
    let argv = vec!["spk"];

    // When
    let cli = Cli::parse_from(argv);

    // Then
    assert_eq!(cli.pack.path, PathBuf::from("."));
    assert_eq!(cli.pack.out_dir, PathBuf::from("."));
    let ctx = cli.context();
    assert!(!ctx.dry_run && !ctx.json && !ctx.quiet && !ctx.no_color);
    assert_eq!(cli.log_directive(), "warn");
}

#[test]
fn flags_are_captured() {
    let argv = vec!["spk", "web", "--out-dir", "snap", "--dry-run", "--json", "-vv"];

    let cli = Cli::parse_from(argv);

    assert_eq!(cli.pack.path, PathBuf::from("web"));
    assert_eq!(cli.pack.out_dir, PathBuf::from("snap"));
    let ctx = cli.context();
    assert!(ctx.dry_run);
    assert!(ctx.json);
    assert_eq!(cli.log_directive(), "debug");
}
