// tests/contents_config.rs
use std::path::Path;

use dashboard_contents::config::ContentsConfig;

#[test]
fn shipped_config_matches_built_in_defaults() {
    let cfg = ContentsConfig::load_from(Path::new("config/contents.toml")).unwrap();
    assert_eq!(cfg, ContentsConfig::default());
}

#[test]
fn shipped_config_bucket_order() {
    let cfg = ContentsConfig::load_from(Path::new("config/contents.toml")).unwrap();
    let searches: Vec<_> = cfg.searches.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(searches, ["all", "mirapaRadio", "seeHasu", "story"]);
    assert_eq!(cfg.searches[0].query, None);

    let playlists: Vec<_> = cfg.playlists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        playlists,
        ["membership", "withMeets", "fesLive", "linkNama", "lyricVideo"]
    );
    assert_eq!(cfg.notes[0].url, "https://note.com/lovelive_hasu/rss");
}

#[test]
fn wrong_value_type_is_rejected() {
    assert!(ContentsConfig::from_toml_str("max_contents = \"five\"").is_err());
}
