// tests/providers_youtube.rs
use dashboard_contents::ingest::providers::youtube::{
    decode_playlist, decode_search_ids, decode_videos,
};
use dashboard_contents::ingest::types::SourcePayload;
use dashboard_contents::ingest::Normalizer;

const SEARCH_JSON: &str = include_str!("fixtures/youtube_search.json");
const VIDEOS_JSON: &str = include_str!("fixtures/youtube_videos.json");
const PLAYLIST_JSON: &str = include_str!("fixtures/youtube_playlist.json");

fn normalizer() -> Normalizer {
    Normalizer::new(
        vec!["English Subtitles".into(), "简体字幕".into(), "繁體字幕".into()],
        200,
    )
}

#[test]
fn search_ids_skip_non_video_results() {
    let ids = decode_search_ids(SEARCH_JSON.as_bytes()).unwrap();
    assert_eq!(ids, ["up2", "old", "up1", "new", "priv", "sub"]);
}

#[test]
fn private_video_is_excluded_regardless_of_query() {
    let n = normalizer();
    for query in [None, Some("Private"), Some("video")] {
        let videos = decode_videos(VIDEOS_JSON.as_bytes()).unwrap();
        let out = n.normalize(SourcePayload::Search(videos), &n.filter(query));
        assert!(out.iter().all(|i| i.title != "Private video"), "query {query:?}");
    }
}

#[test]
fn upcoming_items_use_scheduled_start() {
    let n = normalizer();
    let videos = decode_videos(VIDEOS_JSON.as_bytes()).unwrap();
    let out = n.normalize(SourcePayload::Search(videos), &n.filter(None));

    let up1 = out.iter().find(|i| i.link.ends_with("=up1")).unwrap();
    assert!(up1.upcoming);
    assert_eq!(up1.date.unwrap().to_rfc3339(), "2025-05-01T11:00:00+00:00");

    let old = out.iter().find(|i| i.link.ends_with("=old")).unwrap();
    assert!(!old.upcoming);
    assert_eq!(old.date.unwrap().to_rfc3339(), "2025-04-01T10:00:00+00:00");

    assert!(out.iter().all(|i| !i.title.contains("English Subtitles")));
    assert_eq!(out.len(), 4);
}

#[test]
fn playlist_entries_map_one_to_one_minus_unavailable() {
    let entries = decode_playlist(PLAYLIST_JSON.as_bytes()).unwrap();
    assert_eq!(entries.len(), 3);
    let n = normalizer();
    let out = n.normalize(SourcePayload::Playlist(entries), &n.filter(None));

    let links: Vec<_> = out.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(
        links,
        [
            "https://www.youtube.com/watch?v=fes2",
            "https://www.youtube.com/watch?v=fes3",
        ]
    );
    // contentDetails date wins over the snippet date
    assert_eq!(out[0].date.unwrap().to_rfc3339(), "2025-03-01T12:00:00+00:00");
    assert_eq!(out[1].date.unwrap().to_rfc3339(), "2025-04-05T00:00:00+00:00");
    assert!(out.iter().all(|i| !i.upcoming));
}
