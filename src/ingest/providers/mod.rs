pub mod note_rss;
pub mod youtube;
