//! Title parser: noisy video title → (artist, track) guess.
//!
//! Pure and stateless per call; a `TitleParser` only holds its noise list.

use rayon::prelude::*;

use crate::config::MatchConfig;
use crate::models::{ParsedTitle, SourceItem};
use crate::normalize::{strip_bracketed, title_case};

/// Separator between artist and track segments.
pub const ARTIST_TRACK_SEPARATOR: &str = " - ";

#[derive(Clone, Debug)]
pub struct TitleParser {
    noise_phrases: Vec<String>,
}

impl TitleParser {
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            noise_phrases: config
                .noise_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Lowercase, drop bracketed segments and noise phrases, strip `|` and `"`.
    ///
    /// Noise removal is plain substring replacement (first occurrence of each
    /// phrase), so a phrase inside a longer word is removed too:
    /// "audioslave" loses its "audio".
    pub fn clean(&self, title: &str) -> String {
        let mut clean = strip_bracketed(&title.to_lowercase());

        for phrase in &self.noise_phrases {
            clean = clean.replacen(phrase.as_str(), "", 1);
        }

        clean.replace(['|', '"'], "").trim().to_string()
    }

    pub fn parse(&self, title: &str) -> ParsedTitle {
        let clean = self.clean(title);
        let parts: Vec<&str> = clean.split(ARTIST_TRACK_SEPARATOR).map(str::trim).collect();

        if parts.len() >= 2 {
            let artist = title_case(parts[0]);
            return ParsedTitle {
                artist: (!artist.is_empty()).then_some(artist),
                track: title_case(parts[1]),
                raw: title.to_string(),
            };
        }

        ParsedTitle {
            artist: None,
            track: title_case(&clean),
            raw: title.to_string(),
        }
    }

    /// Parse every item's title in parallel, preserving order.
    pub fn parse_all(&self, items: &[SourceItem]) -> Vec<ParsedTitle> {
        items.par_iter().map(|item| self.parse(&item.title)).collect()
    }
}

impl Default for TitleParser {
    fn default() -> Self {
        Self::new(&MatchConfig::default())
    }
}

/// Parse with the default noise list.
pub fn parse_title(title: &str) -> ParsedTitle {
    TitleParser::default().parse(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artist_and_track() {
        let parsed = parse_title("Artist - Track (Official Video)");
        assert_eq!(parsed.artist.as_deref(), Some("Artist"));
        assert_eq!(parsed.track, "Track");
        assert_eq!(parsed.raw, "Artist - Track (Official Video)");
    }

    #[test]
    fn test_parse_noise_and_pipe() {
        let parsed = parse_title("Track Name | Lyrics");
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.track, "Track Name");
    }

    #[test]
    fn test_parse_empty() {
        let parsed = parse_title("");
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.track, "");
    }

    #[test]
    fn test_parse_only_noise_is_empty() {
        let parsed = parse_title("(Official Video) [HD] | \"\"");
        assert_eq!(parsed.track, "");
        assert_eq!(parsed.artist, None);
    }

    #[test]
    fn test_parse_plain_title() {
        let parsed = parse_title("Track Name");
        assert_eq!(parsed.artist, None);
        assert_eq!(parsed.track, "Track Name");
    }

    #[test]
    fn test_extra_segments_discarded() {
        let parsed = parse_title("Daft Punk - One More Time - Remastered");
        assert_eq!(parsed.artist.as_deref(), Some("Daft Punk"));
        assert_eq!(parsed.track, "One More Time");
    }

    #[test]
    fn test_title_case_ignores_original_casing() {
        let parsed = parse_title("QUEEN - bohemian RHAPSODY [4K Remaster]");
        assert_eq!(parsed.artist.as_deref(), Some("Queen"));
        assert_eq!(parsed.track, "Bohemian Rhapsody");
    }

    #[test]
    fn test_noise_removed_inside_words() {
        // Substring removal, not word-boundary: "audioslave" → "slave"
        let parsed = parse_title("Audioslave - Like a Stone");
        assert_eq!(parsed.artist.as_deref(), Some("Slave"));
        assert_eq!(parsed.track, "Like A Stone");
    }

    #[test]
    fn test_quotes_stripped() {
        let parsed = parse_title("Adele - \"Hello\" Official Music Video");
        assert_eq!(parsed.artist.as_deref(), Some("Adele"));
        assert_eq!(parsed.track, "Hello");
    }

    #[test]
    fn test_custom_noise_list() {
        let config = MatchConfig {
            noise_phrases: vec!["remix".to_string()],
            ..MatchConfig::default()
        };
        let parser = TitleParser::new(&config);
        let parsed = parser.parse("Song Remix Lyrics");
        assert_eq!(parsed.track, "Song Lyrics");
    }

    #[test]
    fn test_parse_all_preserves_order() {
        let items = vec![
            SourceItem::new("1", "A - B", ""),
            SourceItem::new("2", "C", ""),
            SourceItem::new("3", "", ""),
        ];
        let parsed = TitleParser::default().parse_all(&items);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].track, "B");
        assert_eq!(parsed[1].track, "C");
        assert_eq!(parsed[2].track, "");
    }
}
