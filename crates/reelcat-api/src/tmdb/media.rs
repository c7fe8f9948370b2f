//! Poster, video and display helpers.

use url::Url;

use super::types::Trailer;

/// Base URL for poster images (w500 rendition).
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// YouTube watch page URL prefix.
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// YouTube embedded player URL prefix.
const YOUTUBE_EMBED_URL: &str = "https://www.youtube.com/embed/";

/// Player parameters appended to embed URLs.
const YOUTUBE_EMBED_PARAMS: &str = "playsinline=1&modestbranding=1&rel=0&enablejsapi=1";

/// Joins a poster path onto the image base URL.
#[must_use]
pub fn poster_url(path: &str) -> String {
    format!("{IMAGE_BASE_URL}{path}")
}

/// Formats a vote average with one decimal place.
#[must_use]
pub fn format_rating(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}

/// Extracts the year from a `YYYY-MM-DD` date string.
#[must_use]
pub fn release_year(date: &str) -> Option<u32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

impl Trailer {
    /// YouTube watch page URL. `None` unless the video is playable.
    #[must_use]
    pub fn watch_url(&self) -> Option<String> {
        if !self.is_playable() {
            return None;
        }
        self.key.as_deref().map(|key| format!("{YOUTUBE_WATCH_URL}{key}"))
    }

    /// Embedded player URL for YouTube trailers.
    ///
    /// Only trailers (type "Trailer") on YouTube with a key are offered for playback.
    #[must_use]
    pub fn embed_url(&self) -> Option<String> {
        if !self.is_youtube_trailer() {
            return None;
        }
        self.key
            .as_deref()
            .map(|key| format!("{YOUTUBE_EMBED_URL}{key}?{YOUTUBE_EMBED_PARAMS}"))
    }
}

/// Recovers the YouTube video ID from a watch, embed or short link.
///
/// Accepts `https://www.youtube.com/watch?v=ID`, `https://www.youtube.com/embed/ID`
/// and `https://youtu.be/ID`. Returns `None` for anything else.
#[must_use]
pub fn youtube_video_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?;

    let id = if host == "youtu.be" {
        url.path_segments()?.next_back().map(String::from)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let mut segments = url.path_segments()?;
        if segments.next() == Some("embed") {
            segments.next().map(String::from)
        } else {
            url.query_pairs()
                .find(|(name, _)| name == "v")
                .map(|(_, value)| value.into_owned())
        }
    } else {
        None
    };

    id.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn youtube_trailer(key: Option<&str>) -> Trailer {
        Trailer {
            id: String::from("533ec654c3a36854480003eb"),
            key: key.map(String::from),
            name: Some(String::from("Official Trailer")),
            site: Some(String::from("YouTube")),
            kind: Some(String::from("Trailer")),
        }
    }

    #[test]
    fn test_poster_url() {
        // Arrange & Act
        let url = poster_url("/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg");

        // Assert
        assert_eq!(
            url,
            "https://image.tmdb.org/t/p/w500/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg"
        );
    }

    #[test]
    fn test_release_year() {
        // Arrange & Act & Assert
        assert_eq!(release_year("1999-10-15"), Some(1999));
        assert_eq!(release_year(""), None);
        assert_eq!(release_year("19"), None);
        assert_eq!(release_year("abcd-01-01"), None);
    }

    #[test]
    fn test_format_rating() {
        // Arrange & Act & Assert
        assert_eq!(format_rating(8.433), "8.4");
        assert_eq!(format_rating(0.0), "0.0");
    }

    #[test]
    fn test_watch_and_embed_url() {
        // Arrange
        let trailer = youtube_trailer(Some("SUXWAEX2jlg"));

        // Act
        let watch = trailer.watch_url();
        let embed = trailer.embed_url();

        // Assert
        assert_eq!(
            watch.as_deref(),
            Some("https://www.youtube.com/watch?v=SUXWAEX2jlg")
        );
        assert_eq!(
            embed.as_deref(),
            Some(
                "https://www.youtube.com/embed/SUXWAEX2jlg?playsinline=1&modestbranding=1&rel=0&enablejsapi=1"
            )
        );
    }

    #[test]
    fn test_no_url_without_key() {
        // Arrange
        let trailer = youtube_trailer(None);

        // Act & Assert
        assert!(trailer.watch_url().is_none());
        assert!(trailer.embed_url().is_none());
    }

    #[test]
    fn test_embed_url_rejects_teaser() {
        // Arrange
        let teaser = Trailer {
            kind: Some(String::from("Teaser")),
            ..youtube_trailer(Some("BdJKm16Co6M"))
        };

        // Act & Assert
        assert!(teaser.embed_url().is_none());
        assert!(teaser.watch_url().is_some());
    }

    #[test]
    fn test_youtube_video_id_from_watch_url() {
        // Arrange & Act
        let id = youtube_video_id("https://www.youtube.com/watch?v=O-b2VfmmbyA&t=10");

        // Assert
        assert_eq!(id.as_deref(), Some("O-b2VfmmbyA"));
    }

    #[test]
    fn test_youtube_video_id_from_embed_url() {
        // Arrange & Act
        let id = youtube_video_id("https://www.youtube.com/embed/SUXWAEX2jlg?rel=0");

        // Assert
        assert_eq!(id.as_deref(), Some("SUXWAEX2jlg"));
    }

    #[test]
    fn test_youtube_video_id_from_short_link() {
        // Arrange & Act
        let id = youtube_video_id("https://youtu.be/BdJKm16Co6M");

        // Assert
        assert_eq!(id.as_deref(), Some("BdJKm16Co6M"));
    }

    #[test]
    fn test_youtube_video_id_rejects_other_hosts() {
        // Arrange & Act & Assert
        assert!(youtube_video_id("https://vimeo.com/11223344").is_none());
        assert!(youtube_video_id("https://www.youtube.com/watch").is_none());
        assert!(youtube_video_id("not a url").is_none());
    }

    #[test]
    fn test_youtube_video_id_roundtrips_watch_url() {
        // Arrange
        let trailer = youtube_trailer(Some("O-b2VfmmbyA"));

        // Act
        let id = youtube_video_id(&trailer.watch_url().unwrap());

        // Assert
        assert_eq!(id, trailer.key);
    }
}
