//! Filename conventions.
//!
//! Two kinds of names flow through the admin backend:
//!
//! - **Bare filenames** used as storage keys (post filenames, uploaded media).
//!   They must name a single entry inside one flat directory, never a path.
//! - **Track stems** in the music directory, which follow a `Title - Artist`
//!   convention that the playlist tool decodes.
//!
//! ## Track names
//!
//! The artist is the text after the *last* dash, so titles may contain dashes
//! of their own:
//! - `Interstellar - Hans Zimmer` → title "Interstellar", artist "Hans Zimmer"
//! - `Spider-Man - Danny Elfman` → title "Spider-Man", artist "Danny Elfman"
//! - `Solo` → title "Solo", artist "Unknown"

/// Artist used when a track name carries none.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Result of parsing a `Title - Artist` track stem.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTrackName {
    pub title: String,
    pub artist: String,
}

/// Parse a track stem (filename without extension).
///
/// Both parts are trimmed. A trailing dash with nothing after it yields the
/// unknown artist rather than an empty one.
pub fn parse_track_name(stem: &str) -> ParsedTrackName {
    match stem.rsplit_once('-') {
        Some((title, artist)) => {
            let artist = artist.trim();
            ParsedTrackName {
                title: title.trim().to_string(),
                artist: if artist.is_empty() {
                    UNKNOWN_ARTIST.to_string()
                } else {
                    artist.to_string()
                },
            }
        }
        None => ParsedTrackName {
            title: stem.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
        },
    }
}

/// Check that `name` is a single path component usable as a storage key.
///
/// Returns the reason on rejection.
pub fn check_bare_filename(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("name is empty");
    }
    if name.contains(['/', '\\']) {
        return Err("name must not contain path separators");
    }
    if name == "." || name == ".." {
        return Err("name must not be a relative path component");
    }
    if name.contains('\0') {
        return Err("name must not contain NUL bytes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_artist() {
        let p = parse_track_name("Interstellar - Hans Zimmer");
        assert_eq!(p.title, "Interstellar");
        assert_eq!(p.artist, "Hans Zimmer");
    }

    #[test]
    fn dash_inside_title_splits_on_last() {
        let p = parse_track_name("Spider-Man - Danny Elfman");
        assert_eq!(p.title, "Spider-Man");
        assert_eq!(p.artist, "Danny Elfman");
    }

    #[test]
    fn no_dash_is_unknown_artist() {
        let p = parse_track_name("Solo");
        assert_eq!(p.title, "Solo");
        assert_eq!(p.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn no_spaces_around_dash() {
        let p = parse_track_name("Song-Band");
        assert_eq!(p.title, "Song");
        assert_eq!(p.artist, "Band");
    }

    #[test]
    fn trailing_dash_is_unknown_artist() {
        let p = parse_track_name("Untitled -");
        assert_eq!(p.title, "Untitled");
        assert_eq!(p.artist, UNKNOWN_ARTIST);
    }

    #[test]
    fn bare_filename_accepted() {
        assert!(check_bare_filename("Hello World.md").is_ok());
        assert!(check_bare_filename("photo.final.png").is_ok());
    }

    #[test]
    fn bare_filename_rejects_paths() {
        assert!(check_bare_filename("../escape.md").is_err());
        assert!(check_bare_filename("nested/post.md").is_err());
        assert!(check_bare_filename("win\\post.md").is_err());
        assert!(check_bare_filename("..").is_err());
        assert!(check_bare_filename("").is_err());
        assert!(check_bare_filename("   ").is_err());
    }
}
