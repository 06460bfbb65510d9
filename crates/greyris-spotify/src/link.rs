use std::fmt;
use std::str::FromStr;

const SHARE_PREFIX: &str = "https://open.spotify.com/playlist/";
const URI_PREFIX: &str = "spotify:playlist:";
const ID_LEN: usize = 22;

/// Canonical 22-character base62 playlist id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistId(String);

/// Input was neither a playlist share link, a playlist URI nor a bare id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidLink {
    pub input: String,
}

impl fmt::Display for InvalidLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid link: {}", self.input)
    }
}

impl std::error::Error for InvalidLink {}

impl PlaylistId {
    /// Accepts `https://open.spotify.com/playlist/<id>[?si=…]`,
    /// `spotify:playlist:<id>` or `<id>`.
    pub fn parse(input: &str) -> Result<Self, InvalidLink> {
        let s = input.trim();
        let candidate = if let Some(rest) = s.strip_prefix(SHARE_PREFIX) {
            rest.split(['?', '#', '/']).next().unwrap_or_default()
        } else if let Some(rest) = s.strip_prefix(URI_PREFIX) {
            rest
        } else {
            s
        };

        if is_base62_id(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(InvalidLink {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Share link without tracking parameters.
    pub fn canonical_link(&self) -> String {
        format!("{SHARE_PREFIX}{}", self.0)
    }
}

fn is_base62_id(s: &str) -> bool {
    s.len() == ID_LEN && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PlaylistId {
    type Err = InvalidLink;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
