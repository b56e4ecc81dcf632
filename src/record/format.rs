//! Recording format negotiation
//!
//! Fixed preference list probed against the device's capability table;
//! first supported entry wins.

use serde::{Deserialize, Serialize};

/// Container a finished clip is packaged in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Webm,
}

impl ContainerFormat {
    /// File extension used when the clip is saved.
    ///
    /// Webm clips get a QuickTime extension so they open in the stock
    /// player on the target phones.
    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Webm => "mov",
        }
    }
}

/// A negotiable recording format: mime string plus its container tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaType {
    pub mime: &'static str,
    pub container: ContainerFormat,
}

/// Ordered format preference, most compatible first.
///
/// mp4 plays directly on iPhone; the webm variants trade that for
/// guaranteed recordability, ending in an unconstrained entry so
/// negotiation only fails on a device that records nothing at all.
pub const FORMAT_PREFERENCE: [MediaType; 4] = [
    MediaType {
        mime: "video/mp4",
        container: ContainerFormat::Mp4,
    },
    MediaType {
        mime: "video/webm;codecs=h264",
        container: ContainerFormat::Webm,
    },
    MediaType {
        mime: "video/webm;codecs=vp9",
        container: ContainerFormat::Webm,
    },
    MediaType {
        mime: "video/webm",
        container: ContainerFormat::Webm,
    },
];

/// Capability table reported by an encoder device
pub trait FormatSupport {
    /// Whether the device can record `mime`
    fn supports(&self, mime: &str) -> bool;
}

/// Pick the first supported entry from [`FORMAT_PREFERENCE`].
///
/// Returns `None` when the table supports nothing; callers treat that as a
/// hard recorder-start failure.
pub fn negotiate<S: FormatSupport + ?Sized>(support: &S) -> Option<MediaType> {
    FORMAT_PREFERENCE
        .iter()
        .copied()
        .find(|media_type| support.supports(media_type.mime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Table(HashSet<&'static str>);

    impl FormatSupport for Table {
        fn supports(&self, mime: &str) -> bool {
            self.0.contains(mime)
        }
    }

    fn table(mimes: &[&'static str]) -> Table {
        Table(mimes.iter().copied().collect())
    }

    #[test]
    fn test_primary_format_wins_when_supported() {
        let chosen = negotiate(&table(&["video/mp4", "video/webm"])).unwrap();
        assert_eq!(chosen.mime, "video/mp4");
        assert_eq!(chosen.container, ContainerFormat::Mp4);
    }

    #[test]
    fn test_third_option_only() {
        // Capability table reporting support only for the vp9 variant
        let chosen = negotiate(&table(&["video/webm;codecs=vp9"])).unwrap();
        assert_eq!(chosen.mime, "video/webm;codecs=vp9");
        assert_eq!(chosen.container, ContainerFormat::Webm);
    }

    #[test]
    fn test_unconstrained_fallback() {
        let chosen = negotiate(&table(&["video/webm"])).unwrap();
        assert_eq!(chosen.mime, "video/webm");
    }

    #[test]
    fn test_nothing_supported() {
        assert!(negotiate(&table(&[])).is_none());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(ContainerFormat::Mp4.extension(), "mp4");
        assert_eq!(ContainerFormat::Webm.extension(), "mov");
    }
}
