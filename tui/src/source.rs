//! Feed Selection
//!
//! Decides where console lines come from. An explicit transcript always
//! wins, even when the config file selects the WebSocket transport.

use std::path::Path;

use panel_core::transport::TransportType;

/// Where the TUI gets its console lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource<'a> {
    /// Play a transcript through an in-process transport
    Transcript(&'a Path),
    /// Connect to Moonraker
    Live,
}

/// Pick the feed for `transport` and an optional `--transcript`
///
/// Returns `None` when there is nothing to show: in-process transport
/// without a transcript.
pub fn feed_source(transport: TransportType, transcript: Option<&Path>) -> Option<FeedSource<'_>> {
    match (transcript, transport) {
        (Some(path), _) => Some(FeedSource::Transcript(path)),
        (None, TransportType::WebSocket) => Some(FeedSource::Live),
        (None, TransportType::InProcess) => None,
    }
}
