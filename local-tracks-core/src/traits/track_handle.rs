use std::sync::Arc;

/// A live hardware track returned by the capture provider.
///
/// `close()` releases the underlying device and must be idempotent:
/// calling it on an already-closed track is a no-op.
pub trait TrackHandle: Send + Sync {
    /// Stable identity of the track. Two handles with the same id are the
    /// same track.
    fn id(&self) -> &str;

    /// Release the hardware resource.
    fn close(&self);
}

/// Shared reference to a provider track, as held by the session and
/// handed out to consumers.
pub type SharedTrack = Arc<dyn TrackHandle>;

/// Identity comparison by track id.
pub fn same_track(a: &SharedTrack, b: &SharedTrack) -> bool {
    a.id() == b.id()
}

/// Identity comparison for optional tracks (both absent counts as equal).
pub fn same_optional_track(a: Option<&SharedTrack>, b: Option<&SharedTrack>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same_track(a, b),
        (None, None) => true,
        _ => false,
    }
}
