//! Playback adapters

mod rodio_sink;

pub use rodio_sink::{PlaybackRef, RodioPlaybackSink};
