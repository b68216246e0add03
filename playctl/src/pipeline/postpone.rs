//! Postponed requests
//!
//! Calls that cannot be honored while the pipeline is transitioning are
//! stored here, one slot per request kind. A newer request of the same kind
//! overwrites the older one. Draining hands them back in the fixed order
//! stop > play > pause > seek > volume > mute.

use crate::media::Media;
use playctl_common::{PositionUnit, Token, VolumeFormat};

/// A single postponed request
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Stop,
    Play { token: Token, media: Media },
    Pause(bool),
    Seek { position: u64, unit: PositionUnit },
    Volume { volume: f64, format: VolumeFormat },
    Mute(bool),
}

#[derive(Debug, Default)]
pub struct PostponedIntents {
    stop: bool,
    play: Option<(Token, Media)>,
    pause: Option<bool>,
    seek: Option<(u64, PositionUnit)>,
    volume: Option<(f64, VolumeFormat)>,
    mute: Option<bool>,
}

impl PostponedIntents {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stop supersedes every earlier play, pause and seek
    pub fn postpone_stop(&mut self) {
        self.stop = true;
        self.play = None;
        self.pause = None;
        self.seek = None;
    }

    pub fn postpone_play(&mut self, token: Token, media: Media) {
        self.play = Some((token, media));
    }

    pub fn postpone_pause(&mut self, paused: bool) {
        self.pause = Some(paused);
    }

    pub fn postpone_seek(&mut self, position: u64, unit: PositionUnit) {
        self.seek = Some((position, unit));
    }

    pub fn postpone_volume(&mut self, volume: f64, format: VolumeFormat) {
        self.volume = Some((volume, format));
    }

    pub fn postpone_mute(&mut self, muted: bool) {
        self.mute = Some(muted);
    }

    pub fn pending_volume(&self) -> Option<(f64, VolumeFormat)> {
        self.volume
    }

    pub fn pending_mute(&self) -> Option<bool> {
        self.mute
    }

    /// Drop a pending stop and seek; both targeted media being replaced
    pub fn discard_stop_and_seek(&mut self) {
        self.stop = false;
        self.seek = None;
    }

    /// Take the highest-priority intent, clearing it
    pub fn take_next(&mut self) -> Option<Intent> {
        if std::mem::take(&mut self.stop) {
            return Some(Intent::Stop);
        }
        if let Some((token, media)) = self.play.take() {
            return Some(Intent::Play { token, media });
        }
        if let Some(paused) = self.pause.take() {
            return Some(Intent::Pause(paused));
        }
        if let Some((position, unit)) = self.seek.take() {
            return Some(Intent::Seek { position, unit });
        }
        if let Some((volume, format)) = self.volume.take() {
            return Some(Intent::Volume { volume, format });
        }
        self.mute.take().map(Intent::Mute)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        !self.stop
            && self.play.is_none()
            && self.pause.is_none()
            && self.seek.is_none()
            && self.volume.is_none()
            && self.mute.is_none()
    }
}
