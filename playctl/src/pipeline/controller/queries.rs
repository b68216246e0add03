//! Position, duration and volume queries

use super::Inner;
use crate::engine::EngineAdapter;
use playctl_common::{PipelineState, PositionUnit, VolumeFormat};

impl<E: EngineAdapter> Inner<E> {
    pub(super) fn position(&self, unit: PositionUnit) -> Option<u64> {
        if self.state == PipelineState::Idle {
            return None;
        }
        self.engine.get_position(unit)
    }

    pub(super) fn duration(&self, unit: PositionUnit) -> Option<u64> {
        self.durations.get(unit)
    }

    /// Engine volume, or the postponed target if one is pending
    pub(super) fn volume(&self, format: VolumeFormat) -> f64 {
        if !self.engine.supports_volume() {
            return format.full_volume();
        }
        match self.postponed.pending_volume() {
            Some((volume, pending_format)) => pending_format.convert(volume, format),
            None => self.engine.get_volume(format),
        }
    }

    pub(super) fn muted(&self) -> bool {
        if !self.engine.supports_volume() {
            return false;
        }
        self.postponed
            .pending_mute()
            .unwrap_or_else(|| self.engine.is_muted())
    }
}
