//! Per-track timestamp reconciliation.

use flvmend_media::flv::{Tag, TrackKind};

/// Monotonicity state for one track, persisting across the whole rewrite
/// pass.
///
/// In fix mode a cumulative shift carries forward: once a regression has
/// been corrected, every later tag of the track is shifted by the same
/// amount, preserving the stream's original inter-frame deltas. A tag
/// that still regresses after the shift re-derives it from
/// `last_dts + last_delta`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackTimeline {
    last_dts: u32,
    last_delta: u32,
    shift: u32,
}

impl TrackTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one timestamp. Returns the timestamp to emit: corrected
    /// in fix mode, the input unchanged otherwise. A regression is warned
    /// about either way.
    pub fn reconcile(&mut self, kind: TrackKind, dts: u32, fix: bool) -> u32 {
        let mut out = if fix { dts.wrapping_add(self.shift) } else { dts };

        if out < self.last_dts {
            tracing::warn!(
                "non-monotonic {} timestamp: {} followed by {}",
                kind,
                self.last_dts,
                out
            );
            if fix {
                let corrected = self.last_dts.wrapping_add(self.last_delta);
                self.shift = corrected.wrapping_sub(dts);
                out = corrected;
            }
        }

        self.last_delta = out.wrapping_sub(self.last_dts);
        self.last_dts = out;
        out
    }
}

/// The three per-track timelines threaded through a rewrite pass.
#[derive(Debug, Default)]
pub struct TimelineSet {
    video: TrackTimeline,
    audio: TrackTimeline,
    meta: TrackTimeline,
    fix: bool,
}

impl TimelineSet {
    /// Create a timeline set; `fix` enables timestamp correction.
    pub fn new(fix: bool) -> Self {
        Self {
            fix,
            ..Default::default()
        }
    }

    /// Reconcile a tag in place. Each track is tracked independently;
    /// this must be called exactly once per tag, in source order.
    pub fn reconcile(&mut self, tag: &mut Tag) {
        let kind = tag.kind();
        let timeline = match kind {
            TrackKind::Video => &mut self.video,
            TrackKind::Audio => &mut self.audio,
            TrackKind::Meta => &mut self.meta,
        };
        let dts = timeline.reconcile(kind, tag.dts(), self.fix);
        tag.set_dts(dts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(timeline: &mut TrackTimeline, input: &[u32], fix: bool) -> Vec<u32> {
        input
            .iter()
            .map(|&dts| timeline.reconcile(TrackKind::Video, dts, fix))
            .collect()
    }

    #[test]
    fn test_monotonic_input_passes_through() {
        let mut timeline = TrackTimeline::new();
        assert_eq!(
            run(&mut timeline, &[0, 40, 80, 120], true),
            vec![0, 40, 80, 120]
        );
    }

    #[test]
    fn test_regression_correction_state_machine() {
        // The worked example: the regression at 900 is corrected to
        // last + last_delta = 2000, and the resulting shift of 1100
        // carries into the following tag.
        let mut timeline = TrackTimeline::new();
        assert_eq!(
            run(&mut timeline, &[0, 1000, 900, 1100], true),
            vec![0, 1000, 2000, 2200]
        );
    }

    #[test]
    fn test_fix_disabled_passes_regressions_through() {
        let mut timeline = TrackTimeline::new();
        assert_eq!(
            run(&mut timeline, &[0, 1000, 900, 1100], false),
            vec![0, 1000, 900, 1100]
        );
    }

    #[test]
    fn test_double_regression() {
        let mut timeline = TrackTimeline::new();
        // Second regression after the shift has stabilized: 3000+1100 =
        // 4100 < 4200, so it re-derives from last + delta.
        let out = run(&mut timeline, &[0, 1000, 900, 1100, 3000, 2900], true);
        assert_eq!(out[..4], [0, 1000, 2000, 2200]);
        assert_eq!(out[4], 4100);
        // 2900 + 1100 = 4000 < 4100 regresses again: corrected to
        // 4100 + 1900 = 6000.
        assert_eq!(out[5], 6000);
    }

    #[test]
    fn test_fixed_output_is_non_decreasing() {
        let mut timeline = TrackTimeline::new();
        let out = run(
            &mut timeline,
            &[10, 5, 500, 20, 30, 1000, 999, 1001],
            true,
        );
        for pair in out.windows(2) {
            assert!(pair[0] <= pair[1], "regression in {:?}", out);
        }
    }

    #[test]
    fn test_tracks_reconciled_independently() {
        let mut set = TimelineSet::new(true);
        let mut video =
            Tag::from_wire(flvmend_media::flv::TAG_TYPE_VIDEO, 1000, vec![0x17, 0x00], 0).unwrap();
        set.reconcile(&mut video);

        // Audio starting over at 0 is not a regression for its own track.
        let mut audio =
            Tag::from_wire(flvmend_media::flv::TAG_TYPE_AUDIO, 0, vec![0xAF, 0x01], 0).unwrap();
        set.reconcile(&mut audio);
        assert_eq!(audio.dts(), 0);
    }
}
