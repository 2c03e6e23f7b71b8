//! Explicit model of the per-image processing race.
//!
//! After upload, two independent consumers work on the same image: the
//! thumbnail branch and the moderation branch. Nothing at runtime orders one
//! before the other, so the combined state is modeled here as a product of
//! the two branches with a single transition function. A `Blurred` moderation
//! outcome overrides an already-finished thumbnail branch for display
//! purposes; the reverse never holds.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailState {
    Pending,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationState {
    Pending,
    Clean,
    Blurred,
}

/// Which blob variant viewers should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleVariant {
    Original,
    Blurred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    ThumbnailStored,
    ModerationPassed,
    ModerationBlurred,
}

/// Combined state of one uploaded image across both branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub thumbnail: ThumbnailState,
    pub moderation: ModerationState,
}

impl PipelineState {
    /// State at the moment the original blob upload succeeds.
    pub fn uploaded() -> Self {
        Self {
            thumbnail: ThumbnailState::Pending,
            moderation: ModerationState::Pending,
        }
    }

    /// Apply a branch event. Transitions are one-way: `Ready` never reverts,
    /// `Blurred` is sticky and can follow `Clean` (a redelivered or late
    /// moderation verdict may still blur), but `Clean` cannot displace
    /// `Blurred`.
    pub fn apply(self, event: PipelineEvent) -> Self {
        match event {
            PipelineEvent::ThumbnailStored => Self {
                thumbnail: ThumbnailState::Ready,
                ..self
            },
            PipelineEvent::ModerationPassed => match self.moderation {
                ModerationState::Blurred => self,
                _ => Self {
                    moderation: ModerationState::Clean,
                    ..self
                },
            },
            PipelineEvent::ModerationBlurred => Self {
                moderation: ModerationState::Blurred,
                ..self
            },
        }
    }

    /// Both branches have reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.thumbnail == ThumbnailState::Ready
            && self.moderation != ModerationState::Pending
    }

    /// Moderation's verdict decides what is visible; a blur overrides a
    /// thumbnail generated from the clean original.
    pub fn visible_variant(&self) -> VisibleVariant {
        match self.moderation {
            ModerationState::Blurred => VisibleVariant::Blurred,
            _ => VisibleVariant::Original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branches_settle_in_either_order() {
        let a = PipelineState::uploaded()
            .apply(PipelineEvent::ThumbnailStored)
            .apply(PipelineEvent::ModerationPassed);
        let b = PipelineState::uploaded()
            .apply(PipelineEvent::ModerationPassed)
            .apply(PipelineEvent::ThumbnailStored);
        assert_eq!(a, b);
        assert!(a.is_settled());
        assert_eq!(a.visible_variant(), VisibleVariant::Original);
    }

    #[test]
    fn blur_overrides_finished_thumbnail() {
        let state = PipelineState::uploaded()
            .apply(PipelineEvent::ThumbnailStored)
            .apply(PipelineEvent::ModerationBlurred);
        assert!(state.is_settled());
        assert_eq!(state.visible_variant(), VisibleVariant::Blurred);
    }

    #[test]
    fn blurred_is_sticky() {
        let state = PipelineState::uploaded()
            .apply(PipelineEvent::ModerationBlurred)
            .apply(PipelineEvent::ModerationPassed);
        assert_eq!(state.moderation, ModerationState::Blurred);
    }

    #[test]
    fn late_blur_can_follow_clean() {
        let state = PipelineState::uploaded()
            .apply(PipelineEvent::ModerationPassed)
            .apply(PipelineEvent::ModerationBlurred);
        assert_eq!(state.visible_variant(), VisibleVariant::Blurred);
    }

    #[test]
    fn unsettled_until_both_branches_finish() {
        let state = PipelineState::uploaded().apply(PipelineEvent::ThumbnailStored);
        assert!(!state.is_settled());
    }
}
