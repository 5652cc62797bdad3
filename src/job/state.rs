use std::fmt;

/// Lifecycle of a [`CompositionJob`](crate::job::CompositionJob).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Uninitialized,
    Initialized,
    Rendering,
    Done,
    Failed,
}

impl JobState {
    /// `true` once the job has rendered (or tried to) and may not be reused.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Pipeline stages in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Init,
    LayoutPass1,
    TextFetch,
    MainCache,
    LayoutPass2,
    BackgroundRender,
    ShadowFetch,
    LayerFit,
    Composite,
    Done,
}

impl Stage {
    /// Progress reported once this stage completes, if it is a milestone.
    pub fn progress(self) -> Option<u8> {
        match self {
            Self::Init => Some(10),
            Self::LayoutPass1 => Some(20),
            Self::TextFetch => Some(30),
            Self::MainCache => Some(50),
            Self::LayoutPass2 => Some(60),
            Self::BackgroundRender => Some(70),
            Self::ShadowFetch => Some(90),
            Self::LayerFit => None,
            Self::Composite | Self::Done => Some(100),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::LayoutPass1 => "layout pass 1",
            Self::TextFetch => "text fetch",
            Self::MainCache => "main photo cache",
            Self::LayoutPass2 => "layout pass 2",
            Self::BackgroundRender => "background render",
            Self::ShadowFetch => "shadow fetch",
            Self::LayerFit => "layer fit",
            Self::Composite => "composite",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}
