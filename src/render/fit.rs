use image::imageops::{self, FilterType};

use crate::foundation::core::{Size, fit_inside};
use crate::foundation::error::{FramemarkError, FramemarkResult};
use crate::render::LayerSource;

/// How strictly a layer is reconciled against its bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitMode {
    /// Always decode and resize-inside (preview).
    Forced,
    /// Probe first and only resize when the layer overflows (export).
    Conditional,
}

impl FitMode {
    /// Ordered strategies tried for this mode; the first success wins.
    pub fn strategies(self) -> &'static [FitStrategy] {
        match self {
            Self::Forced => &[FitStrategy::ForcedResize, FitStrategy::Passthrough],
            Self::Conditional => &[
                FitStrategy::ConditionalResize,
                FitStrategy::ProbeFailureResize,
                FitStrategy::Passthrough,
            ],
        }
    }

    fn filter(self) -> FilterType {
        match self {
            Self::Forced => FilterType::Triangle,
            Self::Conditional => FilterType::Lanczos3,
        }
    }
}

/// One step of the fitting cascade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitStrategy {
    /// Decode with orientation and resize inside the bounds, never enlarging.
    ForcedResize,
    /// Probe the size; pass through when it fits, resize inside otherwise.
    ConditionalResize,
    /// Forced resize after the probe failed.
    ProbeFailureResize,
    /// Hand the original data on with an unknown (zero) size.
    Passthrough,
}

/// What the cascade did to a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FitOutcome {
    /// The layer already fit and was left alone.
    Unchanged,
    /// The layer was decoded and resized inside the bounds.
    Resized,
    /// Nothing could be measured; the data is passed through as-is.
    Unknown,
}

/// A layer after fitting.
#[derive(Clone, Debug)]
pub struct FittedLayer {
    /// Pixel source to composite.
    pub source: LayerSource,
    /// Measured size; zero when [`FitOutcome::Unknown`].
    pub size: Size,
    /// Strategy that produced this result.
    pub strategy: FitStrategy,
    /// Typed outcome.
    pub outcome: FitOutcome,
}

/// Reconcile `source` with `bounds`. Never fails; decode errors surface later at composite.
pub fn fit_to_bounds(
    source: &LayerSource,
    bounds: Size,
    mode: FitMode,
    label: &str,
) -> FittedLayer {
    for &strategy in mode.strategies() {
        match attempt(strategy, source, bounds, mode.filter(), label) {
            Ok(fitted) => return fitted,
            Err(err) => {
                tracing::warn!(layer = label, ?strategy, error = %err, "layer fitting step failed");
            }
        }
    }
    passthrough(source)
}

fn attempt(
    strategy: FitStrategy,
    source: &LayerSource,
    bounds: Size,
    filter: FilterType,
    label: &str,
) -> FramemarkResult<FittedLayer> {
    match strategy {
        FitStrategy::ForcedResize | FitStrategy::ProbeFailureResize => {
            resize_inside(strategy, source, bounds, filter)
        }
        FitStrategy::ConditionalResize => {
            let probed = source.probe()?;
            if probed.is_empty() {
                return Ok(FittedLayer {
                    strategy,
                    ..passthrough(source)
                });
            }
            if probed.fits_within(bounds) {
                return Ok(FittedLayer {
                    source: source.clone(),
                    size: probed,
                    strategy,
                    outcome: FitOutcome::Unchanged,
                });
            }
            tracing::warn!(
                layer = label,
                width = probed.width,
                height = probed.height,
                bg_width = bounds.width,
                bg_height = bounds.height,
                "layer exceeds background, resizing"
            );
            resize_inside(strategy, source, bounds, filter)
        }
        FitStrategy::Passthrough => Ok(passthrough(source)),
    }
}

fn resize_inside(
    strategy: FitStrategy,
    source: &LayerSource,
    bounds: Size,
    filter: FilterType,
) -> FramemarkResult<FittedLayer> {
    let img = source.decode()?;
    if img.width() == 0 || img.height() == 0 {
        return Err(FramemarkError::validation("cannot resize an empty layer"));
    }
    let target = fit_inside(Size::new(img.width(), img.height()), bounds);
    let img = if target.width == img.width() && target.height == img.height() {
        img
    } else {
        imageops::resize(&img, target.width, target.height, filter)
    };
    Ok(FittedLayer {
        source: LayerSource::raster(img),
        size: target,
        strategy,
        outcome: FitOutcome::Resized,
    })
}

fn passthrough(source: &LayerSource) -> FittedLayer {
    FittedLayer {
        source: source.clone(),
        size: Size::default(),
        strategy: FitStrategy::Passthrough,
        outcome: FitOutcome::Unknown,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
