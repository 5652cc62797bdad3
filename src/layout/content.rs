use crate::foundation::config::LayoutOptions;

/// Extra bottom margin below the text stack, as a fraction of background height.
pub const TEXT_BOTTOM_RATIO: f64 = 0.027;

/// Share of the doubled top margin kept between photo and text when text is present.
const TEXT_GAP_FACTOR: f64 = 0.75;

/// Vertical layout derived from the background height and the assembled layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContentLayout {
    /// Offset of the main photo from the top of the content block.
    pub content_top: u32,
    /// Total content height (margins, shadow, photo and text stack).
    pub content_height: u32,
    /// Padding the bottommost text layer absorbs; `None` without text.
    pub bottom_text_padding: Option<f64>,
}

/// Compute the content block for a background of `bg_height`.
///
/// `text_heights` are the declared heights of the text stack in authored order; they are
/// summed as given. The caller applies [`ContentLayout::bottom_text_padding`] to the last
/// text layer afterwards.
pub fn content_layout(
    bg_height: u32,
    main_height: u32,
    text_heights: &[f64],
    opts: &LayoutOptions,
) -> ContentLayout {
    let bg_height = f64::from(bg_height);
    let margin_pct = opts.mini_top_bottom_margin.max(0.0);
    let main_top_offset = bg_height * (margin_pct / 100.0);
    let text_bottom_offset = bg_height * TEXT_BOTTOM_RATIO;

    let mut content_top = main_top_offset.ceil();
    let mut main_offset = content_top * 2.0;

    if opts.shadow_show {
        let shadow_height = (f64::from(main_height) * (opts.shadow.max(0.0) / 100.0)).ceil();
        content_top = content_top.max(shadow_height);
        main_offset = content_top * 2.0;
    }

    let has_text = !text_heights.is_empty();
    if has_text {
        main_offset *= TEXT_GAP_FACTOR;
        main_offset += text_bottom_offset;
    }

    let text_h: f64 = text_heights.iter().map(|h| h.max(0.0)).sum();
    let content_height = (text_h + f64::from(main_height) + main_offset).ceil();

    ContentLayout {
        content_top: content_top as u32,
        content_height: content_height.max(1.0) as u32,
        bottom_text_padding: has_text.then_some(text_bottom_offset),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/content.rs"]
mod tests;
