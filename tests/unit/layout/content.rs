use super::*;

fn opts(margin: f64, shadow: Option<f64>) -> LayoutOptions {
    LayoutOptions {
        mini_top_bottom_margin: margin,
        shadow_show: shadow.is_some(),
        shadow: shadow.unwrap_or_default(),
        ..LayoutOptions::default()
    }
}

#[test]
fn margins_only() {
    let l = content_layout(1000, 800, &[], &opts(5.0, None));
    assert_eq!(l.content_top, 50);
    assert_eq!(l.content_height, 900);
    assert_eq!(l.bottom_text_padding, None);
}

#[test]
fn shadow_extends_top_margin() {
    let l = content_layout(1000, 800, &[], &opts(5.0, Some(10.0)));
    assert_eq!(l.content_top, 80);
    assert_eq!(l.content_height, 960);
}

#[test]
fn smaller_shadow_keeps_margin() {
    let l = content_layout(1000, 800, &[], &opts(5.0, Some(1.0)));
    assert_eq!(l.content_top, 50);
    assert_eq!(l.content_height, 900);
}

#[test]
fn text_shrinks_gap_and_adds_bottom_offset() {
    let l = content_layout(1000, 800, &[40.5, 60.0], &opts(5.0, None));
    // offset = 100 * 0.75 + 27 = 102; 100.5 + 800 + 102 = 1002.5
    assert_eq!(l.content_top, 50);
    assert_eq!(l.content_height, 1003);
    let pad = l.bottom_text_padding.unwrap();
    assert!((pad - 27.0).abs() < 1e-9);
}

#[test]
fn content_height_covers_main_photo() {
    for bg in [1u32, 10, 999, 5000] {
        for main in [1u32, 50, 4000] {
            for margin in [0.0, 3.0, 25.0] {
                for shadow in [None, Some(0.0), Some(12.0)] {
                    for texts in [&[][..], &[0.0][..], &[12.5, 80.0][..]] {
                        let l = content_layout(bg, main, texts, &opts(margin, shadow));
                        assert!(l.content_height >= main);
                    }
                }
            }
        }
    }
}

#[test]
fn adding_text_to_a_stack_never_shrinks_content() {
    let o = opts(8.0, Some(4.0));
    let mut texts = vec![30.0];
    let mut prev = content_layout(2000, 1500, &texts, &o).content_height;
    for h in [0.0, 1.0, 45.5, 200.0] {
        texts.push(h);
        let next = content_layout(2000, 1500, &texts, &o).content_height;
        assert!(next >= prev);
        prev = next;
    }
}

#[test]
fn first_text_layer_grows_content_with_typical_margins() {
    let o = opts(3.0, None);
    let without = content_layout(3000, 2400, &[], &o).content_height;
    let with = content_layout(3000, 2400, &[90.0], &o).content_height;
    assert!(with >= without);
}
