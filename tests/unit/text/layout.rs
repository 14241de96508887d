use super::*;
use crate::assets::resources::Resources;
use crate::fonts::registry::FontRegistry;
use crate::text::font::TextFontDef;

fn font(size: f32, color: &str) -> TextFont {
    let registry = FontRegistry::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts"));
    let def = TextFontDef {
        name: "DejaVuSansMono".to_owned(),
        size,
        color: color.to_owned(),
    };
    TextFont::resolve(&def, &registry, &Resources::new()).unwrap()
}

fn span(text: &str) -> TextSpan {
    TextSpan {
        template: SpanTemplate::parse(text).unwrap(),
        font: None,
    }
}

fn align(line_height: f32, max_lines: usize, h: HAlign, v: VAlign) -> Alignment {
    Alignment {
        line_height,
        max_lines,
        horizontal: h,
        vertical: v,
    }
}

fn advance_of(f: &TextFont) -> f32 {
    f.face().unwrap().measure('M').unwrap().1.advance
}

fn params(pairs: &[(&str, &str)]) -> RenderParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn every_line_stays_strictly_under_width_budget() {
    let f = font(13.0, "000000");
    let spans = [span("The quick brown fox jumps over the lazy dog, twice over.")];
    let runes = resolve_runes(&spans, &f, &RenderParams::new()).unwrap();

    for width in [20.0f32, 47.5, 100.0, 333.0] {
        let lines = wrap_lines(&runes, width, usize::MAX);
        assert!(!lines.is_empty());
        for line in &lines {
            let sum: f32 = runes[line.clone()].iter().map(|r| r.metrics.advance).sum();
            assert!(sum < width, "width {width}: {sum}");
            if let Some(next) = runes.get(line.end) {
                assert!(sum + next.metrics.advance >= width, "width {width}");
            }
        }
        // Lines are contiguous and cover the whole sequence when unbounded.
        assert_eq!(lines.last().unwrap().end, runes.len());
    }
}

#[test]
fn monospace_runs_split_by_whole_advances() {
    let f = font(10.0, "000000");
    let adv = advance_of(&f);
    let spans = [span("AAAAAAAA")];
    let runes = resolve_runes(&spans, &f, &RenderParams::new()).unwrap();

    assert_eq!(wrap_lines(&runes, adv * 3.5, 10), vec![0..3, 3..6, 6..8]);
    assert_eq!(wrap_lines(&runes, adv * 4.5, 10), vec![0..4, 4..8]);
    assert_eq!(wrap_lines(&runes, adv * 3.5, 2), vec![0..3, 3..6]);
}

#[test]
fn overflow_beyond_max_lines_is_dropped() {
    let f = font(10.0, "000000");
    let adv = advance_of(&f);
    let spans = [span("ABCDEFGHIJKLMNOP")];
    let bounds = Rect::new(0.0, 0.0, f64::from(adv * 5.5), 100.0);
    let layout = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        bounds,
        &align(12.0, 2, HAlign::Left, VAlign::Top),
    )
    .unwrap();

    assert_eq!(layout.line_count(), 2);
    assert_eq!(layout.line_text(0).as_deref(), Some("ABCDE"));
    assert_eq!(layout.line_text(1).as_deref(), Some("FGHIJ"));
    assert_eq!(layout.runes().len(), 10);
}

#[test]
fn zero_max_lines_and_empty_text_yield_nothing() {
    let f = font(10.0, "000000");
    let bounds = Rect::new(0.0, 0.0, 200.0, 50.0);
    let spans = [span("text")];
    let layout = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        bounds,
        &align(12.0, 0, HAlign::Left, VAlign::Top),
    )
    .unwrap();
    assert_eq!(layout.line_count(), 0);
    assert!(layout.runes().is_empty());

    let empty = [span("")];
    let layout = TextLayout::build(
        &empty,
        &f,
        &RenderParams::new(),
        bounds,
        &align(12.0, 3, HAlign::Left, VAlign::Top),
    )
    .unwrap();
    assert_eq!(layout.line_count(), 0);
}

#[test]
fn rune_wider_than_block_stops_wrapping() {
    let f = font(40.0, "000000");
    let spans = [span("WW")];
    let runes = resolve_runes(&spans, &f, &RenderParams::new()).unwrap();
    assert!(wrap_lines(&runes, 5.0, 4).is_empty());
}

#[test]
fn center_and_middle_alignment_math() {
    let f = font(10.0, "000000");
    let adv = advance_of(&f);
    let spans = [span("ABCDEFG")];
    let bounds = Rect::new(10.0, 20.0, 10.0 + f64::from(adv * 4.5), 120.0);
    let layout = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        bounds,
        &align(16.0, 5, HAlign::Center, VAlign::Middle),
    )
    .unwrap();
    assert_eq!(layout.line_count(), 2);

    let block_w = bounds.width() as f32;
    for line in layout.lines() {
        let total: f32 = line.iter().map(|r| r.metrics.advance).sum();
        let expected = 10.0 + (block_w - total) / 2.0;
        assert!((line[0].x - expected).abs() < 1e-3, "{} vs {expected}", line[0].x);
        for pair in line.windows(2) {
            assert!((pair[1].x - pair[0].x - pair[0].metrics.advance).abs() < 1e-4);
            assert_eq!(pair[0].y, pair[1].y);
        }
    }

    // Two 16px bands centered in a 100px block starting at y=20.
    let top = 20.0 + (100.0 - 32.0) / 2.0;
    let lines: Vec<_> = layout.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let ascent = line.iter().map(|r| r.metrics.ascent).fold(0.0, f32::max);
        let descent = line.iter().map(|r| r.metrics.descent).fold(0.0, f32::max);
        let band_top = top + 16.0 * i as f32;
        let expected = band_top + (16.0 - ascent - descent) / 2.0 + ascent;
        assert!((line[0].y - expected).abs() < 1e-3);
    }
    assert!((lines[1][0].y - lines[0][0].y - 16.0).abs() < 1.0);
}

#[test]
fn left_right_top_bottom_edges() {
    let f = font(10.0, "000000");
    let spans = [span("Hi")];
    let bounds = Rect::new(5.0, 0.0, 205.0, 60.0);
    let total: f32 = resolve_runes(&spans, &f, &RenderParams::new())
        .unwrap()
        .iter()
        .map(|r| r.metrics.advance)
        .sum();

    let left = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        bounds,
        &align(20.0, 1, HAlign::Left, VAlign::Top),
    )
    .unwrap();
    assert_eq!(left.runes()[0].x, 5.0);

    let right = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        bounds,
        &align(20.0, 1, HAlign::Right, VAlign::Bottom),
    )
    .unwrap();
    assert!((right.runes()[0].x - (205.0 - total)).abs() < 1e-3);
    // Bottom alignment places the single band in [40, 60).
    assert!(right.runes()[0].y > 40.0 && right.runes()[0].y < 60.0);
    assert!(left.runes()[0].y > 0.0 && left.runes()[0].y < 20.0);
}

#[test]
fn params_are_substituted_and_span_fonts_override() {
    let base = font(10.0, "000000");
    let other = Arc::new(font(20.0, "ff0000"));
    let spans = [
        span("Hello {{.name}}"),
        TextSpan {
            template: SpanTemplate::parse("!").unwrap(),
            font: Some(Arc::clone(&other)),
        },
    ];
    let runes = resolve_runes(&spans, &base, &params(&[("name", "World")])).unwrap();
    let text: String = runes.iter().map(|r| r.ch).collect();
    assert_eq!(text, "Hello World!");
    assert!(std::ptr::eq(runes[0].font, &base));
    assert!(std::ptr::eq(runes[11].font, other.as_ref()));
}

#[test]
fn missing_param_and_unmapped_glyph_are_render_errors() {
    let f = font(10.0, "000000");
    let spans = [span("Hello {{.name}}")];
    let err = resolve_runes(&spans, &f, &RenderParams::new()).unwrap_err();
    assert!(matches!(err, ImprintError::Render(_)), "{err}");

    let spans = [span("ok\u{10FFFD}")];
    let err = resolve_runes(&spans, &f, &RenderParams::new()).unwrap_err();
    assert!(err.to_string().contains("span resolution"), "{err}");
}

#[test]
fn alignment_json_defaults() {
    let a: Alignment = serde_json::from_str(r#"{"line_height": 18}"#).unwrap();
    assert_eq!(a.max_lines, 1);
    assert_eq!(a.horizontal, HAlign::Center);
    assert_eq!(a.vertical, VAlign::Top);
    assert!(a.validate().is_ok());

    let a: Alignment =
        serde_json::from_str(r#"{"line_height": 0, "horizontal": "right", "vertical": "bottom"}"#)
            .unwrap();
    assert!(matches!(a.validate(), Err(ImprintError::Validation(_))));
}
