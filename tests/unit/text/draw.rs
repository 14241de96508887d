use std::sync::Arc;

use super::*;
use crate::assets::resources::Resources;
use crate::fonts::registry::FontRegistry;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::text::font::TextFontDef;
use crate::text::layout::{Alignment, HAlign, TextSpan, VAlign};
use crate::text::template::{RenderParams, SpanTemplate};

fn font(size: f32, color: &str) -> TextFont {
    let registry = FontRegistry::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/fonts"));
    let def = TextFontDef {
        name: "DejaVuSansMono".to_owned(),
        size,
        color: color.to_owned(),
    };
    TextFont::resolve(&def, &registry, &Resources::new()).unwrap()
}

fn span(text: &str, font: Option<Arc<TextFont>>) -> TextSpan {
    TextSpan {
        template: SpanTemplate::parse(text).unwrap(),
        font,
    }
}

fn align(max_lines: usize) -> Alignment {
    Alignment {
        line_height: 24.0,
        max_lines,
        horizontal: HAlign::Left,
        vertical: VAlign::Top,
    }
}

#[test]
fn one_font_one_line_is_one_batch() {
    let f = font(16.0, "000000");
    let spans = [span("Hello {{.name}}", None)];
    let mut params = RenderParams::new();
    params.insert("name".to_owned(), "World".to_owned());
    let layout = TextLayout::build(
        &spans,
        &f,
        &params,
        Rect::new(0.0, 0.0, 400.0, 40.0),
        &align(1),
    )
    .unwrap();

    let b = batches(&layout);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].text, "Hello World");
    assert_eq!(b[0].glyphs.len(), 11);
    assert_eq!(b[0].origin, (b[0].glyphs[0].x, b[0].glyphs[0].y));
}

#[test]
fn font_changes_and_new_lines_split_batches() {
    let base = font(12.0, "000000");
    let red = Arc::new(font(12.0, "ff0000"));
    let spans = [
        span("ab", None),
        span("cd", Some(Arc::clone(&red))),
        span("ef", None),
    ];
    let one_line = TextLayout::build(
        &spans,
        &base,
        &RenderParams::new(),
        Rect::new(0.0, 0.0, 400.0, 40.0),
        &align(1),
    )
    .unwrap();
    let texts: Vec<_> = batches(&one_line).into_iter().map(|b| b.text).collect();
    assert_eq!(texts, ["ab", "cd", "ef"]);

    // Same font throughout, but three runes per line forces a restart on each line.
    let adv = base.face().unwrap().measure('a').unwrap().1.advance;
    let plain = [span("abcdef", None)];
    let wrapped = TextLayout::build(
        &plain,
        &base,
        &RenderParams::new(),
        Rect::new(0.0, 0.0, f64::from(adv * 3.5), 80.0),
        &align(3),
    )
    .unwrap();
    let texts: Vec<_> = batches(&wrapped).into_iter().map(|b| b.text).collect();
    assert_eq!(texts, ["abc", "def"]);
}

#[test]
fn glyphs_are_painted_inside_clip_only() {
    let f = font(32.0, "000000");
    let spans = [span("MMMMMMMMMMMMMMMM", None)];
    let clip = Rect::new(10.0, 10.0, 60.0, 50.0);
    let layout = TextLayout::build(
        &spans,
        &f,
        &RenderParams::new(),
        Rect::new(10.0, 10.0, 500.0, 50.0),
        &Alignment {
            line_height: 40.0,
            max_lines: 1,
            horizontal: HAlign::Left,
            vertical: VAlign::Top,
        },
    )
    .unwrap();

    let mut surface = Surface::new(Canvas::new(200, 80).unwrap());
    let white = Rgba8Premul::from_straight_rgba(255, 255, 255, 255);
    surface.fill(white);
    draw_batches(&mut surface, clip, &batches(&layout)).unwrap();

    let mut inked = 0;
    for y in 0..80 {
        for x in 0..200 {
            let px = surface.pixel(x, y).unwrap();
            let inside = clip.contains(crate::foundation::core::Point::new(
                f64::from(x) + 0.5,
                f64::from(y) + 0.5,
            ));
            if !inside {
                assert_eq!(px, white, "({x},{y}) outside clip was touched");
            } else if px.r < 128 {
                inked += 1;
            }
            assert_eq!(px.a, 255);
        }
    }
    assert!(inked > 50, "expected dark glyph pixels, got {inked}");
}

#[test]
fn empty_batches_leave_surface_untouched() {
    let mut surface = Surface::new(Canvas::new(4, 4).unwrap());
    draw_batches(&mut surface, Rect::new(0.0, 0.0, 4.0, 4.0), &[]).unwrap();
    assert!(surface.data().iter().all(|&b| b == 0));
}

#[test]
fn text_near_the_far_edge_of_a_very_wide_canvas_draws() {
    let f = font(16.0, "000000");
    let spans = [span("Hi", None)];
    let width = u32::from(u16::MAX) + 4_465;
    let x0 = f64::from(width) - 80.0;
    let bounds = Rect::new(x0, 0.0, x0 + 60.0, 24.0);
    let layout = TextLayout::build(&spans, &f, &RenderParams::new(), bounds, &align(1)).unwrap();

    let mut surface = Surface::new(Canvas::new(width, 24).unwrap());
    draw_batches(&mut surface, bounds, &batches(&layout)).unwrap();

    let mut inked = 0;
    for y in 0..24 {
        for x in 0..width {
            let px = surface.pixel(x, y).unwrap();
            if px.a > 0 {
                assert!(bounds.contains(crate::foundation::core::Point::new(
                    f64::from(x) + 0.5,
                    f64::from(y) + 0.5,
                )));
                inked += 1;
            }
        }
    }
    assert!(inked > 10, "expected glyph pixels, got {inked}");
}

#[test]
fn clip_outside_the_surface_draws_nothing() {
    let f = font(16.0, "000000");
    let spans = [span("Hi", None)];
    let bounds = Rect::new(100.0, 0.0, 160.0, 24.0);
    let layout = TextLayout::build(&spans, &f, &RenderParams::new(), bounds, &align(1)).unwrap();

    let mut surface = Surface::new(Canvas::new(40, 24).unwrap());
    draw_batches(&mut surface, bounds, &batches(&layout)).unwrap();
    assert!(surface.data().iter().all(|&b| b == 0));
}
