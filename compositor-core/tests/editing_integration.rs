//! Integration tests for editing a composition through `EditorState`.
//!
//! Drives the editor the way a host view would: toolbar calls plus touch
//! events, with a fixed-advance text measure standing in for real fonts.

use compositor_core::{
    AspectPreset, CanvasConfig, Color, DecodeState, EditorState, GestureState, Point, ResizeMode,
    Selection, TextMeasure, TouchEvent, TouchPhase,
};

/// Every character advances by half the font size.
struct HalfEm;

impl TextMeasure for HalfEm {
    fn text_width(&self, text: &str, _font: &str, font_size: f32) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f32;
        chars * font_size * 0.5
    }
}

fn touch(state: &mut EditorState, phase: TouchPhase, x: f32, y: f32) -> bool {
    state.handle_touch(&TouchEvent::single(phase, x, y), &HalfEm)
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ==========================================================================
// Layer creation
// ==========================================================================

#[test]
fn test_text_defaults_on_non_square_canvas() {
    let mut state = EditorState::new(
        CanvasConfig::new(640, 360).expect("valid canvas"),
        ResizeMode::Anchored,
    );
    state.select_font("Verdana");
    let id = state.add_text();

    let text = state.document().text(id).expect("text exists");
    assert_eq!(text.position(), Point::new(320.0, 180.0));
    assert_eq!(text.font, "Verdana");
    assert_eq!(text.content, "新文本");
    assert!(approx(text.font_size, 30.0));
    assert_eq!(text.color, Color::BLACK);
}

#[test]
fn test_uploaded_image_is_fitted_and_centered() {
    let mut state = EditorState::default();
    let id = state.add_image("landscape.png", 800, 600);

    let image = state.document().image(id).expect("image exists");
    assert!(approx(image.width, 300.0));
    assert!(approx(image.height, 225.0));
    assert!(approx(image.x, 0.0));
    assert!(approx(image.y, 37.5));
    assert_eq!(image.decode, DecodeState::Pending);
}

#[test]
fn test_small_image_is_scaled_up() {
    let mut state = EditorState::default();
    let id = state.add_image("icon.png", 30, 60);

    let image = state.document().image(id).expect("image exists");
    assert!(approx(image.height, 300.0));
    assert!(approx(image.width, 150.0));
    assert!(approx(image.x, 75.0));
}

// ==========================================================================
// Toolbar edits
// ==========================================================================

#[test]
fn test_color_change_only_touches_selected_text() {
    let mut state = EditorState::default();
    let first = state.add_text();
    let second = state.add_text();

    let red = Color::parse_hex("#ff0000").expect("valid color");
    assert!(state.set_text_color(red));

    assert_eq!(state.document().text(second).map(|t| t.color), Some(red));
    assert_eq!(state.document().text(first).map(|t| t.color), Some(Color::BLACK));
}

#[test]
fn test_delete_image_keeps_other_layers_and_order() {
    let mut state = EditorState::default();
    let a = state.add_image("a.png", 100, 100);
    let b = state.add_image("b.png", 100, 100);
    let c = state.add_image("c.png", 100, 100);
    let text = state.add_text();

    state.select(Selection::Image(b)).expect("b exists");
    let removed = state.delete_selected_image().expect("deleted");
    assert_eq!(removed.id, b);
    assert!(state.selection().is_none());

    let ids: Vec<_> = state.document().images().map(|i| i.id).collect();
    assert_eq!(ids, [a, c]);
    assert!(state.document().text(text).is_some());
    assert_eq!(state.document().image_index(c), Some(1));
}

#[test]
fn test_canvas_controls() {
    let mut state = EditorState::default();
    state.set_canvas_width(1000).expect("valid width");
    state.apply_aspect_preset(AspectPreset::Portrait).expect("valid height");
    assert_eq!(state.document().canvas().height, 1777);

    state.set_background(Color::rgb(1, 2, 3));
    assert_eq!(state.document().canvas().background, Color::rgb(1, 2, 3));

    assert!(state.set_canvas_height(0).is_err());
    assert!(state.set_canvas_size(20_000, 10).is_err());
    assert_eq!(state.document().canvas().width, 1000);
}

#[test]
fn test_decode_state_for_deleted_layer_is_ignored() {
    let mut state = EditorState::default();
    let id = state.add_image("a.png", 10, 10);
    state.delete_selected_image();
    assert!(!state.set_decode_state(id, DecodeState::Ready));
}

// ==========================================================================
// Touch gestures
// ==========================================================================

#[test]
fn test_resize_through_handle_is_aspect_locked() {
    let mut state = EditorState::default();
    let id = state.add_image("photo.png", 400, 300);
    // Fitted to 300x225 at (0, 37.5); handle covers x 290..300, y 252.5..262.5.
    assert!(!touch(&mut state, TouchPhase::Start, 295.0, 257.0));
    assert!(matches!(state.gesture_state(), GestureState::Resizing { .. }));

    assert!(touch(&mut state, TouchPhase::Move, 299.0, 259.0));
    let image = state.document().image(id).expect("image exists");
    // raw (304, 227): width = max(304, 227 * 4/3) = 304, height = max(227, 228) = 228
    assert!(approx(image.width, 304.0));
    assert!(approx(image.height, 228.0));

    touch(&mut state, TouchPhase::End, 299.0, 259.0);
    assert_eq!(state.selection(), Selection::Image(id));
}

#[test]
fn test_text_above_image_receives_the_drag() {
    let mut state = EditorState::default();
    let image = state.add_image("bg.png", 300, 300);
    let text = state.add_text();

    touch(&mut state, TouchPhase::Start, 150.0, 150.0);
    assert_eq!(state.selection(), Selection::Text(text));
    touch(&mut state, TouchPhase::Move, 160.0, 170.0);

    assert_eq!(
        state.document().text(text).map(|t| t.position()),
        Some(Point::new(160.0, 170.0))
    );
    assert_eq!(
        state.document().image(image).map(|i| i.position()),
        Some(Point::new(0.0, 0.0))
    );
}

#[test]
fn test_empty_touch_event_is_ignored() {
    let mut state = EditorState::default();
    let id = state.add_text();
    let event = TouchEvent::new(TouchPhase::Start, Vec::new(), 0);

    assert!(!state.handle_touch(&event, &HalfEm));
    assert_eq!(state.selection(), Selection::Text(id));
    assert_eq!(state.gesture_state(), GestureState::Idle);
}

#[test]
fn test_revision_tracks_edits_not_selection() {
    let mut state = EditorState::default();
    state.add_text();
    let before = state.document().revision();

    touch(&mut state, TouchPhase::Start, 150.0, 150.0);
    touch(&mut state, TouchPhase::End, 150.0, 150.0);
    assert_eq!(state.document().revision(), before);

    state.set_text_content("hello");
    assert!(state.document().revision() > before);
}
