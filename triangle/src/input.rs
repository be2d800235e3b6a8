use cgmath::Vector4;

use gl_wrapper::api::GlApi;
use gl_wrapper::renderer::GlRenderer;

use crate::window::WindowSystem;

pub type ClearColor = Vector4<f32>;

/// Keys the program reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    S,
    D,
    Escape,
}

/// Held state of the color keys for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyStates {
    pub a: bool,
    pub s: bool,
    pub d: bool,
}

impl KeyStates {
    pub fn sample<W: WindowSystem>(window: &W) -> Self {
        Self {
            a: window.is_pressed(Key::A),
            s: window.is_pressed(Key::S),
            d: window.is_pressed(Key::D),
        }
    }

    /// Whether every key held in `required` is held here too.
    fn holds(&self, required: &KeyStates) -> bool {
        (!required.a || self.a) && (!required.s || self.s) && (!required.d || self.d)
    }
}

struct ColorRule {
    keys: KeyStates,
    color: [f32; 4],
}

const fn rule(a: bool, s: bool, d: bool, color: [f32; 4]) -> ColorRule {
    ColorRule {
        keys: KeyStates { a, s, d },
        color,
    }
}

// Evaluated top to bottom, the last satisfied rule wins.
const COLOR_RULES: [ColorRule; 7] = [
    rule(true, false, false, [1.0, 0.0, 0.0, 1.0]),
    rule(false, true, false, [0.0, 1.0, 0.0, 1.0]),
    rule(false, false, true, [0.0, 0.0, 1.0, 1.0]),
    rule(true, true, false, [1.0, 1.0, 0.0, 1.0]),
    rule(false, true, true, [0.0, 1.0, 1.0, 1.0]),
    rule(true, false, true, [1.0, 0.0, 1.0, 1.0]),
    rule(true, true, true, [1.0, 1.0, 1.0, 1.0]),
];

/// Clear color selected by the held keys, `None` when no color key is held.
pub fn resolve_clear_color(keys: KeyStates) -> Option<ClearColor> {
    COLOR_RULES
        .iter()
        .filter(|rule| keys.holds(&rule.keys))
        .last()
        .map(|rule| Vector4::from(rule.color))
}

/// Applies the clear color picked by the held keys and clears the color buffer.
///
/// The buffer is cleared every frame; without a color key held the previous
/// clear color stays active.
pub fn sample_input<W: WindowSystem, G: GlApi>(
    window: &W,
    renderer: &GlRenderer<'_, G>,
) -> Option<ClearColor> {
    let color = resolve_clear_color(KeyStates::sample(window));

    if let Some(c) = color {
        renderer.clear_color(c.x, c.y, c.z, c.w);
    }
    renderer.clear();

    color
}

/// Requests the window to close while Escape is held.
pub fn process_escape<W: WindowSystem>(window: &mut W) {
    if window.is_pressed(Key::Escape) {
        window.set_should_close(true);
    }
}
