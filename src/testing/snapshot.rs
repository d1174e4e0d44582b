//! Buffer-to-text conversion for snapshot assertions.

use crate::render::Buffer;
use crate::window::Window;

/// Render the buffer as plain text: one line per row, trailing spaces
/// trimmed. Styles are discarded; this is for asserting layout and content.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let mut lines = Vec::with_capacity(buffer.height().max(0) as usize);
    for y in 0..buffer.height() {
        let line: String = (0..buffer.width())
            .map(|x| buffer.get(x, y).map(|c| c.ch).unwrap_or(' '))
            .collect();
        lines.push(line.trim_end().to_owned());
    }
    lines.join("\n")
}

/// Run one render cycle and return the frame as text.
pub fn render_to_string(window: &mut Window) -> String {
    window.render();
    buffer_to_string(window.buffer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Column, Label};
    use crate::render::CellStyle;

    #[test]
    fn buffer_to_string_trims_trailing_spaces() {
        let mut buffer = Buffer::new(8, 2);
        buffer.write_str(0, 0, "hi", &CellStyle::default(), buffer.region());
        let text = buffer_to_string(&buffer);
        assert_eq!(text, "hi\n");
    }

    #[test]
    fn render_to_string_shows_tree_content() {
        let mut window = Window::new(12, 2);
        let root = window.tree.insert(Column::new());
        window.tree.insert_child(root, Label::new("hello"));
        let text = render_to_string(&mut window);
        assert!(text.starts_with("hello"));
    }
}
