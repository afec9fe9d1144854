//! Inline SVG icons for the copy buttons

use crate::dom::{append, create_element, create_svg_element, create_text};
use markup5ever_rcdom::Handle;

fn icon_svg() -> Handle {
    create_svg_element(
        "svg",
        vec![
            ("width", "16"),
            ("height", "16"),
            ("viewBox", "0 0 24 24"),
            ("fill", "none"),
            ("stroke", "currentColor"),
            ("stroke-width", "2"),
            ("aria-hidden", "true"),
        ],
    )
}

/// The two-sheets "copy" glyph.
pub fn copy_icon() -> Handle {
    let svg = icon_svg();
    append(
        &svg,
        create_svg_element(
            "rect",
            vec![
                ("width", "14"),
                ("height", "14"),
                ("x", "8"),
                ("y", "8"),
                ("rx", "2"),
                ("ry", "2"),
            ],
        ),
    );
    append(
        &svg,
        create_svg_element(
            "path",
            vec![("d", "M4 16c-1.1 0-2-.9-2-2V4c0-1.1.9-2 2-2h10c1.1 0 2 .9 2 2")],
        ),
    );
    svg
}

/// A copy button wired to the element with id `target` by the embedded script.
pub fn copy_button(class: &str, target: &str, label: &str) -> Handle {
    let button = create_element(
        "button",
        vec![
            ("type", "button"),
            ("class", class),
            ("data-copy-target", target),
            ("aria-label", label),
        ],
    );
    append(&button, copy_icon());
    append(&button, create_text(" Copy"));
    button
}
