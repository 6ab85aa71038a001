//! Plain-text elevation of a wall, one line per course with the top course first.

use bricklayer_world::query::UnitView;

/// Millimetres of wall represented by one character.
pub(crate) const MILLIMETRES_PER_CHAR: u32 = 25;

/// Renders the units as text: `#` complete, `+` awaiting its second pass,
/// `.` not yet laid. Joints and uncovered wall stay blank.
pub(crate) fn render(views: &[UnitView], wall_width: u32) -> Vec<String> {
    let width = wall_width.div_ceil(MILLIMETRES_PER_CHAR) as usize;
    let courses = views.iter().map(|view| view.coord.row() + 1).max().unwrap_or(0);
    let mut lines = vec![vec![' '; width]; courses];

    for view in views {
        let glyph = if view.complete {
            '#'
        } else if view.built {
            '+'
        } else {
            '.'
        };
        let start = (view.extent.left() / MILLIMETRES_PER_CHAR) as usize;
        let end = (view.extent.right() / MILLIMETRES_PER_CHAR) as usize;
        let line = &mut lines[view.coord.row()];
        for cell in line.iter_mut().take(end.max(start + 1)).skip(start) {
            *cell = glyph;
        }
    }

    lines
        .into_iter()
        .rev()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bricklayer_core::{LengthClass, Span, UnitCoord, UnitRole};

    fn view(row: usize, left: u32, length: u32, built: bool, complete: bool) -> UnitView {
        UnitView {
            coord: UnitCoord::new(row, 0),
            class: LengthClass::Full,
            role: UnitRole::STRETCHER,
            left,
            extent: Span::from_start(left, length),
            bottom: 0.0,
            top: 62.5,
            zone: None,
            stride: 0,
            second_pass_needed: built && !complete,
            built,
            complete,
        }
    }

    #[test]
    fn courses_are_printed_top_down() {
        let lines = render(
            &[
                view(0, 0, 200, true, true),
                view(0, 250, 100, false, false),
                view(1, 0, 100, true, false),
            ],
            400,
        );
        assert_eq!(lines, vec!["++++".to_owned(), "########  ....".to_owned()]);
    }

    #[test]
    fn empty_wall_renders_nothing() {
        assert!(render(&[], 2300).is_empty());
    }
}
