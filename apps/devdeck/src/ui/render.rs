use shared::domain::{Action, CommandTree};

use super::layout::{Size, WrapLayout};

const BUTTON_GAP: i32 = 2;

pub fn button_label(number: usize, action: &Action) -> String {
    format!("[{number}] {}", action.name)
}

/// Numbered command list for one action, one `[i] command` line each.
pub fn preview(action: &Action) -> String {
    let mut out = String::new();
    for (index, command) in action.commands.iter().enumerate() {
        out.push_str(&format!("[{}] {command}\n", index + 1));
    }
    out
}

/// Renders every category as a titled section of wrapped action buttons.
///
/// Buttons are numbered across the whole tree in document order, matching
/// [`CommandTree::numbered_actions`]. With `verbose`, each section is followed by the
/// command preview of its actions. An empty tree renders nothing.
pub fn render_tree(tree: &CommandTree, width: u16, verbose: bool) -> String {
    let layout = WrapLayout::with_gaps(BUTTON_GAP, 0);
    let mut out = String::new();
    let mut number = 0;

    for category in tree.categories() {
        out.push_str(&format!("== {} ==\n", category.name));
        if category.actions.is_empty() {
            out.push_str("  (no actions)\n");
            continue;
        }

        let labels: Vec<String> = category
            .actions
            .iter()
            .map(|action| {
                number += 1;
                button_label(number, action)
            })
            .collect();
        let sizes: Vec<Size> = labels
            .iter()
            .map(|label| Size::new(column_width(label), 1))
            .collect();
        let arrangement = layout.arrange(&sizes, i32::from(width));

        let mut lines = vec![String::new(); arrangement.rows];
        for (placement, label) in arrangement.placements.iter().zip(&labels) {
            let line = &mut lines[placement.row];
            let pad = usize::try_from(placement.x).unwrap_or(0).saturating_sub(line.chars().count());
            line.push_str(&" ".repeat(pad));
            line.push_str(label);
        }
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }

        if verbose {
            let first = number - category.actions.len() + 1;
            for (offset, action) in category.actions.iter().enumerate() {
                out.push_str(&format!("  {}\n", button_label(first + offset, action)));
                for line in preview(action).lines() {
                    out.push_str(&format!("      {line}\n"));
                }
            }
        }
        out.push('\n');
    }
    out
}

fn column_width(label: &str) -> i32 {
    i32::try_from(label.chars().count()).unwrap_or(i32::MAX)
}
