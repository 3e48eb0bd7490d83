//! Plain-text rendering of the session projection.

use crate::session::{NoticeLevel, Phase, SessionView};

/// Renders `view` as the block printed before each prompt.
pub fn render(view: &SessionView) -> String {
    let mut out = String::new();

    if let Some(notice) = view.notice() {
        let tag = match notice.level {
            NoticeLevel::Info => "",
            NoticeLevel::Success => "[ok] ",
            NoticeLevel::Warning => "[!] ",
            NoticeLevel::Error => "[error] ",
        };
        out.push_str(&format!("{}{}\n", tag, notice.text));
    }

    match view.phase() {
        Phase::Setup => {
            out.push_str("\nEnter `start` followed by pile sizes (at least 2), or `quit`.\n");
        }
        Phase::Active | Phase::GameOver => {
            out.push_str("\n--- Current Piles ---\n");
            for (index, size) in view.piles().iter().enumerate() {
                out.push_str(&format!("Pile {}: {} objects\n", index + 1, size));
            }
            out.push_str("---------------------\n");
            if *view.controls_enabled() {
                out.push_str(&format!(
                    "Player {}: move PILE COUNT | computer | undo | restart | new | quit\n",
                    view.current_player()
                ));
            } else {
                out.push_str("Options: restart | new | quit\n");
            }
        }
        Phase::Quit => {}
    }
    out
}
