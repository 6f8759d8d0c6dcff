//! HTML rendering of the widget.
//!
//! The output is compact (no whitespace between elements) because consuming test harnesses
//! compare it verbatim.

use std::fmt::Write;
use std::time::Instant;

use crate::widget::pad_view::PadView;

/// Renders the full widget: the pad grid followed by the display.
pub fn render(pads: &[PadView], display_text: &str, now: Instant) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(r#"<div id="drum-machine"><div class="pads-grid">"#);
    for pad in pads {
        render_pad(&mut html, pad, now);
    }
    html.push_str(r#"</div><div id="display">"#);
    push_escaped(&mut html, display_text);
    html.push_str("</div></div>");
    html
}

fn render_pad(html: &mut String, pad: &PadView, now: Instant) {
    let descriptor = pad.descriptor;
    let active = pad.is_active(now);
    let class = if active { "drum-pad active" } else { "drum-pad" };

    let _ = write!(html, r#"<div class="{class}" id=""#);
    push_escaped(html, descriptor.element_id);
    let _ = write!(
        html,
        r#"" role="button" tabindex="0" aria-pressed="{active}"><audio class="clip" id="{key}" src=""#,
        key = descriptor.trigger_key,
    );
    push_escaped(html, descriptor.audio_source);
    let _ = write!(
        html,
        r#"" preload="auto"></audio>{key}</div>"#,
        key = descriptor.trigger_key,
    );
}

fn push_escaped(html: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            _ => html.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pads::PADS;

    fn views() -> Vec<PadView> {
        PADS.iter().map(PadView::new).collect()
    }

    #[test]
    fn test_initial_markup() {
        let html = render(&views(), "", Instant::now());

        assert!(html.starts_with(r#"<div id="drum-machine"><div class="pads-grid"><div class="drum-pad" id="Heater-1""#));
        assert!(html.ends_with(r#"</div><div id="display"></div></div>"#));
        assert_eq!(html.matches(r#"class="drum-pad""#).count(), 9);
        assert_eq!(html.matches(r#"<audio class="clip""#).count(), 9);
        assert!(!html.contains("active"));
    }

    #[test]
    fn test_pad_markup() {
        let html = render(&views(), "", Instant::now());

        assert!(html.contains(
            r#"<div class="drum-pad" id="Kick-n'-Hat" role="button" tabindex="0" aria-pressed="false"><audio class="clip" id="Z" src="https://cdn.freecodecamp.org/testable-projects-fcc/audio/Kick_n_Hat.mp3" preload="auto"></audio>Z</div>"#
        ));
    }

    #[test]
    fn test_pads_in_grid_order() {
        let html = render(&views(), "", Instant::now());

        let positions: Vec<usize> = PADS
            .iter()
            .map(|pad| html.find(&format!(r#"id="{}""#, pad.trigger_key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_active_pad_markup() {
        let mut pads = views();
        let now = Instant::now();
        pads[3].flash(now);

        let html = render(&pads, "Heater 4", now);
        assert!(html.contains(r#"<div class="drum-pad active" id="Heater-4" role="button" tabindex="0" aria-pressed="true">"#));
        assert!(html.contains(r#"<div id="display">Heater 4</div>"#));

        let later = render(&pads, "Heater 4", now + Duration::from_millis(150));
        assert!(!later.contains("drum-pad active"));
    }

    #[test]
    fn test_display_text_is_escaped() {
        let html = render(&views(), "<b>&\"", Instant::now());
        assert!(html.contains(r#"<div id="display">&lt;b&gt;&amp;&quot;</div>"#));
    }
}
