//! Printable HTML page for one week of room bookings.
//!
//! One column per day, Monday to Saturday. The header row carries the day
//! name and date on the configured background colour; every cell is centred.

use std::fmt::Write as _;

use roomweek_core::DocumentConfig;

use crate::calendar::DayBuckets;
use crate::types::Event;

/// Render `calendar` as a self-contained HTML document.
pub fn render_html(calendar: &DayBuckets, style: &DocumentConfig) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(&week_title(calendar)));
    push_stylesheet(&mut html, style);
    html.push_str("</head>\n<body>\n<table class=\"week\">\n<thead>\n<tr>\n");

    for date in calendar.keys() {
        let _ = writeln!(
            html,
            "<th><span class=\"day\">{}</span><br><span class=\"date\">{}</span></th>",
            date.format("%A"),
            date.format("%b %-d")
        );
    }

    html.push_str("</tr>\n</thead>\n<tbody>\n<tr>\n");

    for events in calendar.values() {
        html.push_str("<td>\n");
        if events.is_empty() {
            html.push_str("<p class=\"empty\">No events</p>\n");
        }
        for event in events {
            push_event(&mut html, event);
        }
        html.push_str("</td>\n");
    }

    html.push_str("</tr>\n</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn push_stylesheet(html: &mut String, style: &DocumentConfig) {
    let m = &style.margins;
    let _ = write!(
        html,
        "<style>\n\
         @page {{ size: landscape; margin: {}in {}in {}in {}in; }}\n\
         body {{ font-family: {}; font-size: {}pt; }}\n\
         table.week {{ width: 100%; border-collapse: collapse; table-layout: fixed; }}\n\
         th, td {{ border: 1px solid #000; text-align: center; vertical-align: top; padding: 4pt; }}\n\
         th {{ background-color: {}; }}\n\
         .event {{ margin: 0 0 6pt 0; }}\n\
         .title {{ font-weight: bold; }}\n\
         </style>\n",
        m.top,
        m.right,
        m.bottom,
        m.left,
        escape(&style.font_family),
        style.font_size_pt,
        style.header_background.to_hex(),
    );
}

fn push_event(html: &mut String, event: &Event) {
    let _ = writeln!(
        html,
        "<div class=\"event\"><span class=\"title\">{}</span><br>{}<br>{}</div>",
        escape(event.title()),
        escape(&event.full_display_string()),
        escape(event.location())
    );
}

fn week_title(calendar: &DayBuckets) -> String {
    match calendar.keys().next() {
        Some(monday) => format!("Room schedule, week of {}", monday.format("%B %-d, %Y")),
        None => "Room schedule".to_string(),
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::calendar::build_calendar;
    use chrono::NaiveDate;
    use serde_json::json;

    fn week() -> DayBuckets {
        let feed = json!([[
            [{
                "title": "Story Time & Songs",
                "start_date": "2024-02-05",
                "start_time": "10:00:00 -0500",
                "end_time": "11:00:00 -0500",
                "locations": [{"location_name": "Main <Hall>"}]
            }]
        ]]);
        build_calendar(&feed, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()).unwrap()
    }

    #[test]
    fn test_one_column_per_day() {
        let html = render_html(&week(), &DocumentConfig::default());

        assert_eq!(html.matches("<th>").count(), 6);
        assert_eq!(html.matches("<td>").count(), 6);
        assert!(html.contains("Monday"));
        assert!(html.contains("Saturday"));
        assert!(!html.contains("Sunday"));
        assert!(html.contains("Feb 5"));
        assert!(html.contains("week of February 5, 2024"));
    }

    #[test]
    fn test_event_cell_contents_escaped() {
        let html = render_html(&week(), &DocumentConfig::default());

        assert!(html.contains("Story Time &amp; Songs"));
        assert!(html.contains("10:00am - 11:00am"));
        assert!(html.contains("Main &lt;Hall&gt;"));
        assert_eq!(html.matches("No events").count(), 5);
    }

    #[test]
    fn test_document_style_applied() {
        let mut style = DocumentConfig::default();
        style.font_family = "Georgia".to_string();
        style.font_size_pt = 12;

        let html = render_html(&week(), &style);

        assert!(html.contains("font-family: Georgia; font-size: 12pt;"));
        assert!(html.contains("margin: 0.75in 0.5in 0.75in 0.5in;"));
        assert!(html.contains("background-color: #5b9bd7;"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }
}
