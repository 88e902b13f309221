// Server-rendered dashboard page
use crate::domain::dashboard::Dashboard;
use crate::domain::settings_form::slider_name;
use std::fmt::Write;
use std::time::Instant;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_page(view: &Dashboard, now: Instant) -> String {
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Simulation dashboard</title>\n</head>\n<body>\n",
    );

    html.push_str("<div id=\"simulation_scheme\">\n");
    match &view.schematic {
        Some(schematic) => html.push_str(schematic.markup()),
        None => html.push_str("<p>Schematic unavailable</p>"),
    }
    html.push_str("\n</div>\n");

    render_settings(&mut html, view, now);

    let samples = view
        .chart
        .as_ref()
        .and_then(|chart| chart.series.first())
        .map(|series| series.data.len())
        .unwrap_or(0);
    let _ = writeln!(
        html,
        "<div id=\"simulation_diagram\" data-options=\"/dashboard/chart.json\" \
         data-samples=\"{}\" data-live=\"{}\"></div>",
        samples, view.live
    );

    html.push_str("</body>\n</html>\n");
    html
}

fn render_settings(html: &mut String, view: &Dashboard, now: Instant) {
    html.push_str("<form id=\"settings\" method=\"post\" action=\"/dashboard/settings\">\n");
    for (name, value) in view.form.fields() {
        let _ = writeln!(
            html,
            "<label for=\"form_{name}\">{name}</label> \
             <input type=\"text\" id=\"form_{name}\" name=\"{name}\" value=\"{value}\">",
            name = escape(name),
            value = escape(value),
        );
    }

    html.push_str("<div id=\"daily_thermal_demand\">\n");
    for (hour, position) in view.form.sliders().iter().enumerate() {
        let _ = writeln!(
            html,
            "<input type=\"range\" class=\"slider\" orient=\"vertical\" min=\"0\" max=\"{max}\" \
             id=\"{name}\" name=\"{name}\" value=\"{position}\">",
            max = view.form.slider_max(),
            name = slider_name(hour),
            position = position,
        );
    }
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<button type=\"submit\" id=\"settings_button\" class=\"btn {}\">Save</button>",
        view.submit.style(now).css_class()
    );
    html.push_str("</form>\n");
}
