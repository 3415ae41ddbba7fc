use std::io::Cursor;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::bot::error::Error;
use crate::services::stats::aggregator::ModerationStats;

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 600;

// Discord dark theme
const BG_COLOR: RGBColor = RGBColor(49, 51, 56);
const CARD_COLOR: RGBColor = RGBColor(43, 45, 49);
const TEXT_COLOR: RGBColor = RGBColor(255, 255, 255);
const TEXT_MUTED: RGBColor = RGBColor(148, 155, 164);
const ACCENT_BLUE: RGBColor = RGBColor(88, 101, 242);
const ACCENT_AMBER: RGBColor = RGBColor(250, 166, 26);
const ACCENT_GREEN: RGBColor = RGBColor(87, 242, 135);
const ACCENT_PURPLE: RGBColor = RGBColor(155, 89, 182);
const ACCENT_RED: RGBColor = RGBColor(237, 66, 69);

struct StatBar {
    label: &'static str,
    value: i64,
    color: RGBColor,
}

fn bars(stats: &ModerationStats) -> [StatBar; 5] {
    [
        StatBar { label: "Judged", value: stats.judged, color: ACCENT_BLUE },
        StatBar { label: "Spam", value: stats.spam, color: ACCENT_AMBER },
        StatBar { label: "Warned", value: stats.warned, color: ACCENT_GREEN },
        StatBar { label: "Kicked", value: stats.kicked, color: ACCENT_PURPLE },
        StatBar { label: "Banned", value: stats.banned, color: ACCENT_RED },
    ]
}

/// Render the rolling window's moderation counts as a horizontal bar chart PNG
pub fn generate_moderation_chart(stats: &ModerationStats) -> Result<Vec<u8>, Error> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&BG_COLOR).map_err(|e| Error::custom(e.to_string()))?;

        let bars = bars(stats);
        let max_value = bars.iter().map(|b| b.value).max().unwrap_or(1).max(1);

        let margin = 60;
        let bar_area_top = 120;
        let bar_area_left = margin + 150;
        let bar_area_right = CHART_WIDTH as i32 - margin;
        let bar_area_width = bar_area_right - bar_area_left;
        let bar_height = 50;
        let bar_spacing = 20;

        let title = format!("Moderation, last {} days", stats.window_days);
        root.draw(&Text::new(
            title,
            (CHART_WIDTH as i32 / 2, 45),
            ("sans-serif", 36).into_font().color(&TEXT_COLOR).pos(Pos::new(HPos::Center, VPos::Center)),
        )).map_err(|e| Error::custom(e.to_string()))?;

        for (i, bar) in bars.iter().enumerate() {
            let y_center = bar_area_top + (i as i32) * (bar_height + bar_spacing) + bar_height / 2;
            let y_top = y_center - bar_height / 2;
            let y_bottom = y_center + bar_height / 2;

            root.draw(&Text::new(
                bar.label,
                (bar_area_left - 15, y_center),
                ("sans-serif", 22).into_font().color(&TEXT_MUTED).pos(Pos::new(HPos::Right, VPos::Center)),
            )).map_err(|e| Error::custom(e.to_string()))?;

            // Track
            root.draw(&Rectangle::new(
                [(bar_area_left, y_top), (bar_area_right, y_bottom)],
                CARD_COLOR.filled(),
            )).map_err(|e| Error::custom(e.to_string()))?;

            let bar_width = ((bar.value as f64 / max_value as f64) * bar_area_width as f64) as i32;
            if bar_width > 0 {
                root.draw(&Rectangle::new(
                    [(bar_area_left, y_top + 2), (bar_area_left + bar_width, y_bottom - 2)],
                    bar.color.filled(),
                )).map_err(|e| Error::custom(e.to_string()))?;
            }

            // Value inside the bar when it fits, after it otherwise
            let inside = bar_width > 60;
            let (text_x, text_color, text_align) = if inside {
                (bar_area_left + bar_width - 10, TEXT_COLOR, HPos::Right)
            } else {
                (bar_area_left + bar_width + 15, TEXT_MUTED, HPos::Left)
            };

            root.draw(&Text::new(
                bar.value.to_string(),
                (text_x, y_center),
                ("sans-serif", 24).into_font().color(&text_color).pos(Pos::new(text_align, VPos::Center)),
            )).map_err(|e| Error::custom(e.to_string()))?;
        }

        let footer = format!(
            "API usage today: {}/{}{}",
            stats.usage.calls_made,
            stats.usage.daily_limit,
            if stats.dry_run { "  (dry run)" } else { "" }
        );
        root.draw(&Text::new(
            footer,
            (CHART_WIDTH as i32 / 2, CHART_HEIGHT as i32 - margin),
            ("sans-serif", 20).into_font().color(&TEXT_MUTED).pos(Pos::new(HPos::Center, VPos::Center)),
        )).map_err(|e| Error::custom(e.to_string()))?;

        root.present().map_err(|e| Error::custom(e.to_string()))?;
    }

    let img = image::RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer)
        .ok_or_else(|| Error::custom("Failed to create image buffer"))?;

    let mut png_buffer = Cursor::new(Vec::new());
    img.write_to(&mut png_buffer, image::ImageFormat::Png)
        .map_err(|e| Error::custom(e.to_string()))?;

    Ok(png_buffer.into_inner())
}
