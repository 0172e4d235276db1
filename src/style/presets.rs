//! Preset style tables for the boards this engine draws.
//!
//! The constants here were tuned by eye against the physical displays the
//! boards run on. Font families are registry names; callers register the
//! matching font files (`Arial`, `Arial Bold`, `Kiona Light`) or switch a
//! preset to another family with `with_family`.

use super::*;
use crate::model::{Classification, FieldKind};

pub const REGULAR: &str = "Arial";
pub const BOLD: &str = "Arial Bold";
pub const LIGHT: &str = "Kiona Light";

/// Default precedence: a delay matters more than a highlight, which matters
/// more than a lowlight.
pub fn default_precedence() -> Vec<Classification> {
    vec![
        Classification::Delayed,
        Classification::Highlighted,
        Classification::Lowlighted,
    ]
}

/// Bus stop timetable: one group per stop, fixed time/line/destination
/// fields, delays in red, destinations matching the lowlight string greyed.
pub fn timetable() -> TableStyle {
    TableStyle {
        mode: LayoutMode::FixedField,
        background: Color::TRANSPARENT,
        margin: Edges::symmetric(25.0, 45.0),

        header_font: FontSpec::new(BOLD, 44.0),
        header_fg: Color::GREY_DARK,
        header_bg: Color::GREY_MEDIUM,
        header_height: 78.0,
        header_separator: 20.0,
        header_text_inset: Inset::new(20.0, 16.0),

        cell_font: FontSpec::new(REGULAR, 36.0),
        cell_fg: Color::GREY_DARK,
        cell_bg: Color::GREY_LIGHT,
        cell_outline: None,
        cell_boxes: CellBoxes::PerField,
        row_height: 60.0,
        row_separator: 15.0,
        text_inset: Inset::new(20.0, 10.0),
        fields: vec![
            FieldSpec::fixed(FieldKind::Time, 200.0)
                .centered()
                .reacting_to(&[Classification::Delayed]),
            FieldSpec::fixed(FieldKind::Secondary, 120.0).centered(),
            FieldSpec::fixed(FieldKind::Label, 600.0)
                .colored(Color::BLUE)
                .reacting_to(&[Classification::Lowlighted]),
        ],
        field_separator: 15.0,

        group_width: None,
        group_separator: 45.0,
        placeholder: "no (more) busses".to_string(),

        variants: Variants {
            highlighted: VariantColors {
                fg: Some(Color::BLUE),
                bg: None,
            },
            delayed: VariantColors {
                fg: Some(Color::RED),
                bg: None,
            },
            lowlighted: VariantColors {
                fg: Some(Color::GREY_DARK),
                bg: None,
            },
        },
        precedence: default_precedence(),

        cursor: None,
        confetti: None,
        footer: Some(FooterStyle {
            font: FontSpec::new(REGULAR, 16.0),
            color: Color::GREY_DARK,
            inset: 45.0,
            timestamp_format: "%H:%M:%S".to_string(),
            timestamp_side: Side::Right,
        }),
        appendix_separator: 20.0,
    }
}

/// Birthday calendar: one group per month, day and name in one row box,
/// today's birthdays highlighted green, a cursor in the current month and
/// confetti underneath.
pub fn calendar() -> TableStyle {
    let highlight_fg = Color::rgb(0, 100, 0);
    let highlight_bg = Color::rgb(150, 250, 150);
    TableStyle {
        mode: LayoutMode::FixedField,
        background: Color::WHITE,
        margin: Edges::uniform(42.0),

        header_font: FontSpec::new(BOLD, 40.0),
        header_fg: Color::rgb(0, 50, 250),
        header_bg: Color::rgb(200, 200, 255),
        header_height: 60.0,
        header_separator: 40.0,
        header_text_inset: Inset::new(8.0, 8.0),

        cell_font: FontSpec::new(REGULAR, 35.0),
        cell_fg: Color::BLACK,
        cell_bg: Color::rgb(200, 200, 200),
        cell_outline: None,
        cell_boxes: CellBoxes::PerRow,
        row_height: 60.0,
        row_separator: 40.0,
        text_inset: Inset::new(8.0, 8.0),
        fields: vec![
            FieldSpec::fixed(FieldKind::Time, 50.0).reacting_to(&[Classification::Highlighted]),
            FieldSpec::fixed(FieldKind::Label, 370.0).reacting_to(&[Classification::Highlighted]),
        ],
        field_separator: 0.0,

        group_width: Some(420.0),
        group_separator: 80.0,
        placeholder: "no birthdays".to_string(),

        variants: Variants {
            highlighted: VariantColors {
                fg: Some(highlight_fg),
                bg: Some(highlight_bg),
            },
            delayed: VariantColors::default(),
            lowlighted: VariantColors::default(),
        },
        precedence: default_precedence(),

        cursor: Some(CursorStyle {
            width: 30.0,
            fill: highlight_bg,
            outline: highlight_fg,
        }),
        confetti: Some(ConfettiStyle {
            min_count: 150,
            extra_count: 150,
            min_diameter: 12.0,
            max_diameter: 25.0,
            palette: vec![
                Color::rgb(168, 100, 253),
                Color::rgb(41, 205, 255),
                Color::rgb(120, 255, 68),
                Color::rgb(255, 113, 141),
                Color::rgb(253, 255, 106),
            ],
        }),
        footer: Some(FooterStyle {
            font: FontSpec::new(REGULAR, 16.0),
            color: Color::rgb(220, 220, 220),
            inset: 50.0,
            timestamp_format: "%Y%m%d %H:%M".to_string(),
            timestamp_side: Side::Left,
        }),
        appendix_separator: 20.0,
    }
}

/// Train departures: a single headerless group whose field widths follow
/// the widest text in each field.
pub fn departures() -> TableStyle {
    TableStyle {
        mode: LayoutMode::Measured,
        background: Color::TRANSPARENT,
        margin: Edges::uniform(50.0),

        header_font: FontSpec::new(BOLD, 40.0),
        header_fg: Color::GREY_DARK,
        header_bg: Color::GREY_MEDIUM,
        header_height: 70.0,
        header_separator: 30.0,
        header_text_inset: Inset::new(30.0, 15.0),

        cell_font: FontSpec::new(REGULAR, 40.0),
        cell_fg: Color::GREY_DARK,
        cell_bg: Color::GREY_LIGHT,
        cell_outline: Some(Color::GREY_MEDIUM),
        cell_boxes: CellBoxes::PerRow,
        row_height: 70.0,
        row_separator: 30.0,
        text_inset: Inset::new(30.0, 15.0),
        fields: vec![
            FieldSpec::measured(FieldKind::Label),
            FieldSpec::measured(FieldKind::Time).colored(Color::BLUE),
            FieldSpec::measured(FieldKind::Secondary),
            FieldSpec::measured(FieldKind::Detail),
        ],
        field_separator: 0.0,

        group_width: None,
        group_separator: 30.0,
        placeholder: "no departures".to_string(),

        variants: Variants::default(),
        precedence: default_precedence(),

        cursor: None,
        confetti: None,
        footer: None,
        appendix_separator: 20.0,
    }
}

/// Minimal one-cell table used to answer empty input with a "no data" image.
pub fn placeholder(font: FontSpec, text: &str) -> TableStyle {
    TableStyle {
        mode: LayoutMode::Measured,
        background: Color::WHITE,
        margin: Edges::uniform(20.0),
        header_font: font.clone(),
        cell_font: font,
        cell_boxes: CellBoxes::PerRow,
        fields: vec![],
        group_width: None,
        placeholder: text.to_string(),
        cursor: None,
        confetti: None,
        footer: None,
        ..timetable()
    }
}

/// Ranked pie chart with thirty rays.
pub fn pie() -> RadialStyle {
    RadialStyle {
        width: 1920.0,
        height: 1026.0,
        background: Color::WHITE,
        radius: 400.0,
        inner_radius: 250.0,
        ray_start: 410.0,
        ray_end: 450.0,
        ray_width: 3.0,
        number_of_rays: 30,
        even_color: Color::GREY_MEDIUM,
        odd_color: Color::GREY_LIGHT,
        highlight_color: Color::BLUE,
        label_font: FontSpec::new(REGULAR, 20.0),
        caption_font: FontSpec::new(REGULAR, 32.0),
        caption_color: Color::GREY_DARK,
        footer: Some(FooterStyle {
            font: FontSpec::new(REGULAR, 16.0),
            color: Color::rgb(220, 220, 220),
            inset: 8.0,
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
            timestamp_side: Side::Left,
        }),
    }
}

/// Word of the day in a large light typeface.
pub fn word_of_day() -> BannerStyle {
    BannerStyle {
        font: FontSpec::new(LIGHT, 240.0),
        color: Color::GREY_DARK,
        background: Color::TRANSPARENT,
        margin: Edges {
            top: 150.0,
            right: 50.0,
            bottom: 250.0,
            left: 50.0,
        },
        line_gap: 0.0,
    }
}

/// Images side by side on a transparent white sheet.
pub fn strip() -> StripStyle {
    StripStyle {
        background: Color::rgba(255, 255, 255, 0),
        margin: Edges::uniform(32.0),
        separator: 32.0,
    }
}
