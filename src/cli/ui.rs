use crate::core::Currency;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned rate, dimmed when the rate is unknown.
pub fn rate_cell(rate: f64) -> Cell {
    if rate == 0.0 {
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(format!("{rate:.4}")).set_alignment(CellAlignment::Right)
    }
}

/// Renders currencies as a table under `title`, numbering rows when `numbered`.
pub fn currency_table<'a>(
    title: &str,
    currencies: impl IntoIterator<Item = &'a Currency>,
    numbered: bool,
) -> String {
    let mut table = new_styled_table();
    let mut header = Vec::new();
    if numbered {
        header.push(header_cell("#"));
    }
    header.push(header_cell("Currency"));
    header.push(header_cell("Rate"));
    table.set_header(header);

    let mut rows = 0;
    for (i, currency) in currencies.into_iter().enumerate() {
        let mut row = Vec::new();
        if numbered {
            row.push(Cell::new(i + 1).set_alignment(CellAlignment::Right));
        }
        row.push(Cell::new(currency.code()));
        row.push(rate_cell(currency.rate()));
        table.add_row(row);
        rows += 1;
    }

    let mut output = format!("{}\n\n", style_text(title, StyleType::Title));
    if rows == 0 {
        output.push_str(&style_text("(empty)", StyleType::Subtle));
    } else {
        output.push_str(&table.to_string());
    }
    output
}
